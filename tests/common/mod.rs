//! 集成测试公共设施：进程内的协作服务替身
//!
//! 一个 axum Router 同时扮演 orders / payments / inventory / notifications 与策略端点，
//! 绑定 127.0.0.1:0。策略规则：charge_payment 金额超过 500 拒绝。

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};

use agentfabric::config::AppConfig;

pub const POLICY_PATH: &str = "/v1/data/agent/allow";

#[derive(Default)]
pub struct Collaborators {
    pub orders: Mutex<Vec<Value>>,
    pub payments: Mutex<u64>,
    pub items: Mutex<BTreeMap<String, Value>>,
    pub notify_count: Mutex<u64>,
    /// 策略端点收到的 input
    pub policy_inputs: Mutex<Vec<Value>>,
}

impl Collaborators {
    fn seeded() -> Self {
        let state = Self::default();
        {
            let mut items = state.items.lock().unwrap();
            items.insert(
                "SKU-1".into(),
                json!({ "sku": "SKU-1", "name": "Widget", "stock": 100 }),
            );
            items.insert(
                "SKU-2".into(),
                json!({ "sku": "SKU-2", "name": "Gadget", "stock": 50 }),
            );
        }
        state
    }
}

type Shared = Arc<Collaborators>;

async fn list_orders(State(s): State<Shared>) -> Json<Value> {
    Json(Value::Array(s.orders.lock().unwrap().clone()))
}

async fn create_order(State(s): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut orders = s.orders.lock().unwrap();
    let mut order = body;
    order["id"] = json!(format!("ord-{}", orders.len() + 1));
    order["status"] = json!("created");
    orders.push(order.clone());
    Json(order)
}

async fn charge(State(s): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut n = s.payments.lock().unwrap();
    *n += 1;
    Json(json!({
        "id": format!("pay-{}", *n),
        "order_id": body["order_id"],
        "amount": body["amount"],
        "method": body["method"],
        "status": "APPROVED",
    }))
}

async fn list_items(State(s): State<Shared>) -> Json<Value> {
    Json(Value::Array(s.items.lock().unwrap().values().cloned().collect()))
}

/// 合并语义：请求体的字段覆盖记录中的同名字段
async fn patch_item(
    State(s): State<Shared>,
    Path(sku): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let mut items = s.items.lock().unwrap();
    let item = items
        .get_mut(&sku)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("item {sku} not found")))?;
    if let (Some(target), Some(patch)) = (item.as_object_mut(), body.as_object()) {
        for (k, v) in patch {
            target.insert(k.clone(), v.clone());
        }
    }
    Ok(Json(item.clone()))
}

async fn notify(State(s): State<Shared>) -> Json<Value> {
    let mut n = s.notify_count.lock().unwrap();
    *n += 1;
    Json(json!({ "status": "sent", "count": *n }))
}

async fn decide(State(s): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let input = body["input"].clone();
    s.policy_inputs.lock().unwrap().push(input.clone());
    let amount = input["args"]["amount"].as_f64().unwrap_or(0.0);
    if input["tool"] == "charge_payment" && amount > 500.0 {
        return Json(json!({ "result": { "allow": false, "reason": "amount exceeds limit" } }));
    }
    Json(json!({ "result": true }))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// 启动全部协作服务替身，返回基地址与共享状态
pub async fn spawn_collaborators() -> (String, Shared) {
    let state: Shared = Arc::new(Collaborators::seeded());
    let app = Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/payments", post(charge))
        .route("/items", get(list_items))
        .route("/items/:sku", patch(patch_item))
        .route("/notify", post(notify))
        .route(POLICY_PATH, post(decide))
        .with_state(state.clone());
    (serve(app).await, state)
}

/// 所有路径都返回 500 的协作服务
pub async fn spawn_broken() -> String {
    let app = Router::new().fallback(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") });
    serve(app).await
}

/// 绑定后立即释放的端口，连接会被拒绝
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// 四个协作服务与策略端点都指向同一个替身
pub fn config_for(base: &str) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.backends.orders_url = base.to_string();
    cfg.backends.payments_url = base.to_string();
    cfg.backends.inventory_url = base.to_string();
    cfg.backends.notifications_url = base.to_string();
    cfg.policy.url = format!("{base}{POLICY_PATH}");
    cfg.tools.timeout_secs = 5;
    cfg.tools.resource_timeout_secs = 5;
    cfg
}

/// 策略端点替身：固定返回 body
pub async fn spawn_policy_replying(body: Value) -> String {
    let app = Router::new().route(
        POLICY_PATH,
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    format!("{}{POLICY_PATH}", serve(app).await)
}

/// 策略端点替身：延迟 delay 后才放行
pub async fn spawn_slow_policy(delay: std::time::Duration) -> String {
    let app = Router::new().route(
        POLICY_PATH,
        post(move || async move {
            tokio::time::sleep(delay).await;
            Json(json!({ "result": true }))
        }),
    );
    format!("{}{POLICY_PATH}", serve(app).await)
}
