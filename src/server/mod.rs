//! Protocol Adapter：HTTP 暴露 act、工具、资源、提示词与活动记录
//!
//! 路由：
//! - GET  /healthz
//! - POST /agent/act
//! - GET  /agent/memory/recent?n=
//! - GET  /mcp/tools、POST /mcp/tools/:name
//! - GET  /mcp/resources、GET /mcp/resources/read?uri=
//! - GET  /mcp/prompts、POST /mcp/prompts/:name

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::config::MemorySection;
use crate::core::{ActRequest, ActResponse, AgentError, Orchestrator, ToolCallReport, ToolInvocationError};
use crate::memory::MemoryEvent;
use crate::prompts::PromptDescriptor;
use crate::resources::ResourceDescriptor;
use crate::tools::ToolDescriptor;

pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub recent_default: usize,
    pub recent_max: usize,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>, memory: &MemorySection) -> Self {
        Self {
            orchestrator,
            recent_default: memory.recent_default,
            recent_max: memory.recent_max,
        }
    }
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/agent/act", post(agent_act))
        .route("/agent/memory/recent", get(memory_recent))
        .route("/mcp/tools", get(tools_list))
        .route("/mcp/tools/:name", post(tools_call))
        .route("/mcp/resources", get(resources_list))
        .route("/mcp/resources/read", get(resources_read))
        .route("/mcp/prompts", get(prompts_list))
        .route("/mcp/prompts/:name", post(prompts_render))
        .with_state(state)
}

/// AgentError → HTTP 状态码
fn status_for(err: &AgentError) -> StatusCode {
    match err {
        AgentError::UnknownResource(_)
        | AgentError::UnknownPrompt(_)
        | AgentError::ToolInvocation(ToolInvocationError::UnknownTool(_)) => StatusCode::NOT_FOUND,
        AgentError::PromptArgument(_)
        | AgentError::ToolInvocation(ToolInvocationError::InvalidArguments { .. }) => {
            StatusCode::BAD_REQUEST
        }
        AgentError::ToolInvocation(ToolInvocationError::Timeout { .. }) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        AgentError::ToolInvocation(_) => StatusCode::BAD_GATEWAY,
        // 编排器把策略拒绝记为单步结果，这两个分支只服务于直接返回策略错误的调用方
        AgentError::PolicyDenied(_) => StatusCode::FORBIDDEN,
        AgentError::PolicyUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        AgentError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: AgentError) -> (StatusCode, String) {
    (status_for(&err), err.to_string())
}

/// GET /healthz
async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "agentfabric" }))
}

/// POST /agent/act：目标 → 计划 → 执行结果
async fn agent_act(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ActRequest>,
) -> ApiResult<ActResponse> {
    if req.goal.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "goal is required".to_string()));
    }
    Ok(Json(state.orchestrator.act(req).await))
}

#[derive(Debug, Deserialize)]
struct RecentQuery {
    n: Option<usize>,
}

/// GET /agent/memory/recent?n=：最新在前，n 截断到 recent_max
async fn memory_recent(
    State(state): State<Arc<AppState>>,
    Query(q): Query<RecentQuery>,
) -> ApiResult<Vec<MemoryEvent>> {
    let n = q.n.unwrap_or(state.recent_default).min(state.recent_max);
    Ok(Json(state.orchestrator.recent_activity(n)))
}

async fn tools_list(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ToolDescriptor>> {
    Ok(Json(state.orchestrator.tools()))
}

/// POST /mcp/tools/:name：body 即参数；工具失败或被拒仍是 200，结果在 outcome 中
async fn tools_call(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> ApiResult<ToolCallReport> {
    let args = body.map(|Json(v)| v).unwrap_or(Value::Null);
    state
        .orchestrator
        .call_tool(&name, args)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn resources_list(State(state): State<Arc<AppState>>) -> ApiResult<Vec<ResourceDescriptor>> {
    Ok(Json(state.orchestrator.resources()))
}

#[derive(Debug, Deserialize)]
struct ReadQuery {
    uri: String,
}

#[derive(Debug, Serialize)]
struct ResourceText {
    uri: String,
    text: String,
}

/// GET /mcp/resources/read?uri=inventory://SKU-1
async fn resources_read(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ReadQuery>,
) -> ApiResult<ResourceText> {
    let text = state
        .orchestrator
        .read_resource(&q.uri)
        .await
        .map_err(api_error)?;
    Ok(Json(ResourceText { uri: q.uri, text }))
}

async fn prompts_list(State(state): State<Arc<AppState>>) -> ApiResult<Vec<PromptDescriptor>> {
    Ok(Json(state.orchestrator.prompts()))
}

async fn prompts_render(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(args): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    let text = state
        .orchestrator
        .render_prompt(&name, &args)
        .map_err(api_error)?;
    Ok(Json(json!({ "text": text })))
}
