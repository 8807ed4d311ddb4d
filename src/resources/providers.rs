//! 资源实现：inventory://{sku}、orders://recent、memory://recent

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::core::ToolInvocationError;
use crate::memory::MemoryLog;
use crate::resources::Resource;
use crate::tools::BackendClient;

fn to_text(value: &Value) -> Result<String, ToolInvocationError> {
    serde_json::to_string(value).map_err(|e| ToolInvocationError::Decode(e.to_string()))
}

/// 在库存快照中线性查找 sku；找不到返回 not-found 标记
pub fn find_item(items: &Value, sku: &str) -> Value {
    items
        .as_array()
        .and_then(|list| {
            list.iter()
                .find(|it| it.get("sku").and_then(|v| v.as_str()) == Some(sku))
        })
        .cloned()
        .unwrap_or_else(|| json!({ "error": "not found", "sku": sku }))
}

/// 单个 sku 的库存记录
pub struct InventoryResource {
    inventory: BackendClient,
}

impl InventoryResource {
    pub fn new(inventory: BackendClient) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Resource for InventoryResource {
    fn uri_template(&self) -> &str {
        "inventory://{sku}"
    }

    fn description(&self) -> &str {
        "Inventory record for a SKU"
    }

    async fn read(&self, key: &str) -> Result<String, ToolInvocationError> {
        let items = self.inventory.get(&["items"]).await?;
        to_text(&find_item(&items, key))
    }
}

/// Orders 服务当前的订单列表
pub struct RecentOrdersResource {
    orders: BackendClient,
}

impl RecentOrdersResource {
    pub fn new(orders: BackendClient) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Resource for RecentOrdersResource {
    fn uri_template(&self) -> &str {
        "orders://recent"
    }

    fn description(&self) -> &str {
        "Recent orders from the Orders API"
    }

    async fn read(&self, _key: &str) -> Result<String, ToolInvocationError> {
        let orders = self.orders.get(&["orders"]).await?;
        to_text(&orders)
    }
}

/// 进程内活动日志的最近 n 条（最新在前）
pub struct RecentMemoryResource {
    memory: Arc<MemoryLog>,
    n: usize,
}

impl RecentMemoryResource {
    pub fn new(memory: Arc<MemoryLog>, n: usize) -> Self {
        Self { memory, n }
    }
}

#[async_trait]
impl Resource for RecentMemoryResource {
    fn uri_template(&self) -> &str {
        "memory://recent"
    }

    fn description(&self) -> &str {
        "Recent orchestrator activity, newest first"
    }

    async fn read(&self, _key: &str) -> Result<String, ToolInvocationError> {
        let events = self.memory.recent(self.n);
        serde_json::to_string(&events).map_err(|e| ToolInvocationError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::EventKind;

    #[test]
    fn test_find_item_hit_and_miss() {
        let items = json!([
            { "sku": "SKU-1", "name": "Widget", "stock": 100 },
            { "sku": "SKU-2", "name": "Gadget", "stock": 50 }
        ]);
        assert_eq!(find_item(&items, "SKU-2")["name"], "Gadget");
        assert_eq!(find_item(&items, "SKU-3"), json!({ "error": "not found", "sku": "SKU-3" }));
        assert_eq!(find_item(&json!({}), "SKU-1")["error"], "not found");
    }

    #[tokio::test]
    async fn test_recent_memory_resource() {
        let log = Arc::new(MemoryLog::new(10));
        for i in 0..3 {
            log.add(EventKind::Action, json!({ "i": i }));
        }
        let text = RecentMemoryResource::new(log, 2).read("recent").await.unwrap();
        let v: Value = serde_json::from_str(&text).unwrap();
        let list = v.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["payload"]["i"], 2);
        assert_eq!(list[0]["kind"], "action");
    }
}
