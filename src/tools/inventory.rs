//! adjust_inventory：对 Inventory 服务的 sku 记录发 PATCH
//!
//! 请求体为 {"stock": delta}，由服务端合并进记录（合并语义，不是 stock += delta）。

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::ToolInvocationError;
use crate::tools::schema::{parse_args, require_non_empty, schema_of};
use crate::tools::{BackendClient, Tool};

/// Arguments of `adjust_inventory`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AdjustInventoryArgs {
    pub sku: String,
    /// Signed value sent as the `stock` patch.
    pub delta: i64,
}

pub struct AdjustInventoryTool {
    inventory: BackendClient,
}

impl AdjustInventoryTool {
    pub fn new(inventory: BackendClient) -> Self {
        Self { inventory }
    }
}

#[async_trait]
impl Tool for AdjustInventoryTool {
    fn name(&self) -> &str {
        "adjust_inventory"
    }

    fn description(&self) -> &str {
        "Adjust inventory for a SKU in the Inventory API. Args: {\"sku\": \"SKU-1\", \"delta\": -1}."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<AdjustInventoryArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError> {
        let args: AdjustInventoryArgs = parse_args(self.name(), args)?;
        require_non_empty(self.name(), "sku", &args.sku)?;
        self.inventory
            .patch(&["items", &args.sku], &json!({ "stock": args.delta }))
            .await
    }
}
