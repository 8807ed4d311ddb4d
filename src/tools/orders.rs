//! create_order：在 Orders 服务创建订单

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ToolInvocationError;
use crate::tools::schema::{parse_args, require_finite, require_non_empty, schema_of};
use crate::tools::{BackendClient, Tool};

/// Order line item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OrderItem {
    pub sku: String,
    /// Quantity, at least 1.
    pub qty: u32,
    /// Unit price, not negative.
    pub price: f64,
}

/// Arguments of `create_order`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateOrderArgs {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CreateOrderArgs {
    fn validate(&self, tool: &str) -> Result<(), ToolInvocationError> {
        require_non_empty(tool, "user_id", &self.user_id)?;
        for (i, item) in self.items.iter().enumerate() {
            require_non_empty(tool, &format!("items[{i}].sku"), &item.sku)?;
            if item.qty < 1 {
                return Err(ToolInvocationError::invalid(tool, format!("items[{i}].qty must be >= 1")));
            }
            require_finite(tool, &format!("items[{i}].price"), item.price)?;
            if item.price < 0.0 {
                return Err(ToolInvocationError::invalid(tool, format!("items[{i}].price must be >= 0")));
            }
        }
        Ok(())
    }
}

pub struct CreateOrderTool {
    orders: BackendClient,
}

impl CreateOrderTool {
    pub fn new(orders: BackendClient) -> Self {
        Self { orders }
    }
}

#[async_trait]
impl Tool for CreateOrderTool {
    fn name(&self) -> &str {
        "create_order"
    }

    fn description(&self) -> &str {
        "Create an order in the Orders API. Args: {\"user_id\": \"...\", \"items\": [{\"sku\", \"qty\", \"price\"}], \"notes\"?}."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<CreateOrderArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError> {
        let args: CreateOrderArgs = parse_args(self.name(), args)?;
        args.validate(self.name())?;
        let body = serde_json::to_value(&args).map_err(|e| ToolInvocationError::Decode(e.to_string()))?;
        self.orders.post(&["orders"], &body).await
    }
}
