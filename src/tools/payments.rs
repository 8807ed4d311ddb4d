//! charge_payment：在 Payments 服务为订单扣款

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ToolInvocationError;
use crate::tools::schema::{parse_args, require_finite, require_non_empty, schema_of};
use crate::tools::{BackendClient, Tool};

fn default_method() -> String {
    "card".to_string()
}

/// Arguments of `charge_payment`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChargePaymentArgs {
    pub order_id: String,
    pub amount: f64,
    /// Payment method, defaults to "card".
    #[serde(default = "default_method")]
    pub method: String,
}

pub struct ChargePaymentTool {
    payments: BackendClient,
}

impl ChargePaymentTool {
    pub fn new(payments: BackendClient) -> Self {
        Self { payments }
    }
}

#[async_trait]
impl Tool for ChargePaymentTool {
    fn name(&self) -> &str {
        "charge_payment"
    }

    fn description(&self) -> &str {
        "Charge a payment for an order in the Payments API. Args: {\"order_id\": \"...\", \"amount\": 0.0, \"method\"?: \"card\"}."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<ChargePaymentArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError> {
        let args: ChargePaymentArgs = parse_args(self.name(), args)?;
        require_non_empty(self.name(), "order_id", &args.order_id)?;
        require_finite(self.name(), "amount", args.amount)?;
        let body = serde_json::to_value(&args).map_err(|e| ToolInvocationError::Decode(e.to_string()))?;
        self.payments.post(&["payments"], &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_defaults_to_card() {
        let args: ChargePaymentArgs =
            parse_args("charge_payment", json!({ "order_id": "o1", "amount": 12.5 })).unwrap();
        assert_eq!(args.method, "card");
    }

    #[test]
    fn test_amount_must_be_number() {
        let r = parse_args::<ChargePaymentArgs>("charge_payment", json!({ "order_id": "o1", "amount": "12" }));
        assert!(matches!(r, Err(ToolInvocationError::InvalidArguments { .. })));
    }
}
