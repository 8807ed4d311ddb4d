//! send_notification：经 Notifications 服务发送消息

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::ToolInvocationError;
use crate::tools::schema::{parse_args, require_non_empty, schema_of};
use crate::tools::{BackendClient, Tool};

/// Arguments of `send_notification`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SendNotificationArgs {
    /// Recipient address.
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct SendNotificationTool {
    notifications: BackendClient,
}

impl SendNotificationTool {
    pub fn new(notifications: BackendClient) -> Self {
        Self { notifications }
    }
}

#[async_trait]
impl Tool for SendNotificationTool {
    fn name(&self) -> &str {
        "send_notification"
    }

    fn description(&self) -> &str {
        "Send a notification via the Notifications API. Args: {\"to\": \"...\", \"subject\": \"...\", \"body\": \"...\"}."
    }

    fn parameters_schema(&self) -> Value {
        schema_of::<SendNotificationArgs>()
    }

    async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError> {
        let args: SendNotificationArgs = parse_args(self.name(), args)?;
        require_non_empty(self.name(), "to", &args.to)?;
        let body = serde_json::to_value(&args).map_err(|e| ToolInvocationError::Decode(e.to_string()))?;
        self.notifications.post(&["notify"], &body).await
    }
}
