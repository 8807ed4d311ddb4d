//! 工具参数 Schema 与本地校验
//!
//! 每个工具的参数是一个 `#[derive(Deserialize, JsonSchema)]` 结构体：
//! schemars 生成对外公布的 JSON Schema，serde 反序列化即本地校验（缺字段、类型错误在发请求前失败）。

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::ToolInvocationError;

/// 参数类型 T 的 JSON Schema
pub fn schema_of<T: JsonSchema>() -> Value {
    let schema = schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_else(|_| {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    })
}

/// 按工具声明的参数类型解析 args；失败为 InvalidArguments
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolInvocationError> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    serde_json::from_value(args).map_err(|e| ToolInvocationError::invalid(tool, e.to_string()))
}

/// 数值字段须为有限值（serde 接受 NaN/inf 之外的所有 f64，但协作服务不接受）
pub fn require_finite(tool: &str, field: &str, value: f64) -> Result<(), ToolInvocationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ToolInvocationError::invalid(tool, format!("{field} must be a finite number")))
    }
}

pub fn require_non_empty(tool: &str, field: &str, value: &str) -> Result<(), ToolInvocationError> {
    if value.trim().is_empty() {
        Err(ToolInvocationError::invalid(tool, format!("{field} must not be empty")))
    } else {
        Ok(())
    }
}
