//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / invoke），启动时一次性注册；
//! 名称重复是配置错误。ToolExecutor 在调用时加超时并输出审计日志。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::core::{AgentError, ToolInvocationError};

/// 工具 trait：名称、描述、参数 schema、异步调用（args 为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称，注册表内唯一
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// 参数 JSON Schema
    fn parameters_schema(&self) -> Value;

    /// 校验参数后执行一次远程调用；成功时原样返回协作服务的响应体
    async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError>;
}

/// 对外公布的工具描述
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// 工具注册表：name -> Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册工具；名称已存在时返回 Configuration 错误
    pub fn register(&mut self, tool: impl Tool + 'static) -> Result<(), AgentError> {
        self.register_arc(Arc::new(tool))
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<(), AgentError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AgentError::Configuration(format!(
                "duplicate tool name: {name}"
            )));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value, ToolInvocationError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolInvocationError::UnknownTool(name.to_string()))?;
        tool.invoke(args).await
    }

    /// 按名称排序
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// 按名称排序的工具描述列表
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut list: Vec<ToolDescriptor> = self
            .tools
            .iter()
            .map(|(name, tool)| ToolDescriptor {
                name: name.clone(),
                description: tool.description().to_string(),
                parameters: tool.parameters_schema(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedTool(&'static str);

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "fixed"
        }

        fn parameters_schema(&self) -> Value {
            json!({ "type": "object" })
        }

        async fn invoke(&self, args: Value) -> Result<Value, ToolInvocationError> {
            Ok(json!({ "tool": self.0, "args": args }))
        }
    }

    #[test]
    fn test_duplicate_name_is_configuration_error() {
        let mut reg = ToolRegistry::new();
        reg.register(FixedTool("a")).unwrap();
        let err = reg.register(FixedTool("a")).err().unwrap();
        assert!(matches!(err, AgentError::Configuration(ref m) if m.contains("a")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_descriptors_sorted() {
        let mut reg = ToolRegistry::new();
        reg.register(FixedTool("zeta")).unwrap();
        reg.register(FixedTool("alpha")).unwrap();
        let names: Vec<String> = reg.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(reg.tool_names(), vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_invoke_unknown_tool() {
        let reg = ToolRegistry::new();
        let err = reg.invoke("nope", json!({})).await.err().unwrap();
        assert_eq!(err, ToolInvocationError::UnknownTool("nope".into()));
    }

    #[tokio::test]
    async fn test_invoke_dispatches_by_name() {
        let mut reg = ToolRegistry::new();
        reg.register(FixedTool("a")).unwrap();
        let out = reg.invoke("a", json!({ "x": 1 })).await.unwrap();
        assert_eq!(out, json!({ "tool": "a", "args": { "x": 1 } }));
    }
}
