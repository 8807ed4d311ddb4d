//! 只读资源：scheme://key 寻址的协作服务状态投影
//!
//! 每次读取都重新请求，不缓存。ResourceRegistry 按 scheme 分发：
//! 模板为 `scheme://{param}` 时接受任意非空 key，否则 key 必须与模板字面一致。

pub mod providers;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::core::{AgentError, ToolInvocationError};

pub use providers::{InventoryResource, RecentMemoryResource, RecentOrdersResource};

/// 只读资源
#[async_trait]
pub trait Resource: Send + Sync {
    /// 如 `inventory://{sku}`、`orders://recent`
    fn uri_template(&self) -> &str;

    fn description(&self) -> &str;

    /// 返回序列化后的文本；key 不存在时返回 not-found 标记而不是错误
    async fn read(&self, key: &str) -> Result<String, ToolInvocationError>;
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ResourceDescriptor {
    pub uri_template: String,
    pub description: String,
}

/// 拆分 `scheme://key`
pub fn split_uri(uri: &str) -> Option<(&str, &str)> {
    let (scheme, key) = uri.split_once("://")?;
    if scheme.is_empty() {
        return None;
    }
    Some((scheme, key))
}

fn is_param(key: &str) -> bool {
    key.len() > 2 && key.starts_with('{') && key.ends_with('}')
}

#[derive(Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, Arc<dyn Resource>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册资源；模板非法或 scheme 重复为 Configuration 错误
    pub fn register(&mut self, resource: impl Resource + 'static) -> Result<(), AgentError> {
        let template = resource.uri_template().to_string();
        let (scheme, _) = split_uri(&template).ok_or_else(|| {
            AgentError::Configuration(format!("invalid resource template: {template}"))
        })?;
        if self.resources.contains_key(scheme) {
            return Err(AgentError::Configuration(format!(
                "duplicate resource scheme: {scheme}"
            )));
        }
        self.resources.insert(scheme.to_string(), Arc::new(resource));
        Ok(())
    }

    pub async fn read(&self, uri: &str) -> Result<String, AgentError> {
        let unknown = || AgentError::UnknownResource(uri.to_string());
        let (scheme, key) = split_uri(uri).ok_or_else(unknown)?;
        let resource = self.resources.get(scheme).ok_or_else(unknown)?;
        let (_, template_key) = split_uri(resource.uri_template()).ok_or_else(unknown)?;
        let matches = if is_param(template_key) {
            !key.is_empty()
        } else {
            key == template_key
        };
        if !matches {
            return Err(unknown());
        }
        Ok(resource.read(key).await?)
    }

    pub fn descriptors(&self) -> Vec<ResourceDescriptor> {
        self.resources
            .values()
            .map(|r| ResourceDescriptor {
                uri_template: r.uri_template().to_string(),
                description: r.description().to_string(),
            })
            .collect()
    }
}
