//! 协作服务 HTTP 客户端
//!
//! 每个后端（orders / payments / inventory / notifications）一个 BackendClient：
//! 基地址在构造时校验（非法地址为 Configuration 错误），请求带超时；
//! 连接池不保留空闲连接，连接随单次调用结束（包括超时与出错路径）释放。
//! 非 2xx 响应、超时、连接失败统一为 ToolInvocationError，不重试。

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::core::{AgentError, ToolInvocationError};

/// 单个协作服务的 JSON 客户端
#[derive(Clone, Debug)]
pub struct BackendClient {
    service: String,
    base: Url,
    client: Client,
}

/// 校验协作服务地址：必须是绝对 http/https URL
pub fn parse_endpoint(service: &str, raw: &str) -> Result<Url, AgentError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AgentError::Configuration(format!("{service} endpoint {raw:?}: {e}")))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(AgentError::Configuration(format!(
            "{service} endpoint {raw:?}: expected http(s) URL with host"
        ))),
    }
}

impl BackendClient {
    pub fn new(service: &str, base_url: &str, timeout: Duration) -> Result<Self, AgentError> {
        let base = parse_endpoint(service, base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AgentError::Configuration(format!("{service} http client: {e}")))?;
        Ok(Self {
            service: service.to_string(),
            base,
            client,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// 在基地址后追加路径段（逐段转义，如 sku 中的 `/`）
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ToolInvocationError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ToolInvocationError::Transport(format!("{}: base URL cannot hold a path", self.service)))?;
            path.pop_if_empty();
            for seg in segments {
                path.push(seg);
            }
        }
        Ok(url)
    }

    pub async fn get(&self, segments: &[&str]) -> Result<Value, ToolInvocationError> {
        self.send(Method::GET, segments, None).await
    }

    pub async fn post(&self, segments: &[&str], body: &Value) -> Result<Value, ToolInvocationError> {
        self.send(Method::POST, segments, Some(body)).await
    }

    pub async fn patch(&self, segments: &[&str], body: &Value) -> Result<Value, ToolInvocationError> {
        self.send(Method::PATCH, segments, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&Value>,
    ) -> Result<Value, ToolInvocationError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(service = %self.service, %method, %url, "backend request");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ToolInvocationError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json::<Value>().await?)
    }
}
