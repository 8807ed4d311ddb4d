//! 策略闸门：动作执行前的 allow/deny 判定
//!
//! HttpPolicyGate 向外部决策端点 POST {"input": ActionPayload}，响应为
//! {"result": {"allow": bool, "reason"?: str}} 或 {"result": bool}；result 缺失或为 null 视为拒绝。
//! 端点不可用（超时、连接失败、非 2xx、响应格式错误）时按显式配置 OnPolicyUnavailable 决定放行或拒绝，
//! 不重试。

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::{AgentError, PolicyError};
use crate::tools::parse_endpoint;

/// 一次工具调用的具体参数，交给策略判定
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionPayload {
    pub tool: String,
    pub args: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,
    /// 计划中的步骤下标（从 0 开始）；直接调用时为空
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl ActionPayload {
    pub fn new(tool: impl Into<String>, args: Value) -> Self {
        Self {
            tool: tool.into(),
            args,
            goal: None,
            run_id: None,
            step: None,
            context: None,
        }
    }
}

/// 决策端点不可用时的处理姿态；Allow 即 fail-open
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnPolicyUnavailable {
    #[default]
    Allow,
    Deny,
}

impl fmt::Display for OnPolicyUnavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("fail-open"),
            Self::Deny => f.write_str("fail-closed"),
        }
    }
}

/// 决策来源
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// 决策端点给出的结果
    Evaluated,
    /// 端点不可用，套用 OnPolicyUnavailable
    Unavailable,
    /// 静态闸门（未接决策端点）
    Static,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyDecision {
    pub allow: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub source: DecisionSource,
}

impl PolicyDecision {
    pub fn evaluated(allow: bool, reason: Option<String>) -> Self {
        Self {
            allow,
            reason,
            source: DecisionSource::Evaluated,
        }
    }

    /// 端点不可用时按姿态生成的决策
    pub fn unavailable(posture: OnPolicyUnavailable, err: &PolicyError) -> Self {
        Self {
            allow: posture == OnPolicyUnavailable::Allow,
            reason: Some(format!("{err} ({posture})")),
            source: DecisionSource::Unavailable,
        }
    }
}

/// 策略闸门
#[async_trait]
pub trait PolicyGate: Send + Sync {
    /// 不失败：端点异常由实现按配置的姿态消化
    async fn evaluate(&self, payload: &ActionPayload) -> PolicyDecision;
}

/// 解析决策端点响应体
pub fn parse_decision(body: &Value) -> Result<PolicyDecision, PolicyError> {
    match body.get("result") {
        Some(Value::Bool(allow)) => Ok(PolicyDecision::evaluated(*allow, None)),
        Some(Value::Object(obj)) => {
            let allow = obj.get("allow").and_then(|v| v.as_bool()).unwrap_or(false);
            let reason = obj
                .get("reason")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            Ok(PolicyDecision::evaluated(allow, reason))
        }
        // 规则未定义或未加载策略时端点返回 {}：按拒绝处理，不走不可用姿态
        Some(Value::Null) | None => Ok(PolicyDecision::evaluated(
            false,
            Some("policy result undefined".to_string()),
        )),
        Some(other) => Err(PolicyError::Unavailable(format!(
            "malformed policy result: {other}"
        ))),
    }
}

/// 外部决策端点闸门
pub struct HttpPolicyGate {
    url: Url,
    client: Client,
    on_unavailable: OnPolicyUnavailable,
}

impl HttpPolicyGate {
    pub fn new(
        url: &str,
        timeout: Duration,
        on_unavailable: OnPolicyUnavailable,
    ) -> Result<Self, AgentError> {
        let url = parse_endpoint("policy", url)?;
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| AgentError::Configuration(format!("policy http client: {e}")))?;
        if on_unavailable == OnPolicyUnavailable::Allow {
            tracing::info!(%url, "policy gate is fail-open: actions proceed when the decision endpoint is unavailable");
        }
        Ok(Self {
            url,
            client,
            on_unavailable,
        })
    }

    pub fn on_unavailable(&self) -> OnPolicyUnavailable {
        self.on_unavailable
    }

    async fn query(&self, payload: &ActionPayload) -> Result<PolicyDecision, PolicyError> {
        let resp = self
            .client
            .post(self.url.clone())
            .json(&json!({ "input": payload }))
            .send()
            .await
            .map_err(|e| PolicyError::Unavailable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PolicyError::Unavailable(format!("HTTP {status}")));
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| PolicyError::Unavailable(e.to_string()))?;
        parse_decision(&body)
    }
}

#[async_trait]
impl PolicyGate for HttpPolicyGate {
    async fn evaluate(&self, payload: &ActionPayload) -> PolicyDecision {
        match self.query(payload).await {
            Ok(decision) => {
                tracing::debug!(tool = %payload.tool, allow = decision.allow, "policy decision");
                decision
            }
            Err(e) => {
                tracing::warn!(tool = %payload.tool, posture = %self.on_unavailable, "policy unavailable: {}", e);
                PolicyDecision::unavailable(self.on_unavailable, &e)
            }
        }
    }
}

/// 固定结果的闸门：未配置决策端点时使用，也用于测试
#[derive(Clone, Debug)]
pub struct StaticPolicyGate {
    allow: bool,
}

impl StaticPolicyGate {
    pub fn allow_all() -> Self {
        Self { allow: true }
    }

    pub fn deny_all() -> Self {
        Self { allow: false }
    }
}

#[async_trait]
impl PolicyGate for StaticPolicyGate {
    async fn evaluate(&self, _payload: &ActionPayload) -> PolicyDecision {
        PolicyDecision {
            allow: self.allow,
            reason: (!self.allow).then(|| "denied by static policy".to_string()),
            source: DecisionSource::Static,
        }
    }
}
