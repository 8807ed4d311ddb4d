//! 错误类型
//!
//! 按来源分层：ToolInvocationError（工具/资源调用）、PolicyError（策略端点不可用，由 Gate 内部消化）、
//! AgentError（编排层汇总，含启动期的 Configuration 错误）。整个核心没有重试策略。

use thiserror::Error;

/// 单次工具或资源调用失败：参数校验、超时、非 2xx 响应、连接失败统一归入此类
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolInvocationError {
    /// 参数不符合工具声明的 schema，未发起网络请求
    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool timeout: {tool} after {millis}ms")]
    Timeout { tool: String, millis: u64 },

    /// 协作服务返回非成功状态码
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

impl ToolInvocationError {
    pub fn invalid(tool: &str, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.to_string(),
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ToolInvocationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// 策略端点调用失败（超时、连接错误、响应格式错误）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Policy unavailable: {0}")]
    Unavailable(String),
}

/// 编排层错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// act / call_tool 不返回此错误：被拒是单步结果，文本写入 StepOutcome::Denied。
    /// 保留给需要在被拒时直接中止的调用方，HTTP 映射为 403
    #[error("Policy denied: {0}")]
    PolicyDenied(String),

    /// 同上，仅 fail-closed 时的拒绝文本；HTTP 映射为 503
    #[error("Policy unavailable: {0}")]
    PolicyUnavailable(String),

    #[error(transparent)]
    ToolInvocation(#[from] ToolInvocationError),

    /// 仅在启动期出现：重复工具名、非法协作服务地址、非法配置值
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Prompt argument error: {0}")]
    PromptArgument(String),
}
