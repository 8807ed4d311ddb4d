//! 单次运行的状态与结果
//!
//! 每次 act：RECEIVED → PLANNED → 逐步（CHECKING_POLICY → DENIED | INVOKING → SUCCEEDED | FAILED）
//! → RECORDED → RESPONDED。没有重试和回滚，DENIED / FAILED 是该步的终态。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::planner::{Inputs, Step};
use crate::policy::PolicyDecision;

/// 运行阶段（用于日志）
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Received,
    Planned,
    CheckingPolicy,
    Invoking,
    Recorded,
    Responded,
}

/// 某一步失败（DENIED / FAILED）后对剩余步骤的处理
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepFailurePolicy {
    /// 继续执行剩余步骤，部分完成是合法结果
    #[default]
    Continue,
    /// 剩余步骤标记为 not_run
    Abort,
}

/// 单步结果
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    /// 步骤没有绑定工具，仅作描述
    Skipped,
    /// 前面的步骤失败且策略为 Abort
    NotRun,
    Denied { reason: String },
    Succeeded { result: Value },
    Failed { error: String },
}

impl StepOutcome {
    pub fn is_terminal_failure(&self) -> bool {
        matches!(self, StepOutcome::Denied { .. } | StepOutcome::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Skipped => "skipped",
            StepOutcome::NotRun => "not_run",
            StepOutcome::Denied { .. } => "denied",
            StepOutcome::Succeeded { .. } => "succeeded",
            StepOutcome::Failed { .. } => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<PolicyDecision>,
    pub outcome: StepOutcome,
}

/// 外部调用方的目标请求
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ActRequest {
    pub goal: String,
    #[serde(default)]
    pub inputs: Inputs,
    /// 透传给每一步的 ActionPayload；必须是 JSON 对象
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Map<String, Value>>,
}

impl ActRequest {
    pub fn new(goal: impl Into<String>, inputs: Inputs) -> Self {
        Self {
            goal: goal.into(),
            inputs,
            context: None,
        }
    }
}

/// 汇总后的计划与各步结果
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActResponse {
    pub run_id: Uuid,
    pub goal: String,
    pub plan: Vec<Step>,
    pub results: Vec<StepReport>,
    /// 没有 denied / failed / not_run 的步骤
    pub completed: bool,
}

/// 直接工具调用（不经 Planner）的结果
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCallReport {
    pub tool: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<PolicyDecision>,
    pub outcome: StepOutcome,
}
