//! 编排器：Planner → PolicyGate → ToolExecutor → MemoryLog
//!
//! act 按计划顺序串行执行步骤（同一计划内不并行），不同请求之间可并发；
//! 跨请求共享的可变状态只有 MemoryLog。被拒或失败的步骤记录后按 StepFailurePolicy 决定是否继续。

use std::sync::Arc;

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::core::{
    AgentError, ActRequest, ActResponse, RunPhase, StepFailurePolicy, StepOutcome, StepReport,
    ToolCallReport, ToolInvocationError,
};
use crate::memory::{EventKind, MemoryEvent, MemoryLog};
use crate::planner::Planner;
use crate::policy::{ActionPayload, DecisionSource, PolicyDecision, PolicyGate};
use crate::prompts::{PromptCatalog, PromptDescriptor};
use crate::resources::{ResourceDescriptor, ResourceRegistry};
use crate::tools::{ToolDescriptor, ToolExecutor};

/// 编排核心，进程内一个实例，由 OrchestratorBuilder 构建
pub struct Orchestrator {
    pub(crate) planner: Arc<dyn Planner>,
    pub(crate) policy: Arc<dyn PolicyGate>,
    pub(crate) executor: ToolExecutor,
    pub(crate) resources: ResourceRegistry,
    pub(crate) prompts: PromptCatalog,
    pub(crate) memory: Arc<MemoryLog>,
    pub(crate) on_step_failure: StepFailurePolicy,
}

/// 被拒原因：端点不可用导致的拒绝与策略明确拒绝分开表述
fn denial_reason(decision: &PolicyDecision) -> String {
    match (decision.source, decision.reason.clone()) {
        // 不可用时 reason 已是 PolicyError 的文本
        (DecisionSource::Unavailable, Some(reason)) => reason,
        (DecisionSource::Unavailable, None) => {
            AgentError::PolicyUnavailable("no decision".to_string()).to_string()
        }
        (_, reason) => AgentError::PolicyDenied(
            reason.unwrap_or_else(|| "no reason given".to_string()),
        )
        .to_string(),
    }
}

impl Orchestrator {
    pub fn memory(&self) -> &Arc<MemoryLog> {
        &self.memory
    }

    /// 目标 → 计划 → 逐步执行 → 汇总
    pub async fn act(&self, req: ActRequest) -> ActResponse {
        let run_id = Uuid::new_v4();
        tracing::debug!(%run_id, phase = ?RunPhase::Received, goal = %req.goal);

        let plan = self.planner.plan(&req.goal, &req.inputs);
        tracing::info!(%run_id, phase = ?RunPhase::Planned, goal = %req.goal, steps = plan.len(), "plan ready");
        self.memory.add(
            EventKind::Plan,
            json!({ "run_id": run_id, "goal": req.goal, "steps": plan }),
        );

        let mut results = Vec::with_capacity(plan.len());
        let mut aborted = false;
        for (index, step) in plan.steps.iter().enumerate() {
            let mut report = StepReport {
                index,
                description: step.description.clone(),
                tool: step.tool.as_ref().map(|b| b.tool.clone()),
                decision: None,
                outcome: StepOutcome::Skipped,
            };
            if aborted {
                report.outcome = StepOutcome::NotRun;
                results.push(report);
                continue;
            }
            let Some(binding) = &step.tool else {
                results.push(report);
                continue;
            };

            let payload = ActionPayload {
                tool: binding.tool.clone(),
                args: binding.args.clone(),
                goal: Some(req.goal.clone()),
                run_id: Some(run_id),
                step: Some(index),
                context: req.context.clone().map(Value::Object),
            };
            let (decision, outcome) = self.perform(payload).await;
            if outcome.is_terminal_failure() {
                tracing::warn!(%run_id, step = index, tool = %binding.tool, outcome = outcome.label(), "step did not succeed");
                if self.on_step_failure == StepFailurePolicy::Abort {
                    aborted = true;
                }
            }
            report.decision = decision;
            report.outcome = outcome;
            results.push(report);
        }

        let completed = results
            .iter()
            .all(|r| matches!(r.outcome, StepOutcome::Skipped | StepOutcome::Succeeded { .. }));
        tracing::debug!(%run_id, phase = ?RunPhase::Responded, completed);
        ActResponse {
            run_id,
            goal: req.goal,
            plan: plan.steps,
            results,
            completed,
        }
    }

    /// 不经 Planner 直接调用工具，仍走策略校验与活动记录；未知工具返回 Err
    pub async fn call_tool(&self, name: &str, args: Value) -> Result<ToolCallReport, AgentError> {
        if !self.executor.has_tool(name) {
            return Err(ToolInvocationError::UnknownTool(name.to_string()).into());
        }
        let (decision, outcome) = self.perform(ActionPayload::new(name, args)).await;
        Ok(ToolCallReport {
            tool: name.to_string(),
            decision,
            outcome,
        })
    }

    /// 单个动作：CHECKING_POLICY → DENIED | INVOKING → SUCCEEDED | FAILED → RECORDED
    async fn perform(&self, payload: ActionPayload) -> (Option<PolicyDecision>, StepOutcome) {
        let (decision, outcome) = if !self.executor.has_tool(&payload.tool) {
            let err = ToolInvocationError::UnknownTool(payload.tool.clone());
            (None, StepOutcome::Failed { error: err.to_string() })
        } else {
            tracing::debug!(tool = %payload.tool, phase = ?RunPhase::CheckingPolicy);
            let decision = self.policy.evaluate(&payload).await;
            let outcome = if decision.allow {
                tracing::debug!(tool = %payload.tool, phase = ?RunPhase::Invoking);
                match self.executor.execute(&payload.tool, payload.args.clone()).await {
                    Ok(result) => StepOutcome::Succeeded { result },
                    Err(e) => StepOutcome::Failed { error: e.to_string() },
                }
            } else {
                StepOutcome::Denied {
                    reason: denial_reason(&decision),
                }
            };
            (Some(decision), outcome)
        };

        self.memory.add(
            EventKind::Action,
            json!({
                "action": payload,
                "decision": decision,
                "outcome": outcome,
            }),
        );
        tracing::debug!(tool = %payload.tool, phase = ?RunPhase::Recorded, outcome = outcome.label());
        (decision, outcome)
    }

    /// 读取 scheme://key 资源，每次重新请求
    pub async fn read_resource(&self, uri: &str) -> Result<String, AgentError> {
        self.resources.read(uri).await
    }

    pub fn render_prompt(&self, name: &str, args: &Map<String, Value>) -> Result<String, AgentError> {
        self.prompts.render(name, args)
    }

    /// 最近 n 条活动，最新在前
    pub fn recent_activity(&self, n: usize) -> Vec<MemoryEvent> {
        self.memory.recent(n)
    }

    pub fn tools(&self) -> Vec<ToolDescriptor> {
        self.executor.descriptors()
    }

    pub fn resources(&self) -> Vec<ResourceDescriptor> {
        self.resources.descriptors()
    }

    pub fn prompts(&self) -> Vec<PromptDescriptor> {
        self.prompts.descriptors()
    }
}
