//! Prompt 模板：order_triage
//!
//! 纯字符串拼装，无 I/O、不失败；交给下游决策流程（本核心不调用 LLM）。

use serde::Serialize;
use serde_json::{Map, Value};

use crate::core::AgentError;

/// 决策词表（闭集）
pub const TRIAGE_DECISIONS: [&str; 3] = ["REFUND", "CREDIT", "ESCALATE"];

/// 订单问题分诊 prompt
pub fn order_triage(issue: &str, order_json: &str) -> String {
    format!(
        "You are an order-triage assistant. Follow policy; never leak secrets; \
         prefer refunds/credits per policy. Issue:\n\
         {issue}\n\nOrder JSON:\n{order_json}\n\n\
         Decide: {} and provide rationale and next steps.",
        TRIAGE_DECISIONS.join("|")
    )
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromptArgument {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PromptDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub arguments: Vec<PromptArgument>,
}

/// 已知 prompt 列表与按名渲染
#[derive(Debug, Default, Clone)]
pub struct PromptCatalog;

impl PromptCatalog {
    pub fn new() -> Self {
        Self
    }

    pub fn descriptors(&self) -> Vec<PromptDescriptor> {
        vec![PromptDescriptor {
            name: "order_triage",
            description: "Template prompt for safe order triage",
            arguments: vec![
                PromptArgument {
                    name: "issue",
                    description: "Customer issue description",
                    required: true,
                },
                PromptArgument {
                    name: "order_json",
                    description: "Order record (JSON text or object)",
                    required: true,
                },
            ],
        }]
    }

    /// 按名称渲染；未知名称为 UnknownPrompt，缺参数为 PromptArgument
    pub fn render(&self, name: &str, args: &Map<String, Value>) -> Result<String, AgentError> {
        match name {
            "order_triage" => {
                let issue = text_arg(args, "issue")?;
                let order = text_arg(args, "order_json")?;
                Ok(order_triage(&issue, &order))
            }
            other => Err(AgentError::UnknownPrompt(other.to_string())),
        }
    }
}

/// 字符串原样使用，其它 JSON 值序列化为文本（订单记录常以对象传入）
fn text_arg(args: &Map<String, Value>, key: &str) -> Result<String, AgentError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(AgentError::PromptArgument(format!("missing argument: {key}"))),
        Some(other) => Ok(other.to_string()),
    }
}
