//! Planner：把目标 + 输入转为有序步骤
//!
//! Planner trait 只有一个同步的 plan 操作（纯函数、无 I/O、不失败）；
//! 默认实现为 RulePlanner，更复杂的策略可以替换而不影响编排层。

pub mod rule;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use rule::RulePlanner;

/// 调用方提供的自由格式输入
pub type Inputs = Map<String, Value>;

/// 步骤绑定的工具调用
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolBinding {
    pub tool: String,
    pub args: Value,
}

/// 计划中的单个步骤；tool 为空表示仅描述、不触发调用
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolBinding>,
}

impl Step {
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            tool: None,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>, args: Value) -> Self {
        self.tool = Some(ToolBinding {
            tool: tool.into(),
            args,
        });
        self
    }
}

/// 有序步骤序列；顺序即执行顺序，不重排、不去重
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Plan {
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn descriptions(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.description.as_str()).collect()
    }
}

/// 规划策略：相同 (goal, inputs) 必须得到相同结果
pub trait Planner: Send + Sync {
    fn plan(&self, goal: &str, inputs: &Inputs) -> Plan;
}
