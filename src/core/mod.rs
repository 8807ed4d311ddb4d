//! 核心编排层：错误、运行状态、构建器、编排器

pub mod builder;
pub mod error;
pub mod orchestrator;
pub mod state;

pub use builder::OrchestratorBuilder;
pub use error::{AgentError, PolicyError, ToolInvocationError};
pub use orchestrator::Orchestrator;
pub use state::{
    ActRequest, ActResponse, RunPhase, StepFailurePolicy, StepOutcome, StepReport, ToolCallReport,
};
