//! 编排器构建器：统一的启动期装配
//!
//! 从 AppConfig 创建四个协作服务客户端、注册工具与资源、选择策略闸门；
//! 任何重复名称或非法地址都在这里以 Configuration 错误失败。
//! 测试可注入 Planner / PolicyGate / 额外工具 / 共享 MemoryLog。

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::core::{AgentError, Orchestrator};
use crate::memory::MemoryLog;
use crate::planner::{Planner, RulePlanner};
use crate::policy::{HttpPolicyGate, PolicyGate, StaticPolicyGate};
use crate::prompts::PromptCatalog;
use crate::resources::{
    InventoryResource, RecentMemoryResource, RecentOrdersResource, ResourceRegistry,
};
use crate::tools::{
    AdjustInventoryTool, BackendClient, ChargePaymentTool, CreateOrderTool, SendNotificationTool,
    Tool, ToolExecutor, ToolRegistry,
};

/// 编排器构建器
pub struct OrchestratorBuilder {
    config: AppConfig,
    planner: Option<Arc<dyn Planner>>,
    policy: Option<Arc<dyn PolicyGate>>,
    memory: Option<Arc<MemoryLog>>,
    extra_tools: Vec<Arc<dyn Tool>>,
}

impl OrchestratorBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            planner: None,
            policy: None,
            memory: None,
            extra_tools: Vec::new(),
        }
    }

    /// 替换默认的 RulePlanner
    pub fn with_planner(mut self, planner: Arc<dyn Planner>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// 替换按配置创建的策略闸门
    pub fn with_policy_gate(mut self, policy: Arc<dyn PolicyGate>) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_memory(mut self, memory: Arc<MemoryLog>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// 追加工具；与内置工具重名时 build 失败
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.extra_tools.push(Arc::new(tool));
        self
    }

    fn backend(&self, service: &str, url: &str, timeout_secs: u64) -> Result<BackendClient, AgentError> {
        BackendClient::new(service, url, Duration::from_secs(timeout_secs))
    }

    /// 内置四个工具 + 额外工具
    pub fn build_tool_registry(&self) -> Result<ToolRegistry, AgentError> {
        let b = &self.config.backends;
        let secs = self.config.tools.timeout_secs;
        let mut tools = ToolRegistry::new();
        tools.register(CreateOrderTool::new(self.backend("orders", &b.orders_url, secs)?))?;
        tools.register(ChargePaymentTool::new(self.backend("payments", &b.payments_url, secs)?))?;
        tools.register(AdjustInventoryTool::new(self.backend("inventory", &b.inventory_url, secs)?))?;
        tools.register(SendNotificationTool::new(self.backend(
            "notifications",
            &b.notifications_url,
            secs,
        )?))?;
        for tool in &self.extra_tools {
            tools.register_arc(tool.clone())?;
        }
        Ok(tools)
    }

    fn build_resources(&self, memory: &Arc<MemoryLog>) -> Result<ResourceRegistry, AgentError> {
        let b = &self.config.backends;
        let secs = self.config.tools.resource_timeout_secs;
        let mut resources = ResourceRegistry::new();
        resources.register(InventoryResource::new(self.backend("inventory", &b.inventory_url, secs)?))?;
        resources.register(RecentOrdersResource::new(self.backend("orders", &b.orders_url, secs)?))?;
        resources.register(RecentMemoryResource::new(
            memory.clone(),
            self.config.memory.recent_default,
        ))?;
        Ok(resources)
    }

    fn build_policy(&self) -> Result<Arc<dyn PolicyGate>, AgentError> {
        let p = &self.config.policy;
        if !p.enabled {
            tracing::warn!("policy gate disabled: every action is allowed");
            return Ok(Arc::new(StaticPolicyGate::allow_all()));
        }
        Ok(Arc::new(HttpPolicyGate::new(
            &p.url,
            Duration::from_secs(p.timeout_secs),
            p.on_unavailable,
        )?))
    }

    pub fn build(self) -> Result<Orchestrator, AgentError> {
        self.config.validate()?;

        let memory = self
            .memory
            .clone()
            .unwrap_or_else(|| Arc::new(MemoryLog::new(self.config.memory.capacity)));
        let tools = self.build_tool_registry()?;
        let resources = self.build_resources(&memory)?;
        let policy = match self.policy.clone() {
            Some(p) => p,
            None => self.build_policy()?,
        };
        let planner = self
            .planner
            .clone()
            .unwrap_or_else(|| Arc::new(RulePlanner::new()));

        tracing::info!(tools = ?tools.tool_names(), capacity = memory.capacity(), "orchestrator ready");
        Ok(Orchestrator {
            planner,
            policy,
            executor: ToolExecutor::new(tools, self.config.tools.timeout_secs),
            resources,
            prompts: PromptCatalog::new(),
            memory,
            on_step_failure: self.config.orchestrator.on_step_failure,
        })
    }
}
