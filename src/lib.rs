//! AgentFabric - 订单场景的智能体编排核心
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 编排器、构建器、运行状态、错误类型
//! - **memory**: 有界活动日志（计划与动作记录）
//! - **observability**: tracing 初始化
//! - **planner**: 目标 → 计划的规则规划器
//! - **policy**: 动作执行前的策略闸门（OPA 风格决策端点）
//! - **prompts**: 提示词模板目录
//! - **resources**: 只读资源（库存、近期订单、近期活动）
//! - **server**: HTTP Protocol Adapter（axum）
//! - **tools**: 工具注册表、执行器与四个协作服务工具

pub mod config;
pub mod core;
pub mod memory;
pub mod observability;
pub mod planner;
pub mod policy;
pub mod prompts;
pub mod resources;
pub mod server;
pub mod tools;
