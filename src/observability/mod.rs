//! 可观测性：tracing 订阅器
//!
//! 默认 info，可通过 RUST_LOG 覆盖（如 `RUST_LOG=agentfabric=debug` 查看策略决策与运行阶段）。
//! 每次工具调用另有一行 JSON 审计日志，见 tools::executor。

use tracing_subscriber::{filter::Directive, fmt, prelude::*, EnvFilter};

pub fn init() {
    let filter = match "info".parse::<Directive>() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    // 测试或嵌入场景可能已安装过订阅器
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
