//! AgentFabric 编排服务
//!
//! 入口：初始化日志、加载配置、构建编排器，并启动 HTTP Protocol Adapter。
//! 配置文件：`--config <path>` 或环境变量 AGENTFABRIC_CONFIG，缺省读取 config/default.toml。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use agentfabric::config::load_config;
use agentfabric::core::OrchestratorBuilder;
use agentfabric::observability;
use agentfabric::server::{router, AppState};

fn config_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    std::env::var("AGENTFABRIC_CONFIG").ok().map(PathBuf::from)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config = load_config(config_path()).context("Failed to load config")?;
    let bind = config.server.bind.clone();
    let memory = config.memory.clone();

    let orchestrator = OrchestratorBuilder::new(config)
        .build()
        .context("Failed to build orchestrator")?;
    let state = Arc::new(AppState::new(Arc::new(orchestrator), &memory));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    tracing::info!(%bind, "agentfabric listening");
    axum::serve(listener, app).await.context("Server failed")?;
    Ok(())
}
