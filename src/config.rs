//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `AGENTFABRIC__*` 覆盖（双下划线表示嵌套，
//! 如 `AGENTFABRIC__POLICY__ON_UNAVAILABLE=deny`），最后兼容部署脚本里的
//! `ORDERS_URL` / `PAYMENTS_URL` / `INVENTORY_URL` / `NOTIFY_URL` / `OPA_URL`。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::{AgentError, StepFailurePolicy};
use crate::policy::OnPolicyUnavailable;
use crate::tools::parse_endpoint;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub backends: BackendsSection,
    pub tools: ToolsSection,
    pub policy: PolicySection,
    pub memory: MemorySection,
    pub orchestrator: OrchestratorSection,
}

/// [server] 段：Protocol Adapter 监听地址
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

/// [backends] 段：四个协作服务的基地址
#[derive(Debug, Clone, Deserialize)]
pub struct BackendsSection {
    #[serde(default = "default_orders_url")]
    pub orders_url: String,
    #[serde(default = "default_payments_url")]
    pub payments_url: String,
    #[serde(default = "default_inventory_url")]
    pub inventory_url: String,
    #[serde(default = "default_notifications_url")]
    pub notifications_url: String,
}

fn default_orders_url() -> String {
    "http://api-orders:8000".to_string()
}

fn default_payments_url() -> String {
    "http://api-payments:8000".to_string()
}

fn default_inventory_url() -> String {
    "http://api-inventory:8000".to_string()
}

fn default_notifications_url() -> String {
    "http://api-notifications:8000".to_string()
}

impl Default for BackendsSection {
    fn default() -> Self {
        Self {
            orders_url: default_orders_url(),
            payments_url: default_payments_url(),
            inventory_url: default_inventory_url(),
            notifications_url: default_notifications_url(),
        }
    }
}

/// [tools] 段：工具与资源调用超时（秒）
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_tool_timeout_secs")]
    pub resource_timeout_secs: u64,
}

fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_tool_timeout_secs(),
            resource_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// [policy] 段：决策端点、超时、端点不可用时的姿态
#[derive(Debug, Clone, Deserialize)]
pub struct PolicySection {
    /// false 时不接决策端点，所有动作放行
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_policy_url")]
    pub url: String,
    #[serde(default = "default_policy_timeout_secs")]
    pub timeout_secs: u64,
    /// allow = fail-open（默认），deny = fail-closed
    #[serde(default)]
    pub on_unavailable: OnPolicyUnavailable,
}

fn default_true() -> bool {
    true
}

fn default_policy_url() -> String {
    "http://opa:8181/v1/data/agent/allow".to_string()
}

fn default_policy_timeout_secs() -> u64 {
    2
}

impl Default for PolicySection {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_policy_url(),
            timeout_secs: default_policy_timeout_secs(),
            on_unavailable: OnPolicyUnavailable::default(),
        }
    }
}

/// [memory] 段：活动日志容量与查询条数
#[derive(Debug, Clone, Deserialize)]
pub struct MemorySection {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_recent_default")]
    pub recent_default: usize,
    #[serde(default = "default_recent_max")]
    pub recent_max: usize,
}

fn default_capacity() -> usize {
    crate::memory::DEFAULT_CAPACITY
}

fn default_recent_default() -> usize {
    10
}

fn default_recent_max() -> usize {
    100
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            recent_default: default_recent_default(),
            recent_max: default_recent_max(),
        }
    }
}

/// [orchestrator] 段
#[derive(Debug, Clone, Deserialize, Default)]
pub struct OrchestratorSection {
    #[serde(default)]
    pub on_step_failure: StepFailurePolicy,
}

impl AppConfig {
    /// 启动期校验；任何一项不合法都是 Configuration 错误
    pub fn validate(&self) -> Result<(), AgentError> {
        parse_endpoint("orders", &self.backends.orders_url)?;
        parse_endpoint("payments", &self.backends.payments_url)?;
        parse_endpoint("inventory", &self.backends.inventory_url)?;
        parse_endpoint("notifications", &self.backends.notifications_url)?;
        if self.policy.enabled {
            parse_endpoint("policy", &self.policy.url)?;
        }
        if self.memory.capacity == 0 {
            return Err(AgentError::Configuration("memory.capacity must be >= 1".into()));
        }
        if self.memory.recent_default > self.memory.recent_max {
            return Err(AgentError::Configuration(
                "memory.recent_default must not exceed memory.recent_max".into(),
            ));
        }
        if self.tools.timeout_secs == 0
            || self.tools.resource_timeout_secs == 0
            || self.policy.timeout_secs == 0
        {
            return Err(AgentError::Configuration("timeouts must be > 0".into()));
        }
        Ok(())
    }

    /// 兼容旧部署的环境变量（ORDERS_URL 等），优先级最高
    pub fn apply_legacy_env(&mut self) {
        self.apply_legacy_vars(|key| std::env::var(key).ok());
    }

    fn apply_legacy_vars(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let set = |target: &mut String, key: &str| {
            if let Some(v) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *target = v;
            }
        };
        set(&mut self.backends.orders_url, "ORDERS_URL");
        set(&mut self.backends.payments_url, "PAYMENTS_URL");
        set(&mut self.backends.inventory_url, "INVENTORY_URL");
        set(&mut self.backends.notifications_url, "NOTIFY_URL");
        set(&mut self.policy.url, "OPA_URL");
    }
}

/// 从 config 目录加载配置，环境变量 AGENTFABRIC__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 则追加该文件（可覆盖前面的键）；文件不存在返回 NotFound
/// 3. 叠加环境变量 AGENTFABRIC__*（双下划线表示嵌套键）
/// 4. 叠加 ORDERS_URL 等旧变量
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    // 显式指定的文件必须存在
    if let Some(ref path) = config_path {
        if !path.exists() {
            return Err(config::ConfigError::NotFound(path.display().to_string()));
        }
        builder = builder.add_source(config::File::from(path.clone()).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("AGENTFABRIC")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let mut cfg: AppConfig = c.try_deserialize()?;
    cfg.apply_legacy_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.memory.capacity, 1000);
        assert_eq!(cfg.memory.recent_default, 10);
        assert_eq!(cfg.memory.recent_max, 100);
        assert_eq!(cfg.policy.timeout_secs, 2);
        assert_eq!(cfg.policy.on_unavailable, OnPolicyUnavailable::Allow);
        assert_eq!(cfg.tools.timeout_secs, 30);
        assert_eq!(cfg.orchestrator.on_step_failure, StepFailurePolicy::Continue);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_endpoint() {
        let mut cfg = AppConfig::default();
        cfg.backends.payments_url = "payments:8000".into();
        assert!(matches!(cfg.validate(), Err(AgentError::Configuration(_))));
    }

    #[test]
    fn test_validate_ignores_policy_url_when_disabled() {
        let mut cfg = AppConfig::default();
        cfg.policy.url = String::new();
        assert!(cfg.validate().is_err());
        cfg.policy.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_recent_bounds() {
        let mut cfg = AppConfig::default();
        cfg.memory.recent_default = 500;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_legacy_vars_override() {
        let vars: HashMap<&str, &str> = [
            ("ORDERS_URL", "http://localhost:9001"),
            ("OPA_URL", "http://localhost:8181/v1/data/x/allow"),
            ("NOTIFY_URL", "  "),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_legacy_vars(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.backends.orders_url, "http://localhost:9001");
        assert_eq!(cfg.policy.url, "http://localhost:8181/v1/data/x/allow");
        assert_eq!(cfg.backends.notifications_url, "http://api-notifications:8000");
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("fail-closed.toml");
        let err = load_config(Some(missing)).err().unwrap();
        assert!(matches!(err, config::ConfigError::NotFound(ref p) if p.ends_with("fail-closed.toml")));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[policy]
on_unavailable = "deny"
timeout_secs = 5

[memory]
capacity = 3

[orchestrator]
on_step_failure = "abort"
"#
        )
        .unwrap();
        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.policy.on_unavailable, OnPolicyUnavailable::Deny);
        assert_eq!(cfg.policy.timeout_secs, 5);
        assert_eq!(cfg.memory.capacity, 3);
        assert_eq!(cfg.memory.recent_max, 100);
        assert_eq!(cfg.orchestrator.on_step_failure, StepFailurePolicy::Abort);
    }
}
