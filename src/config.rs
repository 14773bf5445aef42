//! Environment-driven configuration.
//!
//! The only shared state in the system is read-only configuration:
//! upstream agent addresses for the gateway and engine settings for the
//! agents. Everything comes from environment variables with local-dev
//! defaults.

use crate::agents::AgentKind;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Rule engine settings shared by the three agent services.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// MeTTa interpreter binary.
    pub binary: PathBuf,
    /// Directory holding the per-agent rule modules.
    pub rules_dir: PathBuf,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            binary: env::var("METTA_BIN").unwrap_or_else(|_| "metta".to_string()).into(),
            rules_dir: env::var("RULES_DIR").unwrap_or_else(|_| "rules".to_string()).into(),
        }
    }

    /// Path of the rule module for one agent.
    pub fn module_path(&self, kind: AgentKind) -> PathBuf {
        self.rules_dir.join(kind.module_file())
    }
}

/// Gateway settings: one independently configurable base address per
/// upstream agent, plus the forwarding timeout.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub validation_url: String,
    pub valuation_url: String,
    pub recommendation_url: String,
    pub timeout: Duration,
}

impl GatewayConfig {
    pub fn from_env() -> Self {
        let timeout_secs = env::var("GATEWAY_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);
        Self {
            validation_url: env::var("VALIDATION_AGENT_URL")
                .unwrap_or_else(|_| "http://localhost:5001".to_string()),
            valuation_url: env::var("VALUATION_AGENT_URL")
                .unwrap_or_else(|_| "http://localhost:5002".to_string()),
            recommendation_url: env::var("RECOMMENDATION_AGENT_URL")
                .unwrap_or_else(|_| "http://localhost:5003".to_string()),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn upstream_base(&self, kind: AgentKind) -> &str {
        match kind {
            AgentKind::Validation => &self.validation_url,
            AgentKind::Valuation => &self.valuation_url,
            AgentKind::Recommendation => &self.recommendation_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_path_is_per_agent() {
        let config = EngineConfig {
            binary: "metta".into(),
            rules_dir: "rules".into(),
        };
        assert_eq!(
            config.module_path(AgentKind::Validation),
            PathBuf::from("rules/validation_rules.metta")
        );
        assert_eq!(
            config.module_path(AgentKind::Recommendation),
            PathBuf::from("rules/recommendation_rules.metta")
        );
    }

    #[test]
    fn upstream_base_selects_per_agent_address() {
        let config = GatewayConfig {
            validation_url: "http://v1".into(),
            valuation_url: "http://v2".into(),
            recommendation_url: "http://v3".into(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(config.upstream_base(AgentKind::Valuation), "http://v2");
    }
}
