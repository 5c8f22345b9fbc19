//! Runtime configuration for the CLI, loaded from the environment with
//! sane defaults — grounded in the teacher's `RecoveryConfig`
//! default-struct pattern (`executor::recovery::RecoveryConfig`).

use std::env;
use std::time::Duration;

/// Knobs that apply to every plan run: where the advisor model lives,
/// how many recovery attempts are allowed, and the log filter.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Base URL of the HTTP recovery-advisor endpoint. When unset, the
    /// CLI falls back to the deterministic mock advisor.
    pub model_endpoint: Option<String>,
    /// Bearer token sent with advisor requests, if any.
    pub model_api_key: Option<String>,
    /// Per-request timeout when calling the advisor endpoint.
    pub model_timeout: Duration,
    /// Recovery attempts allowed per failing step (spec §9 default: 1).
    pub max_recovery_attempts: u32,
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"orc_runner=debug,info"`.
    pub log_filter: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model_endpoint: None,
            model_api_key: None,
            model_timeout: Duration::from_secs(30),
            max_recovery_attempts: 1,
            log_filter: "info".to_string(),
        }
    }
}

impl OrchestratorConfig {
    /// Load from `ORC_*` environment variables, falling back to
    /// `Default::default()` for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model_endpoint: env::var("ORC_MODEL_ENDPOINT").ok(),
            model_api_key: env::var("ORC_MODEL_API_KEY").ok(),
            model_timeout: env::var("ORC_MODEL_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.model_timeout),
            max_recovery_attempts: env::var("ORC_MAX_RECOVERY_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_recovery_attempts),
            log_filter: env::var("RUST_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_recovery_attempt_count() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.max_recovery_attempts, 1);
        assert!(config.model_endpoint.is_none());
    }
}
