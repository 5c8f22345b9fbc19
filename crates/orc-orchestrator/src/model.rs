//! Model consultation interface for the Recovery Engine (C10): a
//! `RecoveryAdvisor` trait with a language-model implementation and a
//! deterministic mock, per spec §9 re-architecture guidance ("tests use
//! the deterministic one exclusively").

use async_trait::async_trait;
use std::collections::HashMap;

/// `generate(messages) → text` (spec §6 model contract). The engine is
/// insensitive to the provider; recovery analysis prompts recommend a
/// temperature ≤ 0.1.
#[async_trait]
pub trait RecoveryAdvisor: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
}

/// An HTTP-backed advisor, grounded in the teacher's `GlmClient`
/// request/response shape but provider-agnostic at this trait boundary.
/// The orchestrator never depends on a specific wire format here — only
/// `orc-runner` wires up a concrete HTTP client, so this crate stays
/// free of network dependencies.
pub struct HttpRecoveryAdvisor {
    generate_fn: Box<dyn Fn(&str) -> anyhow::Result<String> + Send + Sync>,
}

impl HttpRecoveryAdvisor {
    pub fn new(generate_fn: impl Fn(&str) -> anyhow::Result<String> + Send + Sync + 'static) -> Self {
        Self {
            generate_fn: Box::new(generate_fn),
        }
    }
}

#[async_trait]
impl RecoveryAdvisor for HttpRecoveryAdvisor {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        (self.generate_fn)(prompt)
    }
}

/// Deterministic advisor for tests and the CLI demo, grounded in
/// `reev-core`'s `MockLLMClient` (predefined-response map with a
/// content-sniffing fallback, and a `with_success` failure toggle).
pub struct MockRecoveryAdvisor {
    simulate_success: bool,
    predefined_responses: HashMap<String, String>,
    default_response: String,
}

impl Default for MockRecoveryAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRecoveryAdvisor {
    pub fn new() -> Self {
        Self {
            simulate_success: true,
            predefined_responses: HashMap::new(),
            default_response: serde_json::json!({
                "recommended_action": "retry_same",
                "recovery_options": [{
                    "action": "retry_same",
                    "tool_name": serde_json::Value::Null,
                    "parameters": {},
                    "success_probability": 0.5,
                    "risk_level": "medium",
                    "reasoning": "no specific guidance available, retry as a safe default",
                }],
            })
            .to_string(),
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.simulate_success = success;
        self
    }

    pub fn with_response(mut self, prompt_contains: impl Into<String>, response: impl Into<String>) -> Self {
        self.predefined_responses
            .insert(prompt_contains.into(), response.into());
        self
    }
}

#[async_trait]
impl RecoveryAdvisor for MockRecoveryAdvisor {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        if !self.simulate_success {
            anyhow::bail!("mock recovery advisor failure for testing");
        }

        for (needle, response) in &self.predefined_responses {
            if prompt.contains(needle.as_str()) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_mock_returns_retry_same_fallback() {
        let advisor = MockRecoveryAdvisor::new();
        let response = advisor.generate("anything").await.unwrap();
        assert!(response.contains("retry_same"));
    }

    #[tokio::test]
    async fn predefined_response_matches_on_substring() {
        let advisor = MockRecoveryAdvisor::new()
            .with_response("invalid subnet", r#"{"recommended_action":"try_alternative"}"#);
        let response = advisor
            .generate("step failed: invalid subnet parameter")
            .await
            .unwrap();
        assert!(response.contains("try_alternative"));
    }

    #[tokio::test]
    async fn simulate_failure_returns_error() {
        let advisor = MockRecoveryAdvisor::new().with_success(false);
        assert!(advisor.generate("anything").await.is_err());
    }
}
