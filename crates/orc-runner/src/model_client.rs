//! Concrete HTTP wiring for the Recovery Engine's model interface.
//!
//! `orc-orchestrator` stays network-agnostic (its `HttpRecoveryAdvisor`
//! takes a plain closure); this crate owns the actual `reqwest` client,
//! since only the binary knows the endpoint, auth, and timeout the
//! operator configured.

use async_trait::async_trait;
use orc_orchestrator::RecoveryAdvisor;
use std::time::Duration;

/// Posts the recovery prompt as `{"prompt": ...}` to a configured
/// endpoint and returns the response body's `text` field, or the raw
/// body if it isn't a JSON object shaped that way.
pub struct HttpModelAdvisor {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpModelAdvisor {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

#[async_trait]
impl RecoveryAdvisor for HttpModelAdvisor {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "prompt": prompt }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?.error_for_status()?;
        let body: serde_json::Value = response.json().await?;
        match body.get("text").and_then(|v| v.as_str()) {
            Some(text) => Ok(text.to_string()),
            None => Ok(body.to_string()),
        }
    }
}
