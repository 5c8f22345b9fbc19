//! The `Tool` trait every backend tool implements (spec §4.1).

use crate::schema::InputSchema;
use async_trait::async_trait;
use thiserror::Error;

/// Error surface a tool implementation can return. The registry wraps
/// this into `orc_types::OrchestratorError::ToolCall` at the call site.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("missing required parameter '{0}'")]
    MissingParam(String),

    #[error("invalid value for parameter '{name}': {detail}")]
    InvalidParam { name: String, detail: String },

    #[error("backend rejected the request: {0}")]
    Backend(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A single backend operation the orchestrator can invoke by name.
///
/// Implementations are registered into a `ToolRegistry` behind an
/// `Arc<dyn Tool>`, so `call` takes `&self` and must be safe to invoke
/// concurrently from multiple in-flight steps.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Stable, unique tool name (matches one of `orc_constants`' consts).
    fn name(&self) -> &str;

    /// Human-readable summary, surfaced in the tool catalog and in the
    /// failure context the recovery engine builds.
    fn description(&self) -> &str;

    /// JSON-schema-shaped parameter description for this tool.
    fn input_schema(&self) -> InputSchema;

    /// Execute the tool against already-resolved parameters and return
    /// its raw JSON response. The Identifier Extractor reads fields out
    /// of this value; callers must not assume any particular shape here
    /// beyond what `description()` documents.
    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError>;
}
