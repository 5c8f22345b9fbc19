//! Typed error kinds for the orchestration engine.
//!
//! Each variant corresponds to one row of the error-handling design table:
//! reference resolution, schema validation, tool invocation, identifier
//! extraction, readiness timeouts, state persistence, model consultation,
//! decider aborts, cancellation, and internal invariants.

use thiserror::Error;

/// Errors the engine can surface while executing or recovering a plan.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A `{{step.field.index}}` reference could not be resolved against
    /// the mapping store or managed state.
    #[error("dependency reference not found: {0}")]
    ReferenceUnresolved(String),

    /// A required tool parameter was missing or empty after resolution.
    #[error("schema validation failed for tool '{tool_name}': {detail}")]
    SchemaInvalid { tool_name: String, detail: String },

    /// The backend tool invocation itself returned an error.
    #[error("tool '{tool_name}' invocation failed: {source}")]
    ToolCall {
        tool_name: String,
        #[source]
        source: anyhow::Error,
    },

    /// The identifier extractor found no matching field in the tool
    /// response.
    #[error("could not extract a resource id from '{tool_name}' response")]
    Extraction { tool_name: String },

    /// A readiness poll exceeded the configured maximum wait.
    #[error("readiness wait for '{tool_name}' timed out after {waited_ms}ms")]
    ReadinessTimeout { tool_name: String, waited_ms: u64 },

    /// The `save-state` tool call failed; logged, never fatal.
    #[error("state persistence failed: {0}")]
    StatePersist(String),

    /// The language model could not be consulted, or returned no usable
    /// analysis.
    #[error("model consultation failed: {0}")]
    ModelConsult(String),

    /// The external decider asked the engine to abort the plan.
    #[error("recovery aborted by decider for step '{0}'")]
    DeciderAbort(String),

    /// The cancellation token was set mid-execution.
    #[error("execution cancelled")]
    Cancelled,

    /// A multi-step recovery plan referenced a sub-step id that was never
    /// synthesized, or some other invariant the engine assumes was
    /// violated.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// `api_value_retrieval` step had no `value_type` and the name/
    /// description did not match any known handler.
    #[error("could not infer a value-retrieval handler for step '{0}'")]
    ValueRetrievalInference(String),
}

impl OrchestratorError {
    /// Whether this error kind is eligible for the recovery loop (§7:
    /// everything except state-persist, model-consult and decider-abort,
    /// which have their own handling paths and never re-enter recovery).
    pub fn is_recovery_eligible(&self) -> bool {
        !matches!(
            self,
            OrchestratorError::StatePersist(_)
                | OrchestratorError::ModelConsult(_)
                | OrchestratorError::DeciderAbort(_)
                | OrchestratorError::Cancelled
        )
    }
}
