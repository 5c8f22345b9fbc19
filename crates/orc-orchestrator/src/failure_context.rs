//! Failure-Context Builder (C9): the opaque value handed to the model
//! when a step fails, carrying everything it needs to propose a
//! recovery (spec §4.8).

use chrono::{DateTime, Utc};
use orc_tools::ToolInfo;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::{ExecutionStep, PlanStep};
use std::collections::HashMap;

/// One previously-tried recovery, kept so the model doesn't repeat
/// itself across attempts.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PriorRecoveryAttempt {
    pub attempt_number: u32,
    pub strategy: String,
    pub error: Option<String>,
}

/// Everything the Recovery Engine (C10) hands the model as input.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FailureContext {
    pub failing_step: PlanStep,
    pub error_text: String,
    pub attempt_number: u32,
    pub prior_recoveries: Vec<PriorRecoveryAttempt>,
    pub execution_id: String,
    pub completed_steps: Vec<ExecutionStep>,
    pub remaining_step_ids: Vec<String>,
    pub managed_state: ManagedStateSnapshot,
    pub tool_catalog: HashMap<String, ToolInfo>,
    pub resource_mappings: HashMap<String, serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl FailureContext {
    #[allow(clippy::too_many_arguments)]
    pub fn build(
        failing_step: PlanStep,
        error_text: impl Into<String>,
        attempt_number: u32,
        prior_recoveries: Vec<PriorRecoveryAttempt>,
        execution_id: impl Into<String>,
        completed_steps: Vec<ExecutionStep>,
        remaining_step_ids: Vec<String>,
        managed_state: ManagedStateSnapshot,
        tool_catalog: HashMap<String, ToolInfo>,
        resource_mappings: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            failing_step,
            error_text: error_text.into(),
            attempt_number,
            prior_recoveries,
            execution_id: execution_id.into(),
            completed_steps,
            remaining_step_ids,
            managed_state,
            tool_catalog,
            resource_mappings,
            timestamp: Utc::now(),
        }
    }

    /// Render a compact text summary for the model prompt. Deliberately
    /// terse rather than porting the teacher's ~500-line hardcoded
    /// prose guidance (spec §9 re-architecture guidance).
    pub fn to_prompt_summary(&self) -> String {
        let tool_names: Vec<&str> = self.tool_catalog.keys().map(|k| k.as_str()).collect();
        format!(
            "Step '{}' (tool '{}') failed on attempt {}: {}\n\
             Available tools: {}\n\
             Prior recovery attempts: {}\n\
             Remaining steps: {}",
            self.failing_step.id,
            self.failing_step.tool_name,
            self.attempt_number,
            self.error_text,
            tool_names.join(", "),
            self.prior_recoveries.len(),
            self.remaining_step_ids.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_types::plan::PlanStep;

    #[test]
    fn prompt_summary_mentions_failing_step_and_error() {
        let context = FailureContext::build(
            PlanStep::new_create("step-vm", "create-ec2-instance"),
            "invalid subnet",
            1,
            Vec::new(),
            "exec-1",
            Vec::new(),
            vec!["step-db".to_string()],
            ManagedStateSnapshot::default(),
            HashMap::new(),
            HashMap::new(),
        );

        let summary = context.to_prompt_summary();
        assert!(summary.contains("step-vm"));
        assert!(summary.contains("invalid subnet"));
    }
}
