//! Recovery Engine (C10): ReAct-style state machine driving a single
//! failed step back to success, under guidance from a `RecoveryAdvisor`
//! (spec §4.9).

use crate::failure_context::FailureContext;
use crate::mapping_store::ResourceMappingStore;
use crate::model::RecoveryAdvisor;
use crate::progress::ProgressSink;
use crate::step_executor;
use async_trait::async_trait;
use orc_core::json_scavenger;
use orc_core::CancellationToken;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::{ExecutionStep, OrchestratorError, PlanStep, UpdateType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{instrument, warn};

/// One of the five recovery actions the model (or the fallback
/// analysis) can propose for a failed step (spec §4.9 option scoring).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecoveryActionKind {
    RetrySame,
    TryAlternative,
    ModifyParams,
    SkipStep,
    FailPlan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// One candidate recovery, as proposed by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryOption {
    pub action: RecoveryActionKind,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    pub success_probability: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub reasoning: String,
}

/// One sub-step of a model-proposed `multi_step_plan`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiStepSubStep {
    pub step_order: u32,
    pub tool_name: String,
    #[serde(default)]
    pub parameters: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub purpose: String,
}

/// The model's full recovery analysis for one failed step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRecoveryAnalysis {
    #[serde(default)]
    pub recommended_action: Option<String>,
    #[serde(default)]
    pub recovery_options: Vec<RecoveryOption>,
    #[serde(default)]
    pub multi_step_plan: Option<Vec<MultiStepSubStep>>,
}

/// Decision returned by an external decider (spec §6 decider contract:
/// `{abort: true}`, `{selectedOptionIndex: "skip"}`, or an integer).
pub enum RecoveryDecision {
    Abort,
    Skip,
    SelectIndex(usize),
}

#[async_trait]
pub trait RecoveryDecider: Send + Sync {
    async fn decide(
        &self,
        step_id: &str,
        failure_context: &FailureContext,
        options: &[RecoveryOption],
    ) -> RecoveryDecision;
}

/// Total attempts, successes, failures, time spent — spec §12
/// supplemental feature, carried over from the teacher's
/// `RecoveryMetrics`, broken down by outcome rather than strategy name
/// since this engine has one ReAct loop, not a fixed strategy list.
#[derive(Debug, Default, Clone)]
pub struct RecoveryMetrics {
    pub total_attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub total_time_ms: u64,
}

fn risk_bonus(risk: RiskLevel) -> f64 {
    match risk {
        RiskLevel::Low => 0.1,
        RiskLevel::Medium => 0.0,
        RiskLevel::High => -0.2,
    }
}

fn action_bonus(action: RecoveryActionKind) -> f64 {
    match action {
        RecoveryActionKind::RetrySame => 0.05,
        RecoveryActionKind::TryAlternative => 0.1,
        RecoveryActionKind::ModifyParams => 0.0,
        RecoveryActionKind::SkipStep => -0.1,
        RecoveryActionKind::FailPlan => 0.0,
    }
}

/// `score = success_probability + risk_bonus + action_bonus` (spec §4.9).
pub fn score_option(option: &RecoveryOption) -> f64 {
    option.success_probability + risk_bonus(option.risk_level) + action_bonus(option.action)
}

/// Highest-scoring option wins; ties broken by earlier index.
pub fn select_best_option(options: &[RecoveryOption]) -> Option<usize> {
    options
        .iter()
        .enumerate()
        .map(|(i, o)| (i, score_option(o)))
        .fold(None, |best: Option<(usize, f64)>, (i, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((i, score)),
        })
        .map(|(i, _)| i)
}

/// Tool-less fallback when the model's output has no parseable JSON:
/// a retry plus, for `create-*` steps, a swap to the discovery tool.
fn fallback_analysis(failing_step: &PlanStep) -> ModelRecoveryAnalysis {
    let mut options = vec![RecoveryOption {
        action: RecoveryActionKind::RetrySame,
        tool_name: None,
        parameters: HashMap::new(),
        success_probability: 0.4,
        risk_level: RiskLevel::Medium,
        reasoning: "model output had no parseable JSON, falling back to a safe retry".to_string(),
    }];

    if failing_step.tool_name.starts_with("create-") {
        options.push(RecoveryOption {
            action: RecoveryActionKind::TryAlternative,
            tool_name: Some(orc_constants::DISCOVER_THEN_CREATE.to_string()),
            parameters: failing_step.tool_params.clone(),
            success_probability: 0.5,
            risk_level: RiskLevel::Medium,
            reasoning: "model output had no parseable JSON, trying a similar tool".to_string(),
        });
    }

    ModelRecoveryAnalysis {
        recommended_action: None,
        recovery_options: options,
        multi_step_plan: None,
    }
}

async fn validate_option(
    option: &RecoveryOption,
    failing_step: &PlanStep,
    attempt_number: u32,
    remaining_steps: &[PlanStep],
    tools: &Arc<orc_tools::ToolRegistry>,
) -> Result<(), String> {
    match option.action {
        RecoveryActionKind::RetrySame => {
            if attempt_number >= 3 {
                return Err("retry_same exhausted: attempt_number >= 3".to_string());
            }
            Ok(())
        }
        RecoveryActionKind::TryAlternative => {
            let tool_name = option
                .tool_name
                .as_deref()
                .ok_or_else(|| "try_alternative option has no tool_name".to_string())?;
            let catalog = tools.list_tools().await;
            let info = catalog
                .get(tool_name)
                .ok_or_else(|| format!("alternative tool '{tool_name}' does not exist"))?;
            for key in &info.parameters.required {
                if !option.parameters.contains_key(key) {
                    return Err(format!(
                        "alternative tool '{tool_name}' missing required parameter '{key}'"
                    ));
                }
            }
            Ok(())
        }
        RecoveryActionKind::ModifyParams => {
            const CRITICAL_KEYS: &[&str] = &["vpcId", "subnetId", "securityGroupId", "keyName"];
            for key in CRITICAL_KEYS {
                if let (Some(new), Some(old)) =
                    (option.parameters.get(*key), failing_step.tool_params.get(*key))
                {
                    if new != old {
                        warn!(key, "modify_params changes a critical key from the original step");
                    }
                }
            }
            Ok(())
        }
        RecoveryActionKind::SkipStep => {
            let marker = format!("{{{{{}.", failing_step.id);
            let blocked = remaining_steps
                .iter()
                .any(|s| s.tool_params.values().any(|v| v.to_string().contains(&marker)));
            if blocked {
                return Err("skip_step blocked: a remaining step still references this step".to_string());
            }
            Ok(())
        }
        RecoveryActionKind::FailPlan => Ok(()),
    }
}

fn apply_option(failing_step: &PlanStep, option: &RecoveryOption) -> PlanStep {
    let mut step = failing_step.clone();
    match option.action {
        RecoveryActionKind::TryAlternative => {
            if let Some(tool_name) = &option.tool_name {
                step.tool_name = tool_name.clone();
            }
            if !option.parameters.is_empty() {
                step.tool_params = option.parameters.clone();
            }
        }
        RecoveryActionKind::ModifyParams => {
            for (key, value) in &option.parameters {
                step.tool_params.insert(key.clone(), value.clone());
            }
        }
        _ => {}
    }
    step
}

/// Synthesize and execute a model-proposed `multi_step_plan`, one
/// sub-step at a time, through the ordinary Step Executor (C7) — every
/// sub-step benefits from the usual reference-resolution machinery.
/// The final sub-step's result is returned as the recovery result.
#[allow(clippy::too_many_arguments)]
async fn execute_multi_step_plan(
    failing_step: &PlanStep,
    sub_plan: &[MultiStepSubStep],
    execution_id: &str,
    tools: &Arc<orc_tools::ToolRegistry>,
    mapping_store: &ResourceMappingStore,
    progress: &ProgressSink,
    managed_state: &ManagedStateSnapshot,
    test_mode: bool,
    cancellation: Option<&CancellationToken>,
) -> Result<ExecutionStep, OrchestratorError> {
    let mut ordered = sub_plan.to_vec();
    ordered.sort_by_key(|s| s.step_order);

    let mut last_result = None;

    for (i, sub_step) in ordered.iter().enumerate() {
        let sub_id = format!("{}-recovery-{}", failing_step.id, i + 1);
        progress
            .emit_kind(
                execution_id,
                UpdateType::StepRecoveryProgress,
                Some(&sub_id),
                sub_step.purpose.clone(),
            )
            .await;

        let tool_is_known = tools.contains(&sub_step.tool_name).await;
        let handler_is_known = orc_core::value_retrieval::KNOWN_HANDLERS.contains(&sub_step.tool_name.as_str());

        let mut synthesized = if tool_is_known {
            PlanStep::new_create(sub_id.clone(), sub_step.tool_name.clone())
                .with_description(sub_step.purpose.clone())
        } else if handler_is_known {
            let mut step = PlanStep::new_value_retrieval(sub_id.clone(), sub_step.tool_name.clone())
                .with_description(sub_step.purpose.clone());
            step.params.filters = sub_step.parameters.clone();
            step
        } else {
            return Err(OrchestratorError::InternalInvariant(format!(
                "multi-step recovery sub-step references unknown tool or handler '{}'",
                sub_step.tool_name
            )));
        };

        if tool_is_known {
            synthesized.tool_params = sub_step.parameters.clone();
        }

        let result = step_executor::execute_step(
            &mut synthesized,
            execution_id,
            tools,
            mapping_store,
            progress,
            Some(managed_state),
            test_mode,
            cancellation,
        )
        .await?;

        last_result = Some(result);
    }

    last_result.ok_or_else(|| {
        OrchestratorError::InternalInvariant("multi_step_plan had no sub-steps".to_string())
    })
}

/// Drive the full state machine for one failed step: build context,
/// consult the model, parse its JSON, pick an option (decider or
/// auto-score), validate it, apply it, execute it. Returns the
/// completed/skipped Execution Step on success, or the (possibly
/// original) error on failure — recovery is attempted exactly once per
/// failing step by default (spec §7).
#[allow(clippy::too_many_arguments)]
#[instrument(skip_all, fields(step_id = %failing_step.id, attempt_number))]
pub async fn attempt_recovery(
    failing_step: &PlanStep,
    error_text: &str,
    attempt_number: u32,
    execution_id: &str,
    completed_steps: &[ExecutionStep],
    remaining_steps: &[PlanStep],
    managed_state: &ManagedStateSnapshot,
    tools: &Arc<orc_tools::ToolRegistry>,
    mapping_store: &ResourceMappingStore,
    progress: &ProgressSink,
    advisor: &dyn RecoveryAdvisor,
    decider: Option<&dyn RecoveryDecider>,
    metrics: &mut RecoveryMetrics,
    test_mode: bool,
    cancellation: Option<&orc_core::CancellationToken>,
) -> Result<ExecutionStep, OrchestratorError> {
    if cancellation.is_some_and(|c| c.is_cancelled()) {
        return Err(OrchestratorError::Cancelled);
    }

    metrics.total_attempts += 1;
    let start = std::time::Instant::now();

    progress
        .emit_kind(
            execution_id,
            UpdateType::StepRecoveryGenerating,
            Some(&failing_step.id),
            "consulting recovery advisor",
        )
        .await;

    let tool_catalog = tools.list_tools().await;
    let context = FailureContext::build(
        failing_step.clone(),
        error_text.to_string(),
        attempt_number,
        Vec::new(),
        execution_id.to_string(),
        completed_steps.to_vec(),
        remaining_steps.iter().map(|s| s.id.clone()).collect(),
        managed_state.clone(),
        tool_catalog,
        HashMap::new(),
    );

    let raw_response = match advisor.generate(&context.to_prompt_summary()).await {
        Ok(text) => text,
        Err(e) => {
            metrics.failures += 1;
            return Err(OrchestratorError::ModelConsult(e.to_string()));
        }
    };

    let analysis: ModelRecoveryAnalysis = match json_scavenger::scavenge(&raw_response) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|_| fallback_analysis(failing_step)),
        None => fallback_analysis(failing_step),
    };

    if analysis.recovery_options.is_empty() {
        // Boundary case (spec §8): zero recovery options returns the
        // original error unchanged, no silent skip.
        metrics.failures += 1;
        metrics.total_time_ms += start.elapsed().as_millis() as u64;
        return Err(OrchestratorError::ToolCall {
            tool_name: failing_step.tool_name.clone(),
            source: anyhow::anyhow!(error_text.to_string()),
        });
    }

    progress
        .emit_kind(
            execution_id,
            UpdateType::StepRecoveryStarted,
            Some(&failing_step.id),
            "recovery options received",
        )
        .await;

    let selected_index = if let Some(decider) = decider {
        match decider
            .decide(&failing_step.id, &context, &analysis.recovery_options)
            .await
        {
            RecoveryDecision::Abort => {
                metrics.failures += 1;
                return Err(OrchestratorError::DeciderAbort(failing_step.id.clone()));
            }
            RecoveryDecision::Skip => {
                progress
                    .emit_kind(
                        execution_id,
                        UpdateType::StepRecoveryCompleted,
                        Some(&failing_step.id),
                        "decider requested skip",
                    )
                    .await;
                metrics.successes += 1;
                return Ok(
                    ExecutionStep::start(failing_step.id.clone(), failing_step.name.clone())
                        .skip("user_request"),
                );
            }
            RecoveryDecision::SelectIndex(i) => i,
        }
    } else {
        select_best_option(&analysis.recovery_options)
            .ok_or_else(|| OrchestratorError::InternalInvariant("scoring produced no candidate".to_string()))?
    };

    let option = analysis
        .recovery_options
        .get(selected_index)
        .ok_or_else(|| {
            OrchestratorError::InternalInvariant(format!(
                "selected recovery option index {selected_index} out of range"
            ))
        })?
        .clone();

    if let Err(validation_error) =
        validate_option(&option, failing_step, attempt_number, remaining_steps, tools).await
    {
        warn!(error = %validation_error, "selected recovery option failed validation");
        metrics.failures += 1;
        return Err(OrchestratorError::ToolCall {
            tool_name: failing_step.tool_name.clone(),
            source: anyhow::anyhow!(validation_error),
        });
    }

    if option.action == RecoveryActionKind::SkipStep {
        progress
            .emit_kind(
                execution_id,
                UpdateType::StepRecoveryCompleted,
                Some(&failing_step.id),
                "skipped by auto-scoring",
            )
            .await;
        metrics.successes += 1;
        return Ok(
            ExecutionStep::start(failing_step.id.clone(), failing_step.name.clone())
                .skip("recovery_skip"),
        );
    }

    if option.action == RecoveryActionKind::FailPlan {
        metrics.failures += 1;
        return Err(OrchestratorError::ToolCall {
            tool_name: failing_step.tool_name.clone(),
            source: anyhow::anyhow!(error_text.to_string()),
        });
    }

    progress
        .emit_kind(
            execution_id,
            UpdateType::StepRecoveryProgress,
            Some(&failing_step.id),
            "executing recovery option",
        )
        .await;

    let result = if let Some(sub_plan) = &analysis.multi_step_plan {
        execute_multi_step_plan(
            failing_step,
            sub_plan,
            execution_id,
            tools,
            mapping_store,
            progress,
            managed_state,
            test_mode,
            cancellation,
        )
        .await
    } else {
        let mut modified_step = apply_option(failing_step, &option);
        step_executor::execute_step(
            &mut modified_step,
            execution_id,
            tools,
            mapping_store,
            progress,
            Some(managed_state),
            test_mode,
            cancellation,
        )
        .await
    };

    metrics.total_time_ms += start.elapsed().as_millis() as u64;

    match result {
        Ok(step) => {
            metrics.successes += 1;
            progress
                .emit_kind(
                    execution_id,
                    UpdateType::StepRecoveryCompleted,
                    Some(&failing_step.id),
                    "recovery succeeded",
                )
                .await;
            Ok(step)
        }
        Err(e) => {
            metrics.failures += 1;
            progress
                .emit_kind(
                    execution_id,
                    UpdateType::StepRecoveryFailed,
                    Some(&failing_step.id),
                    e.to_string(),
                )
                .await;
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(action: RecoveryActionKind, probability: f64, risk: RiskLevel) -> RecoveryOption {
        RecoveryOption {
            action,
            tool_name: None,
            parameters: HashMap::new(),
            success_probability: probability,
            risk_level: risk,
            reasoning: String::new(),
        }
    }

    #[test]
    fn scenario_d_alternative_beats_retry_by_score() {
        let options = vec![
            option(RecoveryActionKind::RetrySame, 0.4, RiskLevel::Low),
            option(RecoveryActionKind::TryAlternative, 0.8, RiskLevel::Low),
        ];
        assert!((score_option(&options[0]) - 0.55).abs() < 1e-9);
        assert!((score_option(&options[1]) - 0.95).abs() < 1e-9);
        assert_eq!(select_best_option(&options), Some(1));
    }

    #[test]
    fn ties_are_broken_by_earlier_index() {
        let options = vec![
            option(RecoveryActionKind::ModifyParams, 0.5, RiskLevel::Medium),
            option(RecoveryActionKind::ModifyParams, 0.5, RiskLevel::Medium),
        ];
        assert_eq!(select_best_option(&options), Some(0));
    }

    #[tokio::test]
    async fn zero_recovery_options_returns_original_error_unchanged() {
        let tools = Arc::new(orc_tools::ToolRegistry::new());
        tools.ensure_capabilities().await;
        let mapping_store = ResourceMappingStore::new();
        let (progress, mut rx) = crate::progress::channel(8);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        let advisor = crate::model::MockRecoveryAdvisor::new()
            .with_response("step-vm", r#"{"recovery_options": []}"#);
        let mut metrics = RecoveryMetrics::default();
        let failing_step = PlanStep::new_create("step-vm", orc_constants::CREATE_EC2_INSTANCE);

        let err = attempt_recovery(
            &failing_step,
            "original tool failure",
            1,
            "exec-1",
            &[],
            &[],
            &ManagedStateSnapshot::default(),
            &tools,
            &mapping_store,
            &progress,
            &advisor,
            None,
            &mut metrics,
            true,
            None,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("original tool failure"));
    }

    #[tokio::test]
    async fn scenario_d_recovery_swaps_tool_and_succeeds() {
        let tools = Arc::new(orc_tools::ToolRegistry::new());
        tools.ensure_capabilities().await;
        let mapping_store = ResourceMappingStore::new();
        let (progress, mut rx) = crate::progress::channel(16);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let advisor_response = serde_json::json!({
            "recovery_options": [
                {"action": "retry_same", "success_probability": 0.4, "risk_level": "low"},
                {
                    "action": "try_alternative",
                    "tool_name": "discover-then-create",
                    "parameters": {"resource_type": "instance"},
                    "success_probability": 0.8,
                    "risk_level": "low",
                },
            ]
        })
        .to_string();
        let advisor = crate::model::MockRecoveryAdvisor::new().with_response("step-vm", advisor_response);

        let mut metrics = RecoveryMetrics::default();
        let failing_step = PlanStep::new_create("step-vm", orc_constants::CREATE_EC2_INSTANCE)
            .with_tool_param("subnet_id", serde_json::json!("subnet-bad"));

        let recovered = attempt_recovery(
            &failing_step,
            "invalid subnet",
            1,
            "exec-1",
            &[],
            &[],
            &ManagedStateSnapshot::default(),
            &tools,
            &mapping_store,
            &progress,
            &advisor,
            None,
            &mut metrics,
            true,
            None,
        )
        .await
        .unwrap();

        assert_eq!(recovered.status, orc_types::StepStatus::Completed);
        assert_eq!(recovered.output["mcp_tool"], "discover-then-create");
        assert_eq!(metrics.successes, 1);
    }
}
