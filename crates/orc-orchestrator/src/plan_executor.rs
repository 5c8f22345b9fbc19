//! Plan Executor (C11): turns a `Plan` into a `PlanExecution`, running
//! each step through the Step Executor (C7) and, on a recovery-eligible
//! failure, through the Recovery Engine (C10) exactly once per step
//! (spec §4.7, §9 "MaxAttempts=1 at the outer wrapper").

use crate::mapping_store::ResourceMappingStore;
use crate::model::RecoveryAdvisor;
use crate::progress::ProgressSink;
use crate::recovery::{self, RecoveryDecider, RecoveryMetrics};
use crate::step_executor;
use orc_core::CancellationToken;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::{ExecutionStep, Plan, PlanExecution, PlanExecutionStatus, UpdateType};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Execution-wide knobs. `max_recovery_attempts` defaults to 1 — a
/// failing step gets one model-guided recovery attempt, not a retry
/// loop, matching the open-question decision in spec §9.
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    pub dry_run: bool,
    pub max_recovery_attempts: u32,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_recovery_attempts: 1,
        }
    }
}

/// Owns everything needed to run one plan to completion: the tool
/// catalog, the resource-mapping store, the progress sink, and the
/// recovery advisor/decider pair.
pub struct PlanExecutor {
    tools: Arc<orc_tools::ToolRegistry>,
    mapping_store: ResourceMappingStore,
    progress: ProgressSink,
    advisor: Arc<dyn RecoveryAdvisor>,
    decider: Option<Arc<dyn RecoveryDecider>>,
    config: ExecutorConfig,
    cancellation: CancellationToken,
}

impl PlanExecutor {
    pub fn new(
        tools: Arc<orc_tools::ToolRegistry>,
        mapping_store: ResourceMappingStore,
        progress: ProgressSink,
        advisor: Arc<dyn RecoveryAdvisor>,
        decider: Option<Arc<dyn RecoveryDecider>>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            tools,
            mapping_store,
            progress,
            advisor,
            decider,
            config,
            cancellation: CancellationToken::new(),
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    #[instrument(skip_all, fields(plan_id = %plan.id, dry_run = self.config.dry_run))]
    pub async fn execute(&self, plan: &Plan, managed_state: &ManagedStateSnapshot) -> PlanExecution {
        let mut execution = PlanExecution::new(plan.id.clone());
        self.progress
            .emit_kind(
                &execution.id,
                UpdateType::ExecutionStarted,
                None,
                format!("executing plan '{}' ({} steps)", plan.id, plan.execution_plan.len()),
            )
            .await;

        if self.config.dry_run {
            self.execute_dry_run(plan, &mut execution).await;
            execution.finalize();
            self.emit_completion(&execution).await;
            return execution;
        }

        let mut metrics = RecoveryMetrics::default();

        for i in 0..plan.execution_plan.len() {
            if self.cancellation.is_cancelled() {
                execution.push_error("execution cancelled".to_string());
                break;
            }

            let mut step = plan.execution_plan[i].clone();
            let remaining: Vec<orc_types::PlanStep> = plan.execution_plan[i + 1..].to_vec();

            self.progress
                .emit_kind(
                    &execution.id,
                    UpdateType::StepStarted,
                    Some(&step.id),
                    step.description.clone(),
                )
                .await;

            let outcome = step_executor::execute_step(
                &mut step,
                &execution.id,
                &self.tools,
                &self.mapping_store,
                &self.progress,
                Some(managed_state),
                false,
                Some(&self.cancellation),
            )
            .await;

            let outcome = match outcome {
                Ok(record) => Ok(record),
                Err(err) if err.is_recovery_eligible() && self.config.max_recovery_attempts > 0 => {
                    recovery::attempt_recovery(
                        &step,
                        &err.to_string(),
                        1,
                        &execution.id,
                        &execution.steps,
                        &remaining,
                        managed_state,
                        &self.tools,
                        &self.mapping_store,
                        &self.progress,
                        self.advisor.as_ref(),
                        self.decider.as_deref(),
                        &mut metrics,
                        false,
                        Some(&self.cancellation),
                    )
                    .await
                }
                Err(err) => Err(err),
            };

            match outcome {
                Ok(record) => {
                    self.save_state(&step.id).await;
                    self.progress
                        .emit_kind(
                            &execution.id,
                            UpdateType::StepCompleted,
                            Some(&step.id),
                            "step completed",
                        )
                        .await;
                    execution.steps.push(record);
                }
                Err(err) => {
                    let failed = ExecutionStep::start(step.id.clone(), step.name.clone()).fail(err.to_string());
                    execution.steps.push(failed);
                    execution.push_error(err.to_string());
                    self.progress
                        .emit_kind(
                            &execution.id,
                            UpdateType::StepFailedFinal,
                            Some(&step.id),
                            err.to_string(),
                        )
                        .await;
                    break;
                }
            }
        }

        execution.finalize();
        self.emit_completion(&execution).await;
        execution
    }

    async fn execute_dry_run(&self, plan: &Plan, execution: &mut PlanExecution) {
        for step in &plan.execution_plan {
            if self.cancellation.is_cancelled() {
                execution.push_error("execution cancelled".to_string());
                break;
            }
            self.progress
                .emit_kind(
                    &execution.id,
                    UpdateType::StepStarted,
                    Some(&step.id),
                    step.description.clone(),
                )
                .await;

            tokio::time::sleep(Duration::from_millis(500)).await;

            let mut output = std::collections::HashMap::new();
            output.insert("status".to_string(), serde_json::json!("success"));
            output.insert("dry_run".to_string(), serde_json::json!(true));
            let record = ExecutionStep::start(step.id.clone(), step.name.clone()).complete(output);

            self.progress
                .emit_kind(&execution.id, UpdateType::StepCompleted, Some(&step.id), "dry run")
                .await;
            execution.steps.push(record);
        }
    }

    /// Invoke `save-state` after a successful step. Failures are logged
    /// and never propagate — state persistence is best-effort (spec
    /// §4.7, error-handling design table).
    async fn save_state(&self, step_id: &str) {
        match self
            .tools
            .invoke(orc_constants::SAVE_STATE, serde_json::json!({}))
            .await
        {
            Some(Ok(_)) => info!(step_id, "state persisted"),
            Some(Err(e)) => warn!(step_id, error = %e, "save-state failed, continuing"),
            None => warn!(step_id, "save-state tool not registered, skipping persistence"),
        }
    }

    async fn emit_completion(&self, execution: &PlanExecution) {
        let message = match execution.status {
            PlanExecutionStatus::Completed => "execution completed".to_string(),
            PlanExecutionStatus::Failed => format!("execution failed: {} error(s)", execution.errors.len()),
            PlanExecutionStatus::Running => "execution ended while still running".to_string(),
        };
        self.progress
            .emit_kind(&execution.id, UpdateType::ExecutionCompleted, None, message)
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MockRecoveryAdvisor;
    use orc_types::PlanStep;

    async fn executor(dry_run: bool) -> (PlanExecutor, tokio::sync::mpsc::Receiver<orc_types::ExecutionUpdate>) {
        let tools = Arc::new(orc_tools::ToolRegistry::new());
        tools.ensure_capabilities().await;
        let mapping_store = ResourceMappingStore::new();
        let (progress, rx) = crate::progress::channel(32);
        let advisor: Arc<dyn RecoveryAdvisor> = Arc::new(MockRecoveryAdvisor::new());
        let config = ExecutorConfig {
            dry_run,
            ..Default::default()
        };
        (
            PlanExecutor::new(tools, mapping_store, progress, advisor, None, config),
            rx,
        )
    }

    #[tokio::test]
    async fn scenario_a_two_step_happy_path_completes() {
        let (executor, mut rx) = executor(false).await;
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let plan = Plan::new(
            "plan-1",
            vec![
                PlanStep::new_create("step-vpc", orc_constants::CREATE_VPC)
                    .with_tool_param("cidr_block", serde_json::json!("10.0.0.0/16")),
                PlanStep::new_create("step-subnet", orc_constants::CREATE_SUBNET)
                    .with_tool_param("vpc_id", serde_json::json!("{{step-vpc}}"))
                    .with_tool_param("availability_zone", serde_json::json!("us-east-1a")),
            ],
        );

        let execution = executor.execute(&plan, &ManagedStateSnapshot::default()).await;
        assert_eq!(execution.status, PlanExecutionStatus::Completed);
        assert_eq!(execution.steps.len(), 2);
    }

    #[tokio::test]
    async fn dry_run_never_invokes_real_tools() {
        let (executor, mut rx) = executor(true).await;
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let plan = Plan::new(
            "plan-2",
            vec![PlanStep::new_create("step-vpc", orc_constants::CREATE_VPC)],
        );

        let execution = executor.execute(&plan, &ManagedStateSnapshot::default()).await;
        assert_eq!(execution.status, PlanExecutionStatus::Completed);
        assert_eq!(execution.steps[0].output["dry_run"], true);
    }

    #[tokio::test]
    async fn unrecoverable_failure_halts_execution_with_error() {
        let (executor, mut rx) = executor(false).await;
        tokio::spawn(async move { while rx.recv().await.is_some() {} });

        let plan = Plan::new(
            "plan-3",
            vec![
                PlanStep::new_create("step-bad", "create-unknown-tool"),
                PlanStep::new_create("step-after", orc_constants::CREATE_VPC),
            ],
        );

        let execution = executor.execute(&plan, &ManagedStateSnapshot::default()).await;
        assert_eq!(execution.status, PlanExecutionStatus::Failed);
        assert_eq!(execution.steps.len(), 1);
        assert!(!execution.errors.is_empty());
    }
}
