use orc_orchestrator::{ExecutorConfig, PlanExecutor, RecoveryAdvisor, ResourceMappingStore};
use orc_runner::demo;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::PlanExecutionStatus;
use std::sync::Arc;

#[tokio::test]
async fn demo_plan_completes_end_to_end() {
    let tools = Arc::new(orc_tools::ToolRegistry::new());
    tools.ensure_capabilities().await;
    let mapping_store = ResourceMappingStore::new();
    let (progress, mut updates) = orc_orchestrator::channel(64);
    tokio::spawn(async move { while updates.recv().await.is_some() {} });

    let advisor: Arc<dyn RecoveryAdvisor> = Arc::new(demo::demo_advisor());
    let executor = PlanExecutor::new(
        tools,
        mapping_store,
        progress,
        advisor,
        None,
        ExecutorConfig::default(),
    );

    let execution = executor
        .execute(&demo::sample_plan(), &ManagedStateSnapshot::default())
        .await;

    assert_eq!(execution.status, PlanExecutionStatus::Completed);
    assert_eq!(execution.steps.len(), 4);
    let instance_step = execution.steps.last().unwrap();
    assert!(instance_step.output.contains_key("instanceId"));
}

#[tokio::test]
async fn demo_plan_dry_run_never_touches_the_tool_backend() {
    let tools = Arc::new(orc_tools::ToolRegistry::new());
    tools.ensure_capabilities().await;
    let mapping_store = ResourceMappingStore::new();
    let (progress, mut updates) = orc_orchestrator::channel(64);
    tokio::spawn(async move { while updates.recv().await.is_some() {} });

    let advisor: Arc<dyn RecoveryAdvisor> = Arc::new(demo::demo_advisor());
    let config = ExecutorConfig {
        dry_run: true,
        ..Default::default()
    };
    let executor = PlanExecutor::new(tools, mapping_store, progress, advisor, None, config);

    let execution = executor
        .execute(&demo::sample_plan(), &ManagedStateSnapshot::default())
        .await;

    assert_eq!(execution.status, PlanExecutionStatus::Completed);
    for step in &execution.steps {
        assert_eq!(step.output["dry_run"], true);
    }
}
