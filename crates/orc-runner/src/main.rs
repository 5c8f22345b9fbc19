use anyhow::{Context, Result};
use clap::Parser;
use orc_orchestrator::{ExecutorConfig, PlanExecutor, RecoveryAdvisor, ResourceMappingStore};
use orc_runner::{config::OrchestratorConfig, demo, model_client::HttpModelAdvisor};
use orc_types::resource::ManagedStateSnapshot;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Execute an orcaestra plan against the in-memory demo tool backend,
/// streaming progress to stdout and recovering from failing steps with
/// model-guided re-planning.
#[derive(Parser, Debug)]
#[command(
    name = "orc-runner",
    about = "Run an orcaestra plan end to end",
    long_about = "Load a plan file (or run the built-in demo plan), execute each step against the tool backend, and recover from failures by consulting a recovery advisor."
)]
struct Args {
    /// Path to a plan file (YAML or JSON). Omit to run the built-in demo plan.
    #[arg(help = "Path to the plan file to execute")]
    plan: Option<PathBuf>,

    /// Validate and trace the plan without invoking any real tool.
    #[arg(long, help = "Simulate every step instead of invoking the tool backend")]
    dry_run: bool,

    /// Run the built-in demo plan, ignoring `plan`.
    #[arg(long, help = "Run the built-in deterministic demo plan")]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    let config = OrchestratorConfig::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let plan = if args.demo || args.plan.is_none() {
        tracing::info!("no plan file given, running the built-in demo plan");
        demo::sample_plan()
    } else {
        let path = args.plan.as_ref().expect("checked above");
        orc_runner::load_plan(path).with_context(|| format!("loading plan from {path:?}"))?
    };

    let tools = Arc::new(orc_tools::ToolRegistry::new());
    tools.ensure_capabilities().await;
    let mapping_store = ResourceMappingStore::new();
    let (progress, mut updates) = orc_orchestrator::channel(64);

    let reporter = tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            match &update.error {
                Some(error) => {
                    tracing::warn!(step = ?update.step_id, kind = %update.update_type, %error, "{}", update.message)
                }
                None => {
                    tracing::info!(step = ?update.step_id, kind = %update.update_type, "{}", update.message)
                }
            }
        }
    });

    let advisor: Arc<dyn RecoveryAdvisor> = match &config.model_endpoint {
        Some(endpoint) => Arc::new(
            HttpModelAdvisor::new(endpoint.clone(), config.model_api_key.clone(), config.model_timeout)
                .context("building HTTP recovery advisor")?,
        ),
        None => {
            tracing::info!("no ORC_MODEL_ENDPOINT set, using the deterministic mock advisor");
            Arc::new(demo::demo_advisor())
        }
    };

    let executor_config = ExecutorConfig {
        dry_run: args.dry_run,
        max_recovery_attempts: config.max_recovery_attempts,
    };
    let executor = PlanExecutor::new(tools, mapping_store, progress, advisor, None, executor_config);

    let execution = executor.execute(&plan, &ManagedStateSnapshot::default()).await;
    drop(executor);
    let _ = reporter.await;

    println!("{}", serde_json::to_string_pretty(&execution)?);

    if execution.status != orc_types::PlanExecutionStatus::Completed {
        anyhow::bail!("plan execution did not complete successfully");
    }

    Ok(())
}
