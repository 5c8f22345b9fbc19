//! Step Executor (C7): executes a single plan step — dispatches on
//! action kind, resolves references, invokes C1, extracts ids via C4,
//! stores mappings via C2, waits via C6, persists state (spec §4.6).

use crate::mapping_store::ResourceMappingStore;
use crate::progress::ProgressSink;
use orc_core::CancellationToken;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::{ActionKind, ExecutionStep, OrchestratorError, PlanStep, UpdateType};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Per-`(tool_name, param)` default values, consulted when a required
/// parameter is missing after reference resolution. Mirrors a handful
/// of sane AWS defaults; sibling params already present on the step are
/// preferred and never overridden.
fn default_value(tool_name: &str, param: &str, siblings: &HashMap<String, serde_json::Value>) -> Option<serde_json::Value> {
    match (tool_name, param) {
        (t, "instance_type") if t == orc_constants::CREATE_EC2_INSTANCE => {
            Some(serde_json::json!("t3.micro"))
        }
        (t, "cidr_block") if t == orc_constants::CREATE_VPC => Some(serde_json::json!("10.0.0.0/16")),
        (t, "protocol") if t == orc_constants::CREATE_TARGET_GROUP => Some(serde_json::json!("HTTP")),
        (t, "port") if t == orc_constants::CREATE_TARGET_GROUP => Some(serde_json::json!(80)),
        (t, "min_size") if t == orc_constants::CREATE_AUTO_SCALING_GROUP => Some(serde_json::json!(1)),
        (t, "max_size") if t == orc_constants::CREATE_AUTO_SCALING_GROUP => {
            siblings.get("min_size").cloned().or(Some(serde_json::json!(2)))
        }
        _ => None,
    }
}

/// Resolve every `tool_params` entry's reference templates, fill in
/// missing required parameters from the default-value table, and
/// validate that all required keys are present and non-empty.
async fn build_and_validate_args(
    step: &PlanStep,
    mapping_store: &ResourceMappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
    required: &[String],
) -> Result<serde_json::Value, OrchestratorError> {
    let mut resolved = HashMap::new();

    for (key, value) in &step.tool_params {
        let resolved_value = mapping_store
            .with_sync_view(|view| orc_core::resolve_value(value, view, snapshot, test_mode))
            .await?;
        resolved.insert(key.clone(), resolved_value);
    }

    for key in required {
        if !resolved.contains_key(key) {
            if let Some(default) = default_value(&step.tool_name, key, &resolved) {
                resolved.insert(key.clone(), default);
            }
        }
    }

    for key in required {
        let present = resolved
            .get(key)
            .map(|v| !is_empty(v))
            .unwrap_or(false);
        if !present {
            return Err(OrchestratorError::SchemaInvalid {
                tool_name: step.tool_name.clone(),
                detail: format!("missing or empty required parameter '{key}'"),
            });
        }
    }

    Ok(serde_json::Value::Object(resolved.into_iter().collect()))
}

fn is_empty(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::String(s) => s.is_empty(),
        serde_json::Value::Array(a) => a.is_empty(),
        _ => false,
    }
}

/// Execute `step` to completion (success or failure), mutating the
/// mapping store and emitting progress along the way. The caller (the
/// Recovery Wrapper or Plan Executor) decides what to do with a failure.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(step, tools, mapping_store, progress, snapshot, cancellation), fields(step_id = %step.id, action = ?step.action))]
pub async fn execute_step(
    step: &mut PlanStep,
    execution_id: &str,
    tools: &Arc<orc_tools::ToolRegistry>,
    mapping_store: &ResourceMappingStore,
    progress: &ProgressSink,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
    cancellation: Option<&CancellationToken>,
) -> Result<ExecutionStep, OrchestratorError> {
    if cancellation.is_some_and(|c| c.is_cancelled()) {
        return Err(OrchestratorError::Cancelled);
    }

    progress
        .emit_kind(
            execution_id,
            UpdateType::StepProgress,
            Some(&step.id),
            step.description.clone(),
        )
        .await;

    let record = ExecutionStep::start(step.id.clone(), step.name.clone());

    match step.action {
        ActionKind::Create => {
            execute_create(step, &record, tools, mapping_store, snapshot, test_mode, cancellation).await
        }
        ActionKind::ApiValueRetrieval => {
            execute_value_retrieval(step, record, tools, mapping_store, snapshot).await
        }
        ActionKind::Update | ActionKind::Delete | ActionKind::Validate => {
            Ok(execute_simulated_noop(step, record))
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn execute_create(
    step: &mut PlanStep,
    record: &ExecutionStep,
    tools: &Arc<orc_tools::ToolRegistry>,
    mapping_store: &ResourceMappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
    cancellation: Option<&CancellationToken>,
) -> Result<ExecutionStep, OrchestratorError> {
    let record = record.clone();
    let catalog = tools.list_tools().await;
    let tool_info = catalog.get(&step.tool_name).ok_or_else(|| OrchestratorError::SchemaInvalid {
        tool_name: step.tool_name.clone(),
        detail: "tool not found in catalog".to_string(),
    })?;
    let required = tool_info.parameters.required.clone();

    let args = build_and_validate_args(step, mapping_store, snapshot, test_mode, &required).await?;

    let response = tools
        .invoke(&step.tool_name, args)
        .await
        .ok_or_else(|| OrchestratorError::SchemaInvalid {
            tool_name: step.tool_name.clone(),
            detail: "tool not found in catalog".to_string(),
        })?
        .map_err(|e| OrchestratorError::ToolCall {
            tool_name: step.tool_name.clone(),
            source: e.into(),
        })?;

    let resource_id = orc_core::extract_resource_id(&step.tool_name, &response)?;
    step.resource_id = Some(resource_id.clone());
    mapping_store.insert_scalar(&step.id, resource_id.clone()).await;

    orc_core::readiness::wait_for_ready(&step.tool_name, &resource_id, tools, cancellation).await?;

    let mut output = response_to_output(&response);
    output.insert("mcp_tool".to_string(), serde_json::json!(step.tool_name));
    output.insert("resourceId".to_string(), serde_json::json!(resource_id));

    Ok(record.complete(output))
}

async fn execute_value_retrieval(
    step: &mut PlanStep,
    record: ExecutionStep,
    tools: &Arc<orc_tools::ToolRegistry>,
    mapping_store: &ResourceMappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
) -> Result<ExecutionStep, OrchestratorError> {
    let handler = match &step.params.value_type {
        Some(value_type) => value_type.clone(),
        None => orc_core::value_retrieval::infer_handler(&step.name, &step.description)
            .ok_or_else(|| OrchestratorError::ValueRetrievalInference(step.id.clone()))?
            .to_string(),
    };

    let result = orc_core::value_retrieval::retrieve(&handler, &step.params, tools, snapshot).await?;
    mapping_store.insert_retrieval_result(&step.id, &result).await;

    Ok(record.complete(response_to_output(&result)))
}

fn execute_simulated_noop(step: &PlanStep, record: ExecutionStep) -> ExecutionStep {
    let output = serde_json::json!({
        "status": "success",
        "simulated": true,
        "action": step.action.to_string(),
    });
    record.complete(response_to_output(&output))
}

fn response_to_output(value: &serde_json::Value) -> HashMap<String, serde_json::Value> {
    match value.as_object() {
        Some(map) => map.clone().into_iter().collect(),
        None => {
            let mut map = HashMap::new();
            map.insert("value".to_string(), value.clone());
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::channel;
    use orc_types::plan::ValueRetrievalParams;

    async fn setup() -> (Arc<orc_tools::ToolRegistry>, ResourceMappingStore, ProgressSink) {
        let tools = Arc::new(orc_tools::ToolRegistry::new());
        tools.ensure_capabilities().await;
        let store = ResourceMappingStore::new();
        let (sink, mut rx) = channel(8);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        (tools, store, sink)
    }

    #[tokio::test]
    async fn create_step_extracts_and_stores_resource_id() {
        let (tools, store, progress) = setup().await;
        let mut step = PlanStep::new_create("step-vpc", orc_constants::CREATE_VPC)
            .with_tool_param("cidr_block", serde_json::json!("10.0.0.0/16"));

        let record = execute_step(&mut step, "exec-1", &tools, &store, &progress, None, true, None)
            .await
            .unwrap();

        assert_eq!(record.status, orc_types::StepStatus::Completed);
        assert!(store.get("step-vpc").await.is_some());
        assert!(step.resource_id.is_some());
    }

    #[tokio::test]
    async fn create_step_fills_missing_required_param_from_default_table() {
        let (tools, store, progress) = setup().await;
        let mut step = PlanStep::new_create("step-vpc", orc_constants::CREATE_VPC);

        let record = execute_step(&mut step, "exec-1", &tools, &store, &progress, None, true, None)
            .await
            .unwrap();
        assert_eq!(record.status, orc_types::StepStatus::Completed);
    }

    #[tokio::test]
    async fn create_step_fails_loudly_on_unresolved_reference() {
        let (tools, store, progress) = setup().await;
        let mut step = PlanStep::new_create("step-subnet", orc_constants::CREATE_SUBNET)
            .with_tool_param("vpc_id", serde_json::json!("{{missing-step}}"))
            .with_tool_param("availability_zone", serde_json::json!("us-east-1a"));

        let err = execute_step(&mut step, "exec-1", &tools, &store, &progress, None, true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::ReferenceUnresolved(_)));
    }

    #[tokio::test]
    async fn value_retrieval_step_populates_mapping_store() {
        let (tools, store, progress) = setup().await;
        let mut step = PlanStep::new_value_retrieval("step-ami", "latest_ami");
        step.params = ValueRetrievalParams {
            value_type: Some("latest_ami".to_string()),
            filters: HashMap::new(),
        };

        let record = execute_step(&mut step, "exec-1", &tools, &store, &progress, None, true, None)
            .await
            .unwrap();
        assert_eq!(record.status, orc_types::StepStatus::Completed);
        assert!(store.get("step-ami").await.is_some());
    }

    #[tokio::test]
    async fn update_step_is_a_simulated_noop() {
        let (tools, store, progress) = setup().await;
        let mut step = PlanStep::new_create("step-update", "create-vpc");
        step.action = ActionKind::Update;

        let record = execute_step(&mut step, "exec-1", &tools, &store, &progress, None, true, None)
            .await
            .unwrap();
        assert_eq!(record.status, orc_types::StepStatus::Completed);
        assert_eq!(record.output["simulated"], true);
    }
}
