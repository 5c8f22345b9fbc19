//! Readiness Waiter (C6): polls asynchronous resources for a "ready"
//! status, bounded by a per-tool deadline (spec §4.5).

use crate::cancellation::CancellationToken;
use orc_tools::ToolRegistry;
use orc_types::OrchestratorError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, warn};

/// One row of the readiness policy table: which describe tool to poll,
/// which field on the first element of its response array carries
/// status, and what value means "ready".
#[derive(Debug, Clone)]
struct ReadinessPolicy {
    describe_tool: &'static str,
    describe_arg_name: &'static str,
    status_field: &'static str,
    ready_value: &'static str,
    max_wait: Duration,
    poll_interval: Duration,
}

/// Look up the readiness policy for a creation tool's name. Tools with
/// no entry require no waiting at all.
fn policy_for(tool_name: &str) -> Option<ReadinessPolicy> {
    match tool_name {
        t if t == orc_constants::CREATE_NAT_GATEWAY => Some(ReadinessPolicy {
            describe_tool: orc_constants::DESCRIBE_NAT_GATEWAYS,
            describe_arg_name: "nat_gateway_id",
            status_field: "state",
            ready_value: "available",
            max_wait: Duration::from_secs(15 * 60),
            poll_interval: Duration::from_secs(5),
        }),
        t if t == orc_constants::CREATE_DB_INSTANCE => Some(ReadinessPolicy {
            describe_tool: orc_constants::DESCRIBE_DB_INSTANCES,
            describe_arg_name: "db_instance_identifier",
            status_field: "dbInstanceStatus",
            ready_value: "available",
            max_wait: Duration::from_secs(15 * 60),
            poll_interval: Duration::from_secs(10),
        }),
        _ => None,
    }
}

/// The JSON key the describe tool nests its result array under, keyed
/// by describe tool name — `{"natGateways": [...]}`, `{"dbInstances": [...]}`.
fn response_array_key(describe_tool: &str) -> &'static str {
    if describe_tool == orc_constants::DESCRIBE_NAT_GATEWAYS {
        "natGateways"
    } else {
        "dbInstances"
    }
}

/// Wait for `resource_id` (produced by `creation_tool_name`) to reach
/// readiness. Tools with no readiness policy return immediately. A
/// describe tool that isn't registered in `tools` triggers a fixed
/// fallback sleep and an optimistic success, per spec §4.5. Exceeding
/// `max_wait` is a hard failure.
#[instrument(skip(tools, cancellation), fields(creation_tool_name, resource_id))]
pub async fn wait_for_ready(
    creation_tool_name: &str,
    resource_id: &str,
    tools: &Arc<ToolRegistry>,
    cancellation: Option<&CancellationToken>,
) -> Result<(), OrchestratorError> {
    let Some(policy) = policy_for(creation_tool_name) else {
        return Ok(());
    };

    if !tools.contains(policy.describe_tool).await {
        warn!(
            describe_tool = policy.describe_tool,
            "describe tool unavailable, falling back to optimistic sleep"
        );
        tokio::time::sleep(Duration::from_secs(2)).await;
        return Ok(());
    }

    let deadline = tokio::time::Instant::now() + policy.max_wait;
    let array_key = response_array_key(policy.describe_tool);

    loop {
        if cancellation.is_some_and(|c| c.is_cancelled()) {
            return Err(OrchestratorError::Cancelled);
        }

        let args = serde_json::json!({ policy.describe_arg_name: resource_id });
        let response = tools
            .invoke(policy.describe_tool, args)
            .await
            .expect("checked contains() above")
            .map_err(|e| OrchestratorError::ToolCall {
                tool_name: policy.describe_tool.to_string(),
                source: e.into(),
            })?;

        let status = response[array_key][0][policy.status_field]
            .as_str()
            .unwrap_or_default();

        if status == policy.ready_value {
            return Ok(());
        }

        if tokio::time::Instant::now() >= deadline {
            return Err(OrchestratorError::ReadinessTimeout {
                tool_name: creation_tool_name.to_string(),
                waited_ms: policy.max_wait.as_millis() as u64,
            });
        }

        tokio::time::sleep(policy.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tools_with_no_policy_return_immediately() {
        let tools = Arc::new(ToolRegistry::new());
        tools.ensure_capabilities().await;
        let result = wait_for_ready(orc_constants::CREATE_VPC, "vpc-1", &tools, None).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn nat_gateway_becomes_ready_after_polling() {
        let tools = Arc::new(ToolRegistry::new());
        tools.ensure_capabilities().await;
        let result = wait_for_ready(orc_constants::CREATE_NAT_GATEWAY, "nat-1", &tools, None).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn cancellation_stops_the_poll_loop() {
        let tools = Arc::new(ToolRegistry::new());
        tools.ensure_capabilities().await;
        let token = CancellationToken::new();
        token.cancel();
        let result = wait_for_ready(orc_constants::CREATE_NAT_GATEWAY, "nat-1", &tools, Some(&token)).await;
        assert!(matches!(result, Err(OrchestratorError::Cancelled)));
    }
}
