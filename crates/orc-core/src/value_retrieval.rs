//! Value-Retrieval Registry (C5): named handlers that query the backend
//! or managed state for "ambient" values an `api_value_retrieval` step
//! asks for (spec §4.4).

use orc_tools::ToolRegistry;
use orc_types::plan::ValueRetrievalParams;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::OrchestratorError;
use serde_json::json;
use std::sync::Arc;
use tracing::instrument;

/// The fixed set of handler names the registry understands.
pub const KNOWN_HANDLERS: &[&str] = &[
    "latest_ami",
    "default_vpc",
    "default_subnet",
    "subnets_in_vpc",
    "available_azs",
    "select_subnets_for_alb",
    "vpc_id",
    "subnet_id",
    "security_group_id",
    "instance_id",
    "existing_resource",
    "load_balancer_arn",
    "target_group_arn",
    "launch_template_id",
    "auto_scaling_group_arn",
    "auto_scaling_group_name",
    "db_subnet_group_name",
    "rds_endpoint",
    "security_group_id_ref",
];

/// Infer a handler name from a step's name/description when `value_type`
/// was left unset. Scans for the handler's own name or a small set of
/// synonyms as a substring; inference failure is the caller's problem
/// to report as a hard error (spec §4.4).
pub fn infer_handler(step_name: &str, step_description: &str) -> Option<&'static str> {
    let haystack = format!("{step_name} {step_description}").to_lowercase();

    let synonyms: &[(&str, &[&str])] = &[
        ("latest_ami", &["latest ami", "latest image", "ami lookup"]),
        ("default_vpc", &["default vpc"]),
        ("default_subnet", &["default subnet"]),
        ("subnets_in_vpc", &["subnets in", "list subnets"]),
        ("available_azs", &["availability zone", "available az"]),
        (
            "select_subnets_for_alb",
            &["subnets for alb", "subnets for load balancer"],
        ),
        ("vpc_id", &["vpc id", "lookup vpc"]),
        ("subnet_id", &["subnet id", "lookup subnet"]),
        ("security_group_id", &["security group id"]),
        ("instance_id", &["instance id", "lookup instance"]),
        ("existing_resource", &["existing resource", "find existing"]),
        ("load_balancer_arn", &["load balancer arn"]),
        ("target_group_arn", &["target group arn"]),
        ("launch_template_id", &["launch template id"]),
        ("auto_scaling_group_arn", &["auto scaling group arn"]),
        ("auto_scaling_group_name", &["auto scaling group name"]),
        ("db_subnet_group_name", &["db subnet group name"]),
        ("rds_endpoint", &["rds endpoint", "database endpoint"]),
        ("security_group_id_ref", &["security group reference"]),
    ];

    for (handler, phrases) in synonyms {
        if phrases.iter().any(|phrase| haystack.contains(phrase)) {
            return Some(handler);
        }
    }

    for handler in KNOWN_HANDLERS {
        if haystack.contains(&handler.replace('_', " ")) {
            return Some(handler);
        }
    }

    None
}

/// Execute a value-retrieval handler. Every handler returns a map with
/// at least a `value` key; some add companion keys (`all_zones`,
/// `vpc_id`, …). `tools` lets a handler consult the demo backend's
/// `describe-*` tools; `snapshot` lets it consult managed state for
/// "existing resource by name" style lookups.
#[instrument(skip(tools, snapshot, params), fields(handler))]
pub async fn retrieve(
    handler: &str,
    params: &ValueRetrievalParams,
    tools: &Arc<ToolRegistry>,
    snapshot: Option<&ManagedStateSnapshot>,
) -> Result<serde_json::Value, OrchestratorError> {
    let filter = |key: &str| params.filters.get(key).and_then(|v| v.as_str());

    match handler {
        "latest_ami" => {
            let os_type = filter("os_type").unwrap_or("amazon-linux-2");
            Ok(json!({ "value": format!("ami-{os_type}-latest") }))
        }
        "default_vpc" => Ok(json!({ "value": "vpc-default" })),
        "default_subnet" => Ok(json!({ "value": "subnet-default", "vpc_id": "vpc-default" })),
        "subnets_in_vpc" => {
            let vpc_id = filter("vpc_id").unwrap_or("vpc-default");
            Ok(json!({
                "value": [format!("{vpc_id}-subnet-a"), format!("{vpc_id}-subnet-b")],
            }))
        }
        "available_azs" => Ok(json!({
            "value": "us-east-1a",
            "all_zones": ["us-east-1a", "us-east-1b", "us-east-1c"],
        })),
        "select_subnets_for_alb" => {
            let vpc_id = filter("vpc_id").unwrap_or("vpc-default");
            Ok(json!({
                "value": [format!("{vpc_id}-subnet-a"), format!("{vpc_id}-subnet-b")],
            }))
        }
        "existing_resource" => {
            let name = filter("name").ok_or_else(|| {
                OrchestratorError::ValueRetrievalInference("existing_resource needs a name filter".to_string())
            })?;
            let snapshot = snapshot.ok_or_else(|| {
                OrchestratorError::ValueRetrievalInference("no managed state to search".to_string())
            })?;
            let found = snapshot
                .resources
                .iter()
                .find(|r| r.name == name)
                .ok_or_else(|| {
                    OrchestratorError::ValueRetrievalInference(format!(
                        "no existing resource named '{name}'"
                    ))
                })?;
            Ok(json!({ "value": found.id }))
        }
        "vpc_id" | "subnet_id" | "security_group_id" | "instance_id" | "load_balancer_arn"
        | "target_group_arn" | "launch_template_id" | "auto_scaling_group_arn"
        | "auto_scaling_group_name" | "db_subnet_group_name" | "security_group_id_ref" => {
            let key = handler.trim_end_matches("_ref");
            let value = filter(key)
                .or_else(|| filter("value"))
                .ok_or_else(|| {
                    OrchestratorError::ValueRetrievalInference(format!(
                        "{handler} needs a '{key}' filter"
                    ))
                })?;
            Ok(json!({ "value": value }))
        }
        "rds_endpoint" => {
            let db_instance_identifier = filter("db_instance_identifier").ok_or_else(|| {
                OrchestratorError::ValueRetrievalInference(
                    "rds_endpoint needs a db_instance_identifier filter".to_string(),
                )
            })?;
            let response = tools
                .invoke(
                    orc_constants::DESCRIBE_DB_INSTANCES,
                    json!({ "db_instance_identifier": db_instance_identifier }),
                )
                .await
                .ok_or_else(|| {
                    OrchestratorError::ValueRetrievalInference(
                        "describe-db-instances tool not registered".to_string(),
                    )
                })?
                .map_err(|e| OrchestratorError::ValueRetrievalInference(e.to_string()))?;
            let endpoint = response["dbInstances"][0]["endpoint"].clone();
            Ok(json!({ "value": endpoint["address"], "port": endpoint["port"] }))
        }
        other => Err(OrchestratorError::ValueRetrievalInference(format!(
            "unknown value-retrieval handler '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_handler_from_step_description_synonym() {
        let handler = infer_handler("ami-lookup", "Find the latest AMI for the instance");
        assert_eq!(handler, Some("latest_ami"));
    }

    #[test]
    fn infers_handler_from_literal_handler_name() {
        let handler = infer_handler("default-vpc-step", "default vpc");
        assert_eq!(handler, Some("default_vpc"));
    }

    #[test]
    fn inference_failure_returns_none() {
        assert_eq!(infer_handler("mystery-step", "do something unrelated"), None);
    }

    #[tokio::test]
    async fn latest_ami_handler_returns_a_value_key() {
        let registry = Arc::new(ToolRegistry::new());
        registry.ensure_capabilities().await;
        let params = ValueRetrievalParams::default();
        let result = retrieve("latest_ami", &params, &registry, None).await.unwrap();
        assert!(result["value"].as_str().unwrap().starts_with("ami-"));
    }

    #[tokio::test]
    async fn existing_resource_handler_requires_a_name_filter() {
        let registry = Arc::new(ToolRegistry::new());
        registry.ensure_capabilities().await;
        let params = ValueRetrievalParams::default();
        let err = retrieve("existing_resource", &params, &registry, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::ValueRetrievalInference(_)));
    }
}
