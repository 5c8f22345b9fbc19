//! Readiness-polling describe tools and the recovery-only rediscovery
//! tool (spec §4.4 Readiness Waiter, §6 recovery option catalog).

use super::short_id;
use crate::schema::{InputSchema, PropertySchema};
use crate::tool::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use tokio::sync::Mutex;

fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingParam(key.to_string()))
}

/// Reports `pending` on the first poll for a given id, `available` from
/// the second poll onward — enough to exercise the Readiness Waiter's
/// retry loop without an unbounded wait in tests.
pub struct DescribeNatGatewaysTool {
    polls: Mutex<HashMap<String, u32>>,
}

impl Default for DescribeNatGatewaysTool {
    fn default() -> Self {
        Self::new()
    }
}

impl DescribeNatGatewaysTool {
    pub fn new() -> Self {
        Self {
            polls: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Tool for DescribeNatGatewaysTool {
    fn name(&self) -> &str {
        orc_constants::DESCRIBE_NAT_GATEWAYS
    }

    fn description(&self) -> &str {
        "Describe a NAT gateway's current state, for readiness polling."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "nat_gateway_id".to_string(),
            PropertySchema::new("string", "NAT gateway id to describe."),
        );
        InputSchema::new(properties, vec!["nat_gateway_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let nat_gateway_id = required_str(&args, "nat_gateway_id")?.to_string();
        let mut polls = self.polls.lock().await;
        let count = polls.entry(nat_gateway_id.clone()).or_insert(0);
        *count += 1;
        let state = if *count >= 2 { "available" } else { "pending" };
        Ok(json!({
            "natGateways": [{
                "natGatewayId": nat_gateway_id,
                "state": state,
            }]
        }))
    }
}

/// Same polling shape as `DescribeNatGatewaysTool`, scoped to RDS.
pub struct DescribeDbInstancesTool {
    polls: Mutex<HashMap<String, u32>>,
}

impl Default for DescribeDbInstancesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl DescribeDbInstancesTool {
    pub fn new() -> Self {
        Self {
            polls: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl Tool for DescribeDbInstancesTool {
    fn name(&self) -> &str {
        orc_constants::DESCRIBE_DB_INSTANCES
    }

    fn description(&self) -> &str {
        "Describe a DB instance's current status, for readiness polling."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "db_instance_identifier".to_string(),
            PropertySchema::new("string", "DB instance identifier to describe."),
        );
        InputSchema::new(properties, vec!["db_instance_identifier".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let db_instance_identifier = required_str(&args, "db_instance_identifier")?.to_string();
        let mut polls = self.polls.lock().await;
        let count = polls.entry(db_instance_identifier.clone()).or_insert(0);
        *count += 1;
        let status = if *count >= 2 { "available" } else { "creating" };
        Ok(json!({
            "dbInstances": [{
                "dbInstanceId": db_instance_identifier,
                "dbInstanceStatus": status,
                "endpoint": {
                    "address": format!("{}.{}.us-east-1.rds.amazonaws.com", db_instance_identifier, short_id("db")),
                    "port": 5432,
                },
            }]
        }))
    }
}

/// Recovery-only alternative to a plain `create-*` call: re-discovers
/// network topology (a default VPC/subnet/AZ) before creating, for use
/// when a `create` step fails on a bad network parameter.
#[derive(Default)]
pub struct DiscoverThenCreateTool;

impl DiscoverThenCreateTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for DiscoverThenCreateTool {
    fn name(&self) -> &str {
        orc_constants::DISCOVER_THEN_CREATE
    }

    fn description(&self) -> &str {
        "Re-discover default network topology, then create the resource \
         the original tool call was attempting."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "original_tool_name".to_string(),
            PropertySchema::new("string", "The tool name the failed step had called."),
        );
        properties.insert(
            "resource_type".to_string(),
            PropertySchema::new("string", "Short resource-type hint, e.g. subnet, vpc."),
        );
        InputSchema::new(properties, vec!["resource_type".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let resource_type = required_str(&args, "resource_type")?;
        let discovered_vpc_id = short_id("vpc");
        let discovered_subnet_id = short_id("subnet");
        let generated_id = short_id(resource_type);
        let mut response = json!({
            "discovered": {
                "vpcId": discovered_vpc_id,
                "subnetId": discovered_subnet_id,
                "availabilityZone": "us-east-1b",
            },
            "resourceType": resource_type,
            "resourceId": generated_id,
            "state": "available",
        });
        if resource_type.contains("instance") {
            response["instanceId"] = json!(generated_id);
        }
        Ok(response)
    }
}
