//! RDS database instances and their subnet groups.

use super::short_id;
use crate::schema::{InputSchema, PropertySchema};
use crate::tool::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

fn required_str<'a>(args: &'a serde_json::Value, key: &str) -> Result<&'a str, ToolError> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| ToolError::MissingParam(key.to_string()))
}

#[derive(Default)]
pub struct CreateDbSubnetGroupTool;

impl CreateDbSubnetGroupTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateDbSubnetGroupTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_DB_SUBNET_GROUP
    }

    fn description(&self) -> &str {
        "Create a DB subnet group spanning a set of subnets."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "DB subnet group name."),
        );
        properties.insert(
            "subnet_ids".to_string(),
            PropertySchema::new("array", "Subnets to span."),
        );
        InputSchema::new(properties, vec!["name".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let name = required_str(&args, "name")?;
        Ok(json!({
            "dbSubnetGroupName": name,
            "subnetIds": args.get("subnet_ids").cloned().unwrap_or(json!([])),
        }))
    }
}

/// DB instances don't become `available` synchronously — the Readiness
/// Waiter (C6) is expected to poll `describe-db-instances` afterward.
#[derive(Default)]
pub struct CreateDbInstanceTool;

impl CreateDbInstanceTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateDbInstanceTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_DB_INSTANCE
    }

    fn description(&self) -> &str {
        "Create an RDS database instance. Becomes available asynchronously."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "db_instance_identifier".to_string(),
            PropertySchema::new("string", "Unique identifier for the DB instance."),
        );
        properties.insert(
            "engine".to_string(),
            PropertySchema::new("string", "Database engine, e.g. postgres."),
        );
        properties.insert(
            "db_instance_class".to_string(),
            PropertySchema::new("string", "Instance class, e.g. db.t3.micro."),
        );
        properties.insert(
            "allocated_storage".to_string(),
            PropertySchema::new("integer", "Storage size in GiB."),
        );
        properties.insert(
            "db_subnet_group_name".to_string(),
            PropertySchema::new("string", "DB subnet group to place the instance in."),
        );
        InputSchema::new(
            properties,
            vec!["db_instance_identifier".to_string(), "engine".to_string()],
        )
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let db_instance_identifier = required_str(&args, "db_instance_identifier")?.to_string();
        Ok(json!({
            "dbInstanceId": db_instance_identifier,
            "dbInstanceStatus": "creating",
            "engine": args.get("engine").cloned().unwrap_or(json!("postgres")),
            "endpoint": {
                "address": format!("{}.{}.us-east-1.rds.amazonaws.com", db_instance_identifier, short_id("db")),
                "port": 5432,
            },
        }))
    }
}
