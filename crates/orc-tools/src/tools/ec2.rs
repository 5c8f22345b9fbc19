//! EC2 instance provisioning.

use super::short_id;
use crate::schema::{InputSchema, PropertySchema};
use crate::tool::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

#[derive(Default)]
pub struct CreateEc2InstanceTool;

impl CreateEc2InstanceTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateEc2InstanceTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_EC2_INSTANCE
    }

    fn description(&self) -> &str {
        "Launch a single EC2 instance into a subnet."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "ami_id".to_string(),
            PropertySchema::new("string", "AMI id to launch from."),
        );
        properties.insert(
            "instance_type".to_string(),
            PropertySchema::new("string", "Instance type, e.g. t3.micro."),
        );
        properties.insert(
            "subnet_id".to_string(),
            PropertySchema::new("string", "Subnet to launch into."),
        );
        properties.insert(
            "security_group_id".to_string(),
            PropertySchema::new("string", "Security group to attach."),
        );
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Name tag for the instance."),
        );
        InputSchema::new(
            properties,
            vec!["ami_id".to_string(), "subnet_id".to_string()],
        )
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let ami_id = args
            .get("ami_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::MissingParam("ami_id".to_string()))?;
        let subnet_id = args
            .get("subnet_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::MissingParam("subnet_id".to_string()))?;
        let instance_id = short_id("i");
        Ok(json!({
            "instanceId": instance_id,
            "state": "pending",
            "amiId": ami_id,
            "subnetId": subnet_id,
            "instanceType": args.get("instance_type").cloned().unwrap_or(json!("t3.micro")),
        }))
    }
}
