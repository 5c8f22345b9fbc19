//! Launch templates and auto scaling groups.

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
pub struct CreateLaunchTemplateTool;

impl CreateLaunchTemplateTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateLaunchTemplateTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_LAUNCH_TEMPLATE
    }

    fn description(&self) -> &str {
        "Create a launch template for use by an auto scaling group."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Launch template name."),
        );
        properties.insert(
            "ami_id".to_string(),
            PropertySchema::new("string", "AMI id to launch from."),
        );
        properties.insert(
            "instance_type".to_string(),
            PropertySchema::new("string", "Instance type, e.g. t3.micro."),
        );
        InputSchema::new(properties, vec!["ami_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let ami_id = required_str(&args, "ami_id")?;
        Ok(json!({
            "launchTemplateId": short_id("lt"),
            "amiId": ami_id,
            "latestVersionNumber": 1,
        }))
    }
}

#[derive(Default)]
pub struct CreateAutoScalingGroupTool;

impl CreateAutoScalingGroupTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateAutoScalingGroupTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_AUTO_SCALING_GROUP
    }

    fn description(&self) -> &str {
        "Create an auto scaling group from a launch template, attached to target groups."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Auto scaling group name."),
        );
        properties.insert(
            "launch_template_id".to_string(),
            PropertySchema::new("string", "Launch template to use."),
        );
        properties.insert(
            "min_size".to_string(),
            PropertySchema::new("integer", "Minimum group size."),
        );
        properties.insert(
            "max_size".to_string(),
            PropertySchema::new("integer", "Maximum group size."),
        );
        properties.insert(
            "target_group_arns".to_string(),
            PropertySchema::new("array", "Target groups to register instances with."),
        );
        properties.insert(
            "vpc_zone_identifier".to_string(),
            PropertySchema::new("string", "Comma-separated subnet ids."),
        );
        InputSchema::new(
            properties,
            vec!["name".to_string(), "launch_template_id".to_string()],
        )
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let name = required_str(&args, "name")?.to_string();
        let launch_template_id = required_str(&args, "launch_template_id")?;
        Ok(json!({
            "autoScalingGroupName": name,
            "autoScalingGroupArn": format!(
                "arn:aws:autoscaling:us-east-1:000000000000:autoScalingGroup:{}:autoScalingGroupName/{}",
                short_id("asg"), name
            ),
            "launchTemplateId": launch_template_id,
            "status": "creating",
        }))
    }
}
