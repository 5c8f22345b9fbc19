//! Application load balancers and their target groups.

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
pub struct CreateLoadBalancerTool;

impl CreateLoadBalancerTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateLoadBalancerTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_LOAD_BALANCER
    }

    fn description(&self) -> &str {
        "Create an application load balancer across a set of subnets."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Load balancer name."),
        );
        properties.insert(
            "subnets".to_string(),
            PropertySchema::new("array", "Subnets to place the load balancer in."),
        );
        properties.insert(
            "security_groups".to_string(),
            PropertySchema::new("array", "Security groups to attach."),
        );
        InputSchema::new(properties, vec!["name".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let name = required_str(&args, "name")?.to_string();
        Ok(json!({
            "loadBalancerArn": format!(
                "arn:aws:elasticloadbalancing:us-east-1:000000000000:loadbalancer/app/{}/{}",
                name, short_id("lb")
            ),
            "dnsName": format!("{}-{}.us-east-1.elb.amazonaws.com", name, short_id("dns")),
            "state": "provisioning",
        }))
    }
}

#[derive(Default)]
pub struct CreateTargetGroupTool;

impl CreateTargetGroupTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateTargetGroupTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_TARGET_GROUP
    }

    fn description(&self) -> &str {
        "Create a target group that a load balancer can route to."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Target group name."),
        );
        properties.insert(
            "vpc_id".to_string(),
            PropertySchema::new("string", "VPC the targets live in."),
        );
        properties.insert(
            "port".to_string(),
            PropertySchema::new("integer", "Port targets listen on."),
        );
        properties.insert(
            "protocol".to_string(),
            PropertySchema::new("string", "Protocol, e.g. HTTP."),
        );
        InputSchema::new(
            properties,
            vec!["name".to_string(), "vpc_id".to_string()],
        )
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let name = required_str(&args, "name")?.to_string();
        let vpc_id = required_str(&args, "vpc_id")?;
        Ok(json!({
            "targetGroupArn": format!(
                "arn:aws:elasticloadbalancing:us-east-1:000000000000:targetgroup/{}/{}",
                name, short_id("tg")
            ),
            "vpcId": vpc_id,
        }))
    }
}
