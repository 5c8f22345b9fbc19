//! VPC-level networking primitives: VPC, subnet, internet gateway, NAT
//! gateway, route table, and security group creation.

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
pub struct CreateVpcTool;

impl CreateVpcTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateVpcTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_VPC
    }

    fn description(&self) -> &str {
        "Create a VPC with the given CIDR block."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "cidr_block".to_string(),
            PropertySchema::new("string", "CIDR block, e.g. 10.0.0.0/16."),
        );
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Name tag for the VPC."),
        );
        InputSchema::new(properties, vec!["cidr_block".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let cidr_block = required_str(&args, "cidr_block")?;
        Ok(json!({
            "vpcId": short_id("vpc"),
            "cidrBlock": cidr_block,
            "state": "available",
        }))
    }
}

#[derive(Default)]
pub struct CreateSubnetTool;

impl CreateSubnetTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateSubnetTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_SUBNET
    }

    fn description(&self) -> &str {
        "Create a subnet inside a VPC."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "vpc_id".to_string(),
            PropertySchema::new("string", "Parent VPC id."),
        );
        properties.insert(
            "cidr_block".to_string(),
            PropertySchema::new("string", "CIDR block for the subnet."),
        );
        properties.insert(
            "availability_zone".to_string(),
            PropertySchema::new("string", "AZ to place the subnet in."),
        );
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Name tag for the subnet."),
        );
        InputSchema::new(
            properties,
            vec!["vpc_id".to_string(), "cidr_block".to_string()],
        )
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let vpc_id = required_str(&args, "vpc_id")?;
        Ok(json!({
            "subnetId": short_id("subnet"),
            "vpcId": vpc_id,
            "availabilityZone": args
                .get("availability_zone")
                .cloned()
                .unwrap_or(json!("us-east-1a")),
            "state": "available",
        }))
    }
}

#[derive(Default)]
pub struct CreateInternetGatewayTool;

impl CreateInternetGatewayTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateInternetGatewayTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_INTERNET_GATEWAY
    }

    fn description(&self) -> &str {
        "Create an internet gateway and attach it to a VPC."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "vpc_id".to_string(),
            PropertySchema::new("string", "VPC to attach to."),
        );
        InputSchema::new(properties, vec!["vpc_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let vpc_id = required_str(&args, "vpc_id")?;
        Ok(json!({
            "internetGatewayId": short_id("igw"),
            "vpcId": vpc_id,
            "state": "attached",
        }))
    }
}

/// NAT gateways don't become `available` synchronously — the Readiness
/// Waiter (C6) is expected to poll `describe-nat-gateways` afterward.
#[derive(Default)]
pub struct CreateNatGatewayTool;

impl CreateNatGatewayTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateNatGatewayTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_NAT_GATEWAY
    }

    fn description(&self) -> &str {
        "Create a NAT gateway in a subnet. Becomes available asynchronously."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "subnet_id".to_string(),
            PropertySchema::new("string", "Subnet to place the NAT gateway in."),
        );
        properties.insert(
            "allocation_id".to_string(),
            PropertySchema::new("string", "Elastic IP allocation id."),
        );
        InputSchema::new(properties, vec!["subnet_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let subnet_id = required_str(&args, "subnet_id")?;
        Ok(json!({
            "natGatewayId": short_id("nat"),
            "subnetId": subnet_id,
            "state": "pending",
        }))
    }
}

#[derive(Default)]
pub struct CreateRouteTableTool;

impl CreateRouteTableTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateRouteTableTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_ROUTE_TABLE
    }

    fn description(&self) -> &str {
        "Create a route table for a VPC."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "vpc_id".to_string(),
            PropertySchema::new("string", "Parent VPC id."),
        );
        InputSchema::new(properties, vec!["vpc_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let vpc_id = required_str(&args, "vpc_id")?;
        Ok(json!({
            "routeTableId": short_id("rtb"),
            "vpcId": vpc_id,
        }))
    }
}

#[derive(Default)]
pub struct CreateSecurityGroupTool;

impl CreateSecurityGroupTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for CreateSecurityGroupTool {
    fn name(&self) -> &str {
        orc_constants::CREATE_SECURITY_GROUP
    }

    fn description(&self) -> &str {
        "Create a security group scoped to a VPC."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "vpc_id".to_string(),
            PropertySchema::new("string", "Parent VPC id."),
        );
        properties.insert(
            "description".to_string(),
            PropertySchema::new("string", "Security group description."),
        );
        properties.insert(
            "name".to_string(),
            PropertySchema::new("string", "Name tag for the security group."),
        );
        InputSchema::new(properties, vec!["vpc_id".to_string()])
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let vpc_id = required_str(&args, "vpc_id")?;
        Ok(json!({
            "securityGroupId": short_id("sg"),
            "vpcId": vpc_id,
        }))
    }
}
