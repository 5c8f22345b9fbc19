//! Built-in in-memory demo backend: one module per AWS-infrastructure
//! tool family. None of these talk to a real cloud provider — they
//! synthesize plausible identifiers and responses so the orchestrator's
//! reference resolution, extraction, and readiness-wait logic can be
//! exercised end to end without network access.

pub mod auto_scaling;
pub mod database;
pub mod discovery;
pub mod ec2;
pub mod load_balancing;
pub mod network;
pub mod state;

use crate::tool::Tool;
use std::sync::Arc;
use uuid::Uuid;

/// Generate a short, AWS-styled resource id like `vpc-0a1b2c3d`.
pub(crate) fn short_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &hex[..8])
}

/// Every tool the demo backend provides, in registration order.
pub fn demo_backend_tools() -> Vec<Arc<dyn Tool>> {
    vec![
        Arc::new(state::SaveStateTool::new()),
        Arc::new(network::CreateVpcTool::new()),
        Arc::new(network::CreateSubnetTool::new()),
        Arc::new(network::CreateInternetGatewayTool::new()),
        Arc::new(network::CreateNatGatewayTool::new()),
        Arc::new(network::CreateRouteTableTool::new()),
        Arc::new(network::CreateSecurityGroupTool::new()),
        Arc::new(ec2::CreateEc2InstanceTool::new()),
        Arc::new(auto_scaling::CreateLaunchTemplateTool::new()),
        Arc::new(auto_scaling::CreateAutoScalingGroupTool::new()),
        Arc::new(database::CreateDbInstanceTool::new()),
        Arc::new(database::CreateDbSubnetGroupTool::new()),
        Arc::new(load_balancing::CreateLoadBalancerTool::new()),
        Arc::new(load_balancing::CreateTargetGroupTool::new()),
        Arc::new(discovery::DescribeNatGatewaysTool::new()),
        Arc::new(discovery::DescribeDbInstancesTool::new()),
        Arc::new(discovery::DiscoverThenCreateTool::new()),
    ]
}
