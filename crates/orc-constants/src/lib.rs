//! Constants for the orcaestra workspace
//!
//! Centralized tool-name constants so crates that refer to backend tools
//! by name don't hardcode string literals independently.

/// Reserved tool name: persists execution state; accepts `{force: bool}`.
pub const SAVE_STATE: &str = "save-state";

/// EC2 instance creation tool name.
pub const CREATE_EC2_INSTANCE: &str = "create-ec2-instance";

/// VPC creation tool name.
pub const CREATE_VPC: &str = "create-vpc";

/// Subnet creation tool name.
pub const CREATE_SUBNET: &str = "create-subnet";

/// Internet gateway creation tool name.
pub const CREATE_INTERNET_GATEWAY: &str = "create-internet-gateway";

/// NAT gateway creation tool name.
pub const CREATE_NAT_GATEWAY: &str = "create-nat-gateway";

/// Route table creation tool name.
pub const CREATE_ROUTE_TABLE: &str = "create-route-table";

/// Security group creation tool name.
pub const CREATE_SECURITY_GROUP: &str = "create-security-group";

/// RDS instance creation tool name.
pub const CREATE_DB_INSTANCE: &str = "create-db-instance";

/// DB subnet group creation tool name.
pub const CREATE_DB_SUBNET_GROUP: &str = "create-db-subnet-group";

/// Load balancer creation tool name.
pub const CREATE_LOAD_BALANCER: &str = "create-load-balancer";

/// Target group creation tool name.
pub const CREATE_TARGET_GROUP: &str = "create-target-group";

/// Launch template creation tool name.
pub const CREATE_LAUNCH_TEMPLATE: &str = "create-launch-template";

/// Auto scaling group creation tool name.
pub const CREATE_AUTO_SCALING_GROUP: &str = "create-auto-scaling-group";

/// NAT gateway describe tool name, used for readiness polling.
pub const DESCRIBE_NAT_GATEWAYS: &str = "describe-nat-gateways";

/// DB instance describe tool name, used for readiness polling.
pub const DESCRIBE_DB_INSTANCES: &str = "describe-db-instances";

/// Alternative tool the recovery engine may swap in when a `create`
/// step fails on a bad network parameter: re-discovers topology first.
pub const DISCOVER_THEN_CREATE: &str = "discover-then-create";

/// All tool names the workspace's in-memory demo backend understands.
pub fn all_tool_names() -> Vec<&'static str> {
    vec![
        SAVE_STATE,
        CREATE_EC2_INSTANCE,
        CREATE_VPC,
        CREATE_SUBNET,
        CREATE_INTERNET_GATEWAY,
        CREATE_NAT_GATEWAY,
        CREATE_ROUTE_TABLE,
        CREATE_SECURITY_GROUP,
        CREATE_DB_INSTANCE,
        CREATE_DB_SUBNET_GROUP,
        CREATE_LOAD_BALANCER,
        CREATE_TARGET_GROUP,
        CREATE_LAUNCH_TEMPLATE,
        CREATE_AUTO_SCALING_GROUP,
        DESCRIBE_NAT_GATEWAYS,
        DESCRIBE_DB_INSTANCES,
        DISCOVER_THEN_CREATE,
    ]
}

/// Check if a tool name is one of this workspace's known constants.
pub fn is_known_tool_name(tool_name: &str) -> bool {
    all_tool_names().contains(&tool_name)
}
