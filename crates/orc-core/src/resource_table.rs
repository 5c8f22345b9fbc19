//! Per-resource-type field tables shared by the Dependency Resolver (C3)
//! and the Identifier Extractor (C4): which response field names a
//! given tool name or resource type is known by, in priority order.

use orc_constants as c;

/// Derive a resource-type tag for a known tool name. Falls back to the
/// tool name itself (minus a `create-`/`describe-` prefix) for anything
/// not in the fixed table, matching spec §4.2's "for each known tool
/// name a resource-type tag is derivable".
pub fn resource_type_for_tool(tool_name: &str) -> &str {
    match tool_name {
        t if t == c::CREATE_EC2_INSTANCE => "instance",
        t if t == c::CREATE_VPC => "vpc",
        t if t == c::CREATE_SUBNET => "subnet",
        t if t == c::CREATE_INTERNET_GATEWAY => "internet_gateway",
        t if t == c::CREATE_NAT_GATEWAY => "nat_gateway",
        t if t == c::CREATE_ROUTE_TABLE => "route_table",
        t if t == c::CREATE_SECURITY_GROUP => "security_group",
        t if t == c::CREATE_DB_INSTANCE => "db_instance",
        t if t == c::CREATE_DB_SUBNET_GROUP => "db_subnet_group",
        t if t == c::CREATE_LOAD_BALANCER => "load_balancer",
        t if t == c::CREATE_TARGET_GROUP => "target_group",
        t if t == c::CREATE_LAUNCH_TEMPLATE => "launch_template",
        t if t == c::CREATE_AUTO_SCALING_GROUP => "auto_scaling_group",
        other => other
            .trim_start_matches("create-")
            .trim_start_matches("describe-"),
    }
}

/// Priority-ordered extraction field list for a resource type. The
/// first field is the resource's "natural" id field; later entries are
/// fallbacks tried on miss, per spec §4.2.
pub fn extraction_fields(resource_type: &str) -> &'static [&'static str] {
    match resource_type {
        "instance" => &["instanceId", "resourceId"],
        "vpc" => &["vpcId", "resourceId"],
        "subnet" => &["subnetId", "resourceId"],
        "internet_gateway" => &["internetGatewayId", "resourceId"],
        "nat_gateway" => &["natGatewayId", "resourceId"],
        "route_table" => &["routeTableId", "resourceId"],
        "security_group" => &["securityGroupId", "resourceId"],
        "db_instance" => &["dbInstanceId", "resourceId"],
        "db_subnet_group" => &["dbSubnetGroupName", "resourceId"],
        "load_balancer" => &["loadBalancerArn", "resourceId"],
        "target_group" => &["targetGroupArn", "resourceId"],
        "launch_template" => &["launchTemplateId", "resourceId"],
        "auto_scaling_group" => &["autoScalingGroupName", "autoScalingGroupArn", "resourceId"],
        _ => &["resourceId"],
    }
}

/// The final common-fallback field list tried when a resource type's
/// own priority list misses entirely (spec §4.2).
pub const COMMON_FALLBACK_FIELDS: &[&str] = &["resourceId", "id", "arn"];

/// Type-aware alias list consulted by the Dependency Resolver's
/// state-based branch (§4.3) when the requested FIELD isn't present
/// verbatim on a resource's `mcp_response` — e.g. a request for the
/// generic `resourceId` on a subnet resource resolves to `subnetId`.
pub fn aliases_for(resource_type: &str, requested_field: &str) -> &'static [&'static str] {
    if requested_field != "resourceId" {
        return &[];
    }
    extraction_fields(resource_type)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_tool_names_to_resource_types() {
        assert_eq!(resource_type_for_tool(c::CREATE_VPC), "vpc");
        assert_eq!(resource_type_for_tool(c::CREATE_EC2_INSTANCE), "instance");
        assert_eq!(
            resource_type_for_tool(c::CREATE_AUTO_SCALING_GROUP),
            "auto_scaling_group"
        );
    }

    #[test]
    fn falls_back_to_stripped_tool_name_for_unknown_tools() {
        assert_eq!(resource_type_for_tool("create-widget"), "widget");
    }

    #[test]
    fn subnet_resourceid_alias_resolves_to_subnetid_first() {
        let aliases = aliases_for("subnet", "resourceId");
        assert_eq!(aliases.first(), Some(&"subnetId"));
    }
}
