//! Deterministic demo mode: a sample plan and a canned advisor, used
//! when `--demo` is passed instead of a plan file and no model
//! endpoint is configured. Exercises the reference grammar, the
//! value-retrieval handler map, and readiness waiting end to end
//! without any external dependency.

use orc_orchestrator::MockRecoveryAdvisor;
use orc_types::{Plan, PlanStep};

/// A four-step plan: look up the latest AMI, create a VPC, create a
/// subnet inside it, then launch an instance referencing both.
pub fn sample_plan() -> Plan {
    Plan::new(
        "demo-plan-1",
        vec![
            PlanStep::new_value_retrieval("step-ami", "latest_ami")
                .with_description("look up the latest Amazon Linux AMI"),
            PlanStep::new_create("step-vpc", orc_constants::CREATE_VPC)
                .with_description("create the VPC")
                .with_tool_param("cidr_block", serde_json::json!("10.0.0.0/16")),
            PlanStep::new_create("step-subnet", orc_constants::CREATE_SUBNET)
                .with_description("create a subnet inside the VPC")
                .with_tool_param("vpc_id", serde_json::json!("{{step-vpc}}"))
                .with_tool_param("availability_zone", serde_json::json!("us-east-1a")),
            PlanStep::new_create("step-instance", orc_constants::CREATE_EC2_INSTANCE)
                .with_description("launch an instance into the new subnet")
                .with_tool_param("ami_id", serde_json::json!("{{step-ami}}"))
                .with_tool_param("subnet_id", serde_json::json!("{{step-subnet}}")),
        ],
    )
}

/// A deterministic advisor for the demo plan: always recommends
/// retrying with the same parameters, which is all the sample plan
/// ever needs since none of its steps are wired to fail.
pub fn demo_advisor() -> MockRecoveryAdvisor {
    MockRecoveryAdvisor::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_plan_has_four_steps_in_dependency_order() {
        let plan = sample_plan();
        assert_eq!(plan.execution_plan.len(), 4);
        assert_eq!(plan.execution_plan[0].id, "step-ami");
        assert_eq!(plan.execution_plan[3].id, "step-instance");
    }
}
