//! CLI-facing glue for running a plan through the orcaestra engine:
//! configuration loading, the HTTP model client, and the deterministic
//! demo plan used when no plan file is given.

pub mod config;
pub mod demo;
pub mod model_client;

pub use config::OrchestratorConfig;
pub use model_client::HttpModelAdvisor;

use orc_types::Plan;
use std::path::Path;

/// Load a `Plan` from a YAML or JSON file, inferred from its extension.
/// Defaults to YAML for any other (or missing) extension, matching the
/// teacher's benchmark-loading convention.
pub fn load_plan(path: &Path) -> anyhow::Result<Plan> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read plan file {path:?}: {e}"))?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(serde_json::from_str(&contents)?),
        _ => Ok(serde_yaml::from_str(&contents)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_plan_reads_yaml() {
        let mut file = tempfile::Builder::new().suffix(".yml").tempfile().unwrap();
        write!(
            file,
            "id: plan-1\naction: \"\"\nexecution_plan:\n  - id: step-vpc\n    name: step-vpc\n    description: \"\"\n    action: create\n    resource_id: null\n    tool_name: create-vpc\n    tool_params: {{}}\n    params: {{}}\n    depends_on: []\n    estimated_duration: null\n    status: null\n"
        )
        .unwrap();

        let plan = load_plan(file.path()).unwrap();
        assert_eq!(plan.id, "plan-1");
        assert_eq!(plan.execution_plan.len(), 1);
    }

    #[test]
    fn load_plan_reads_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"id":"plan-2","action":"","execution_plan":[]}}"#
        )
        .unwrap();

        let plan = load_plan(file.path()).unwrap();
        assert_eq!(plan.id, "plan-2");
        assert!(plan.execution_plan.is_empty());
    }
}
