//! Identifier Extractor (C4): pulls the canonical resource id out of a
//! raw tool response, per spec §4.2.

use crate::resource_table::{extraction_fields, resource_type_for_tool, COMMON_FALLBACK_FIELDS};
use orc_types::OrchestratorError;
use tracing::instrument;

/// Extract the canonical resource identifier from `response`, the raw
/// map a backend tool returned for `tool_name`. Tries the resource
/// type's priority-ordered field list, then the common fallback list.
/// Never invents an id: a total miss is a hard error.
#[instrument(skip(response), fields(tool_name))]
pub fn extract_resource_id(
    tool_name: &str,
    response: &serde_json::Value,
) -> Result<String, OrchestratorError> {
    let resource_type = resource_type_for_tool(tool_name);

    for field in extraction_fields(resource_type) {
        if let Some(id) = string_field(response, field) {
            return Ok(id);
        }
    }

    for field in COMMON_FALLBACK_FIELDS {
        if let Some(id) = string_field(response, field) {
            return Ok(id);
        }
    }

    Err(OrchestratorError::Extraction {
        tool_name: tool_name.to_string(),
    })
}

fn string_field(response: &serde_json::Value, field: &str) -> Option<String> {
    response.get(field).and_then(|v| match v {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_natural_field_for_known_resource_type() {
        let response = json!({ "vpcId": "vpc-abc123", "cidrBlock": "10.0.0.0/16" });
        let id = extract_resource_id(orc_constants::CREATE_VPC, &response).unwrap();
        assert_eq!(id, "vpc-abc123");
    }

    #[test]
    fn falls_back_to_resource_id_when_natural_field_missing() {
        let response = json!({ "resourceId": "vpc-fallback" });
        let id = extract_resource_id(orc_constants::CREATE_VPC, &response).unwrap();
        assert_eq!(id, "vpc-fallback");
    }

    #[test]
    fn falls_back_to_common_fallback_list_for_unknown_tool() {
        let response = json!({ "id": "widget-1" });
        let id = extract_resource_id("create-widget", &response).unwrap();
        assert_eq!(id, "widget-1");
    }

    #[test]
    fn fails_loudly_when_nothing_matches() {
        let response = json!({ "unrelatedField": "nope" });
        let err = extract_resource_id(orc_constants::CREATE_VPC, &response).unwrap_err();
        assert!(matches!(err, OrchestratorError::Extraction { .. }));
    }
}
