//! Dependency Resolver (C3): parses `{{step.field.index}}` / `{{step.field}}[index]`
//! reference templates and resolves them against the mapping store, then
//! against managed state (spec §4.3).

use crate::resource_table::aliases_for;
use orc_types::resource::ManagedStateSnapshot;
use orc_types::OrchestratorError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::instrument;

const DEFAULT_FIELD: &str = "resourceId";

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"\{\{(?P<step>[A-Za-z0-9_-]+)(?:\.(?P<field>[A-Za-z_][A-Za-z0-9_]*))?(?:\.(?P<dot_index>\d+))?\}\}(?:\[(?P<bracket_index>\d+)\])?",
        )
        .expect("reference grammar regex is valid")
    })
}

/// A single parsed `{{step.field.index}}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub step: String,
    pub field: String,
    pub index: Option<usize>,
}

impl Reference {
    /// Whether `field` was left at its default (`resourceId`), i.e. no
    /// specific field was requested in the template.
    pub fn is_default_field(&self) -> bool {
        self.field == DEFAULT_FIELD
    }
}

/// A plain synchronous key/value store for resolved reference values.
/// Deliberately un-locked: the single-threaded-per-plan execution model
/// (spec §5) means C3 never needs interior mutability across await
/// points, and keeping this trait sync avoids coupling `orc-core` to
/// the orchestrator's actual async-locked C2 implementation.
pub trait MappingStore {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn insert(&mut self, key: String, value: serde_json::Value);
}

/// Parse every `{{…}}` occurrence in `text` into a `Reference`, in order
/// of appearance. A string containing no `{{…}}` pair yields an empty
/// vec — the caller returns the text unchanged.
pub fn parse_all(text: &str) -> Vec<Reference> {
    pattern()
        .captures_iter(text)
        .map(|caps| {
            let step = caps["step"].to_string();
            let field = caps
                .name("field")
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_FIELD.to_string());
            let index = caps
                .name("dot_index")
                .or_else(|| caps.name("bracket_index"))
                .and_then(|m| m.as_str().parse::<usize>().ok());
            Reference { step, field, index }
        })
        .collect()
}

/// Resolve a single reference against the mapping store and, unless
/// `test_mode` suppresses it, against managed state. Returns the
/// resolved value as a string (array elements are stringified via their
/// JSON representation when not already a string).
#[instrument(skip(store, snapshot), fields(step = %reference.step, field = %reference.field))]
pub fn resolve_reference(
    reference: &Reference,
    store: &mut dyn MappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
) -> Result<String, OrchestratorError> {
    // Step 1: indexed lookup in the store.
    if let Some(index) = reference.index {
        let key = format!("{}.{}", reference.step, index);
        if let Some(value) = store.get(&key) {
            return Ok(value_to_string(&value));
        }
    }

    // Step 2: bare-step lookup, only when no specific field was requested.
    if reference.index.is_none() && reference.is_default_field() {
        if let Some(value) = store.get(&reference.step) {
            return Ok(value_to_string(&value));
        }
    }

    // Step 3: managed-state snapshot lookup.
    if !test_mode {
        if let Some(snapshot) = snapshot {
            if let Some(resource) = snapshot.find(&reference.step) {
                let mcp_response = &resource.properties.mcp_response;

                if let Some(index) = reference.index {
                    let array = mcp_response
                        .get(&reference.field)
                        .and_then(|v| v.as_array())
                        .ok_or_else(|| {
                            OrchestratorError::ReferenceUnresolved(format!(
                                "{}.{}[{}]: field is not an array",
                                reference.step, reference.field, index
                            ))
                        })?;
                    let element = array.get(index).ok_or_else(|| {
                        OrchestratorError::ReferenceUnresolved(format!(
                            "{}.{}[{}]: index out of bounds (len {})",
                            reference.step,
                            reference.field,
                            index,
                            array.len()
                        ))
                    })?;
                    let resolved = value_to_string(element);
                    store.insert(format!("{}.{}", reference.step, index), element.clone());
                    return Ok(resolved);
                }

                if let Some(value) = mcp_response.get(&reference.field) {
                    store.insert(reference.step.clone(), value.clone());
                    return Ok(value_to_string(value));
                }

                let resource_type = &resource.resource_type;
                for alias in aliases_for(resource_type, &reference.field) {
                    if let Some(value) = mcp_response.get(*alias) {
                        store.insert(reference.step.clone(), value.clone());
                        return Ok(value_to_string(value));
                    }
                }
            }
        }
    }

    // Step 4: hard failure.
    Err(OrchestratorError::ReferenceUnresolved(format!(
        "{}.{}",
        reference.step, reference.field
    )))
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Resolve every `{{…}}` occurrence embedded in `text`, splicing resolved
/// values back into the surrounding text. A string with no reference is
/// returned unchanged (cloned) without touching the store.
pub fn resolve_string(
    text: &str,
    store: &mut dyn MappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
) -> Result<String, OrchestratorError> {
    let references = parse_all(text);
    if references.is_empty() {
        return Ok(text.to_string());
    }

    let mut result = String::with_capacity(text.len());
    let mut last_end = 0;

    for (reference, mat) in references.iter().zip(pattern().find_iter(text)) {
        result.push_str(&text[last_end..mat.start()]);
        let resolved = resolve_reference(reference, store, snapshot, test_mode)?;
        result.push_str(&resolved);
        last_end = mat.end();
    }
    result.push_str(&text[last_end..]);

    Ok(result)
}

/// Resolve references across a JSON value: strings and string-array
/// elements are resolved; everything else passes through unchanged, per
/// the Step Executor's (C7) contract in spec §4.6.
pub fn resolve_value(
    value: &serde_json::Value,
    store: &mut dyn MappingStore,
    snapshot: Option<&ManagedStateSnapshot>,
    test_mode: bool,
) -> Result<serde_json::Value, OrchestratorError> {
    match value {
        serde_json::Value::String(s) => {
            Ok(serde_json::Value::String(resolve_string(s, store, snapshot, test_mode)?))
        }
        serde_json::Value::Array(items) => {
            let mut resolved = Vec::with_capacity(items.len());
            for item in items {
                resolved.push(resolve_value(item, store, snapshot, test_mode)?);
            }
            Ok(serde_json::Value::Array(resolved))
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orc_types::resource::ResourceState;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Default)]
    struct InMemoryStore(HashMap<String, serde_json::Value>);

    impl MappingStore for InMemoryStore {
        fn get(&self, key: &str) -> Option<serde_json::Value> {
            self.0.get(key).cloned()
        }

        fn insert(&mut self, key: String, value: serde_json::Value) {
            self.0.insert(key, value);
        }
    }

    #[test]
    fn bracket_suffix_normalizes_to_dotted_index_form() {
        let dotted = parse_all("{{vpc-step.subnetIds.0}}");
        let bracketed = parse_all("{{vpc-step.subnetIds}}[0]");
        assert_eq!(dotted, bracketed);
    }

    #[test]
    fn string_with_no_braces_is_returned_unchanged() {
        let mut store = InMemoryStore::default();
        let resolved = resolve_string("plain-literal-value", &mut store, None, true).unwrap();
        assert_eq!(resolved, "plain-literal-value");
    }

    #[test]
    fn indexed_store_hit_takes_priority() {
        let mut store = InMemoryStore::default();
        store.insert("vpc-step.0".to_string(), json!("vpc-cached"));
        let resolved = resolve_string("{{vpc-step.subnetIds.0}}", &mut store, None, true).unwrap();
        assert_eq!(resolved, "vpc-cached");
    }

    #[test]
    fn bare_step_hit_only_applies_when_default_field_requested() {
        let mut store = InMemoryStore::default();
        store.insert("vpc-step".to_string(), json!("vpc-bare-hit"));

        let resolved = resolve_string("{{vpc-step}}", &mut store, None, true).unwrap();
        assert_eq!(resolved, "vpc-bare-hit");

        let err = resolve_string("{{vpc-step.cidrBlock}}", &mut store, None, true).unwrap_err();
        assert!(matches!(err, OrchestratorError::ReferenceUnresolved(_)));
    }

    #[test]
    fn state_based_alias_fallback_resolves_resourceid_to_subnetid() {
        let mut store = InMemoryStore::default();
        let mut snapshot = ManagedStateSnapshot::default();
        snapshot.resources.push(ResourceState::new(
            "subnet-step",
            "subnet-step",
            "subnet",
            json!({ "subnetId": "subnet-abc", "state": "available" }),
        ));

        let resolved =
            resolve_string("{{subnet-step}}", &mut store, Some(&snapshot), false).unwrap();
        assert_eq!(resolved, "subnet-abc");
    }

    #[test]
    fn out_of_bounds_array_index_is_a_hard_failure() {
        let mut store = InMemoryStore::default();
        let mut snapshot = ManagedStateSnapshot::default();
        snapshot.resources.push(ResourceState::new(
            "subnets-step",
            "subnets-step",
            "subnet_group",
            json!({ "subnetIds": ["subnet-a", "subnet-b"] }),
        ));

        let err = resolve_string("{{subnets-step.subnetIds.5}}", &mut store, Some(&snapshot), false)
            .unwrap_err();
        assert!(matches!(err, OrchestratorError::ReferenceUnresolved(_)));
    }

    #[test]
    fn test_mode_suppresses_state_based_lookup() {
        let mut store = InMemoryStore::default();
        let mut snapshot = ManagedStateSnapshot::default();
        snapshot.resources.push(ResourceState::new(
            "vpc-step",
            "vpc-step",
            "vpc",
            json!({ "vpcId": "vpc-xyz" }),
        ));

        let err = resolve_string("{{vpc-step}}", &mut store, Some(&snapshot), true).unwrap_err();
        assert!(matches!(err, OrchestratorError::ReferenceUnresolved(_)));
    }

    #[test]
    fn unresolved_reference_is_a_hard_failure_not_a_passthrough() {
        let mut store = InMemoryStore::default();
        let err = resolve_string("{{missing-step.vpcId}}", &mut store, None, true).unwrap_err();
        assert!(matches!(err, OrchestratorError::ReferenceUnresolved(_)));
    }
}
