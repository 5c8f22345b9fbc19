//! JSON-schema-shaped tool descriptions (spec §4.1, Tool Registry).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single parameter's JSON-schema fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertySchema {
    pub fn new(type_name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            description: Some(description.into()),
        }
    }
}

/// The `parameters` object of a tool definition, shaped like the JSON
/// Schema object type every backend tool call is validated against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSchema {
    #[serde(rename = "type")]
    pub type_name: String,
    pub properties: HashMap<String, PropertySchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl InputSchema {
    pub fn new(properties: HashMap<String, PropertySchema>, required: Vec<String>) -> Self {
        Self {
            type_name: "object".to_string(),
            properties,
            required,
        }
    }
}

/// Catalog entry returned by `ToolRegistry::list_tools` (spec §4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: InputSchema,
}
