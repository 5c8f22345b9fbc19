//! Resource State — a snapshot entry in managed state (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single resource recorded in managed state, produced by a previous
/// successful `create` step and authored through the `save-state` tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub status: String,
    /// Raw tool response lives under `properties.mcp_response` — this is
    /// what the Dependency Resolver (C3) reads on a state-based lookup.
    pub properties: ResourceProperties,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceProperties {
    pub mcp_response: serde_json::Value,
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl ResourceState {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        resource_type: impl Into<String>,
        mcp_response: serde_json::Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            resource_type: resource_type.into(),
            status: "created".to_string(),
            properties: ResourceProperties {
                mcp_response,
                extra: HashMap::new(),
            },
            dependencies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A point-in-time snapshot of managed state, as the Failure-Context
/// Builder (C9) and the state-based branch of the Dependency Resolver
/// (C3) consume it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagedStateSnapshot {
    pub resources: Vec<ResourceState>,
}

impl ManagedStateSnapshot {
    pub fn find(&self, id: &str) -> Option<&ResourceState> {
        self.resources.iter().find(|r| r.id == id)
    }
}
