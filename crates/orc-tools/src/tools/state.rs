//! `save-state` — the one reserved tool name every plan step may call
//! after a successful `create`/`update` (spec §3, §4.7).

use crate::schema::{InputSchema, PropertySchema};
use crate::tool::{Tool, ToolError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;

#[derive(Default)]
pub struct SaveStateTool;

impl SaveStateTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Tool for SaveStateTool {
    fn name(&self) -> &str {
        orc_constants::SAVE_STATE
    }

    fn description(&self) -> &str {
        "Persist the current managed-state snapshot to durable storage."
    }

    fn input_schema(&self) -> InputSchema {
        let mut properties = HashMap::new();
        properties.insert(
            "force".to_string(),
            PropertySchema::new("boolean", "Write even if no resources changed."),
        );
        InputSchema::new(properties, Vec::new())
    }

    async fn call(&self, args: serde_json::Value) -> Result<serde_json::Value, ToolError> {
        let force = args.get("force").and_then(|v| v.as_bool()).unwrap_or(false);
        Ok(json!({ "status": "saved", "forced": force }))
    }
}

