//! Tool Registry (C1): catalog lookup and dispatch.

use crate::schema::ToolInfo;
use crate::tool::Tool;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Holds every backend tool the orchestrator is allowed to invoke,
/// behind a single `RwLock` so readers (catalog listing) never block
/// each other and writers (startup registration) are rare and short.
///
/// Invariant: no code path acquires a second lock, of any kind, while
/// holding this one — progress emission and step execution both happen
/// strictly after the read guard is dropped.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<HashMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: RwLock::new(HashMap::new()),
        }
    }

    /// Register a tool, replacing any previous tool registered under the
    /// same name. Idempotent: registering the same tool twice is a no-op
    /// in effect.
    pub async fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.write().await.insert(name, tool);
    }

    /// Build the default in-memory demo backend and register every tool
    /// it provides. Called once at startup; safe to call more than once.
    pub async fn ensure_capabilities(&self) {
        if !self.tools.read().await.is_empty() {
            return;
        }
        for tool in crate::tools::demo_backend_tools() {
            self.register(tool).await;
        }
    }

    /// Full catalog, keyed by tool name, for model-facing tool listings.
    pub async fn list_tools(&self) -> HashMap<String, ToolInfo> {
        let tools = self.tools.read().await;
        tools
            .iter()
            .map(|(name, tool)| {
                (
                    name.clone(),
                    ToolInfo {
                        name: tool.name().to_string(),
                        description: tool.description().to_string(),
                        parameters: tool.input_schema(),
                    },
                )
            })
            .collect()
    }

    pub async fn contains(&self, tool_name: &str) -> bool {
        self.tools.read().await.contains_key(tool_name)
    }

    /// Invoke a registered tool by name. Returns `None` if no tool is
    /// registered under `tool_name`; the caller turns that into an
    /// `OrchestratorError::SchemaInvalid` with a "tool not found" detail.
    #[instrument(skip(self, args), fields(tool_name))]
    pub async fn invoke(
        &self,
        tool_name: &str,
        args: serde_json::Value,
    ) -> Option<Result<serde_json::Value, crate::tool::ToolError>> {
        let tool = {
            let tools = self.tools.read().await;
            tools.get(tool_name).cloned()
        }?;
        Some(tool.call(args).await)
    }
}
