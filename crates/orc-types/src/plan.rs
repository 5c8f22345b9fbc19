//! Plan and plan-step types (spec §3 "Plan Step").
//!
//! A `Plan` is the directed sequence of typed steps an LLM produces; a
//! `PlanStep` is a single entry in that sequence. `depends_on` is advisory
//! only — the real execution order is implied by the `{{step.field}}`
//! reference templates embedded in `tool_params`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{Display, EnumString};

/// The kind of action a plan step performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Invokes a tool that provisions a new resource.
    Create,
    /// Invokes a tool that mutates an existing resource.
    Update,
    /// Invokes a tool that tears down a resource.
    Delete,
    /// A no-op check used for plan compatibility; always succeeds.
    Validate,
    /// Queries the environment for an ambient value via C5's handler map
    /// instead of calling a backend tool.
    ApiValueRetrieval,
}

/// Action-level parameters carried by `api_value_retrieval` steps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValueRetrievalParams {
    /// Name of the C5 handler to invoke (`latest_ami`, `default_vpc`, …).
    /// When absent, the type-inferrer derives one from the step's name
    /// and description.
    pub value_type: Option<String>,
    /// Free-form filters passed through to the handler (e.g. `os_type`,
    /// `name`, `vpc_id`).
    #[serde(flatten)]
    pub filters: HashMap<String, serde_json::Value>,
}

/// A single step in an LLM-produced plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Stable identifier, also the reference namespace (`step-ami`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Human-readable description, surfaced in `step_progress` updates.
    pub description: String,
    /// What kind of action this step performs.
    pub action: ActionKind,
    /// Logical identifier for the produced resource; mutated in place to
    /// the real identifier once the step succeeds.
    pub resource_id: Option<String>,
    /// The backend tool to invoke. Empty for `api_value_retrieval`.
    #[serde(default)]
    pub tool_name: String,
    /// Parameter name -> literal or reference-template value.
    #[serde(default)]
    pub tool_params: HashMap<String, serde_json::Value>,
    /// Action-level parameters (value-retrieval's `value_type`/filters).
    #[serde(default)]
    pub params: ValueRetrievalParams,
    /// Advisory list of other step ids this one depends on.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Estimated duration in seconds, for display/planning purposes only.
    #[serde(default)]
    pub estimated_duration: Option<u64>,
    /// Last known status of this step (mirrors the execution step once
    /// the plan has been run at least once).
    #[serde(default)]
    pub status: Option<String>,
}

impl PlanStep {
    /// Build a minimal `create` step.
    pub fn new_create(id: impl Into<String>, tool_name: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            description: String::new(),
            id,
            action: ActionKind::Create,
            resource_id: None,
            tool_name: tool_name.into(),
            tool_params: HashMap::new(),
            params: ValueRetrievalParams::default(),
            depends_on: Vec::new(),
            estimated_duration: None,
            status: None,
        }
    }

    /// Build a minimal `api_value_retrieval` step.
    pub fn new_value_retrieval(id: impl Into<String>, value_type: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            description: String::new(),
            id,
            action: ActionKind::ApiValueRetrieval,
            resource_id: None,
            tool_name: String::new(),
            tool_params: HashMap::new(),
            params: ValueRetrievalParams {
                value_type: Some(value_type.into()),
                filters: HashMap::new(),
            },
            depends_on: Vec::new(),
            estimated_duration: None,
            status: None,
        }
    }

    /// Set tool params and return self for chaining (teacher-style
    /// builder, see `DynamicStep::with_*`).
    pub fn with_tool_param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.tool_params.insert(key.into(), value);
        self
    }

    /// Add a depends-on entry and return self for chaining.
    pub fn with_depends_on(mut self, step_id: impl Into<String>) -> Self {
        self.depends_on.push(step_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// A directed sequence of steps produced by a language model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// Plan identifier.
    pub id: String,
    /// What the plan accomplishes, as free text from the model.
    #[serde(default)]
    pub action: String,
    /// Steps in execution order.
    pub execution_plan: Vec<PlanStep>,
}

impl Plan {
    pub fn new(id: impl Into<String>, steps: Vec<PlanStep>) -> Self {
        Self {
            id: id.into(),
            action: String::new(),
            execution_plan: steps,
        }
    }

    pub fn step(&self, id: &str) -> Option<&PlanStep> {
        self.execution_plan.iter().find(|s| s.id == id)
    }
}
