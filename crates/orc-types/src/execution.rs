//! Runtime execution records (spec §3 "Execution Step" / "Plan Execution").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Runtime status of a single executed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Running,
    Completed,
    Failed,
    Skipped,
}

/// Runtime record of one plan step's execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub id: String,
    pub name: String,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration: Option<chrono::Duration>,
    pub error: Option<String>,
    #[serde(default)]
    pub output: HashMap<String, serde_json::Value>,
}

impl ExecutionStep {
    pub fn start(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: StepStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            duration: None,
            error: None,
            output: HashMap::new(),
        }
    }

    /// Seal the step as completed with the given output, stamping the
    /// completion timestamp and duration. Invariant: `started_at <=
    /// completed_at` holds because `completed_at` is stamped here,
    /// strictly after `start()` set `started_at`.
    pub fn complete(mut self, output: HashMap<String, serde_json::Value>) -> Self {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.duration = Some(now - self.started_at);
        self.status = StepStatus::Completed;
        self.output = output;
        self
    }

    pub fn fail(mut self, error: impl Into<String>) -> Self {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.duration = Some(now - self.started_at);
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
        self
    }

    pub fn skip(mut self, reason: impl Into<String>) -> Self {
        let now = Utc::now();
        self.completed_at = Some(now);
        self.duration = Some(now - self.started_at);
        self.status = StepStatus::Skipped;
        self.output.insert(
            "status".to_string(),
            serde_json::Value::String("skipped".to_string()),
        );
        self.output.insert(
            "reason".to_string(),
            serde_json::Value::String(reason.into()),
        );
        self
    }
}

/// Overall status of a plan execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanExecutionStatus {
    Running,
    Completed,
    Failed,
}

/// Top-level record the Plan Executor (C11) builds and mutates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanExecution {
    pub id: String,
    pub name: String,
    pub status: PlanExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub steps: Vec<ExecutionStep>,
    pub errors: Vec<String>,
}

impl PlanExecution {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            status: PlanExecutionStatus::Running,
            started_at: Utc::now(),
            completed_at: None,
            steps: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Seal the execution. Status is `Failed` iff any error was
    /// appended and the loop broke; otherwise `Completed` — matching the
    /// invariant in spec §3.
    pub fn finalize(&mut self) {
        self.completed_at = Some(Utc::now());
        self.status = if self.errors.is_empty() {
            PlanExecutionStatus::Completed
        } else {
            PlanExecutionStatus::Failed
        };
    }

    pub fn push_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }
}
