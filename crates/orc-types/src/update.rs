//! Execution Update — the event type carried on the Progress Bus (C12).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// The closed set of progress event types (spec §4.11).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UpdateType {
    ExecutionStarted,
    ExecutionCompleted,
    StepStarted,
    StepProgress,
    StepCompleted,
    StepFailed,
    StepFailedFinal,
    StepSkipped,
    StepRecoveryGenerating,
    StepRecoveryStarted,
    StepRecoveryProgress,
    StepRecoveryCompleted,
    StepRecoveryFailed,
}

/// A single progress event emitted to the observer stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionUpdate {
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub execution_id: String,
    pub step_id: Option<String>,
    pub message: String,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionUpdate {
    pub fn new(update_type: UpdateType, execution_id: impl Into<String>) -> Self {
        Self {
            update_type,
            execution_id: execution_id.into(),
            step_id: None,
            message: String::new(),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_step(mut self, step_id: impl Into<String>) -> Self {
        self.step_id = Some(step_id.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
