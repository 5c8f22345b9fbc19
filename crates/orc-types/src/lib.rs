//! Data model for the plan execution & recovery engine.
//!
//! This crate is the leaf of the workspace's dependency graph: it defines
//! the plan/execution/resource types every other crate builds on, plus the
//! typed error enum used across the engine's error-handling design.

pub mod error;
pub mod execution;
pub mod plan;
pub mod resource;
pub mod update;

pub use error::OrchestratorError;
pub use execution::{ExecutionStep, PlanExecution, PlanExecutionStatus, StepStatus};
pub use plan::{ActionKind, Plan, PlanStep, ValueRetrievalParams};
pub use resource::ResourceState;
pub use update::{ExecutionUpdate, UpdateType};
