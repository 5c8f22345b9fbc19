//! Plan execution and failure-recovery engine.
//!
//! This crate owns the mutable runtime state a plan execution needs
//! (the resource-mapping store, C2) and the components that turn a
//! `Plan` into a sequence of tool invocations with model-guided
//! recovery on failure: the Step Executor (C7), the Failure-Context
//! Builder (C9), the Recovery Engine (C10), the Plan Executor (C11),
//! and the Progress Bus (C12). The reference grammar, identifier
//! extraction, readiness waiting, the value-retrieval handler map and
//! the JSON scavenger (C3-C6, C8) live in `orc-core`, which this crate
//! depends on but never the reverse.

pub mod failure_context;
pub mod mapping_store;
pub mod model;
pub mod plan_executor;
pub mod progress;
pub mod recovery;
pub mod step_executor;

pub use failure_context::{FailureContext, PriorRecoveryAttempt};
pub use mapping_store::ResourceMappingStore;
pub use model::{HttpRecoveryAdvisor, MockRecoveryAdvisor, RecoveryAdvisor};
pub use orc_core::CancellationToken;
pub use plan_executor::{ExecutorConfig, PlanExecutor};
pub use progress::{channel, ProgressSink};
pub use recovery::{
    MultiStepSubStep, ModelRecoveryAnalysis, RecoveryActionKind, RecoveryDecider, RecoveryDecision,
    RecoveryMetrics, RecoveryOption, RiskLevel,
};
