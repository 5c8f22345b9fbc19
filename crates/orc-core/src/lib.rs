//! Dependency resolution, identifier extraction, value retrieval,
//! readiness waiting and JSON scavenging for the plan execution engine.
//!
//! This crate sits between the leaf data model (`orc-types`), the
//! backend tool catalog (`orc-tools`) and the orchestrator that drives a
//! plan end to end (`orc-orchestrator`). Everything here is pure or
//! single-threaded-per-call; the orchestrator owns the locking.

pub mod cancellation;
pub mod extractor;
pub mod json_scavenger;
pub mod readiness;
pub mod reference;
pub mod resource_table;
pub mod value_retrieval;

pub use cancellation::CancellationToken;
pub use extractor::extract_resource_id;
pub use reference::{resolve_reference, resolve_string, resolve_value, MappingStore, Reference};
