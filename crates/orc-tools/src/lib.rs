//! Tool Registry (C1) for the orcaestra plan execution engine.
//!
//! This crate defines the `Tool` trait, the JSON-schema-shaped catalog
//! types, the `ToolRegistry` dispatcher, and a built-in in-memory demo
//! backend covering the AWS-infrastructure-style tool names the rest of
//! the workspace knows about.

pub mod registry;
pub mod schema;
pub mod tool;
pub mod tools;

pub use registry::ToolRegistry;
pub use schema::{InputSchema, PropertySchema, ToolInfo};
pub use tool::{Tool, ToolError};
