//! Gantry Tasks - Task definitions for the pipeline
//!
//! This crate parses task blocks into definitions that track which fields
//! were declared, merges them along an extends chain, and renders the
//! result in the canonical form used for hashing.

pub mod merge;
pub mod parser;
pub mod pipeline;
pub mod serialize;
pub mod task;
pub mod tracked;

pub use merge::merge_task_definitions;
pub use parser::{normalize_depends_on, parse_task_definition, parse_task_json, RawTaskDefinition};
pub use pipeline::Pipeline;
pub use serialize::PristineTaskDefinition;
pub use task::{
    FieldId, OutputMode, ResolvedTaskDefinition, TaskDependencies, TaskId, TaskOutputs,
    ROOT_PKG_NAME,
};
pub use tracked::{TaskExperiments, TrackedTaskDefinition};
