//! Gantry Core - Shared primitives for pipeline configuration
//!
//! This crate provides the error types, validated path values, parse
//! diagnostics and the package manifest model used by the task and
//! configuration crates.

pub mod diagnostics;
pub mod error;
pub mod manifest;
pub mod paths;

pub use diagnostics::{Diagnostic, Diagnostics, Parsed};
pub use error::{ConfigError, GantryError, PathError, Result, TaskError};
pub use manifest::PackageJson;
pub use paths::{is_absolute_path, AnchoredUnixPath};
