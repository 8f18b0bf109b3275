//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Task definition errors
    #[error(transparent)]
    Task(#[from] TaskError),

    /// Path validation errors
    #[error(transparent)]
    Path(#[from] PathError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Could not find {}. {remediation}", path.display())]
    NotFound { path: PathBuf, remediation: String },

    /// Failed to parse configuration
    #[error("Failed to parse {}: {message}", path.display())]
    ParseError { path: PathBuf, message: String },

    /// A task block in the pipeline is invalid
    #[error("{}: invalid task \"{task}\": {source}", path.display())]
    InvalidTask {
        path: PathBuf,
        task: String,
        #[source]
        source: TaskError,
    },

    /// A top-level field such as `globalEnv` is invalid
    #[error("{}: invalid global configuration: {source}", path.display())]
    InvalidGlobal {
        path: PathBuf,
        #[source]
        source: TaskError,
    },

    /// Package-scoped task declared where only one workspace exists
    #[error("Package tasks (<package>#<task>) are not allowed in single-package repositories: found {0}")]
    PackageTaskInSingleWorkspace(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Task definition errors
#[derive(Debug, Error)]
pub enum TaskError {
    /// An env entry carries the deprecated `$` marker
    #[error("You specified \"{value}\" in the \"{key}\" key. You should not prefix your environment variables with \"$\"")]
    InvalidEnvPrefix { key: String, value: String },

    /// A path-valued entry failed validation
    #[error("Invalid path in \"{key}\": {source}")]
    InvalidPath {
        key: String,
        #[source]
        source: PathError,
    },

    /// Neither the task id nor the bare task name is in the pipeline
    #[error("Could not find task \"{0}\" in pipeline")]
    TaskNotFound(String),
}

/// Path validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// Path is empty
    #[error("path cannot be empty")]
    Empty,

    /// Path is absolute
    #[error("{0} is not a relative path")]
    NotRelative(String),
}

impl GantryError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}
