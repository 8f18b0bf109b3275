//! Gantry Config - Loading configuration files
//!
//! Reads `gantry.json` (or synthesizes a configuration for single-package
//! repositories), validates workspace configurations and resolves tasks
//! across an extends chain.

pub mod chain;
pub mod defaults;
pub mod jsonc;
pub mod loader;
pub mod types;
pub mod validation;

pub use chain::{collect_task_definitions, resolve_task};
pub use defaults::{CONFIG_FILE, DEFAULT_CONFIG_TEMPLATE, ROOT_WORKSPACE};
pub use loader::{
    config_path, load_config, load_or_synthesize, load_or_synthesize_with_diagnostics, read_config,
};
pub use types::{Configuration, RemoteCacheOptions};
pub use validation::{validate, validate_workspace_config, Validation, WORKSPACE_VALIDATIONS};
