//! Configuration validation

use gantry_core::{ConfigError, Result};
use gantry_tasks::task::is_package_task;
use tracing::debug;

use super::defaults::ROOT_WORKSPACE;
use super::types::Configuration;

/// A check run against a loaded configuration. Returns every problem found.
pub type Validation = fn(&Configuration) -> Vec<ConfigError>;

/// Checks that apply to a workspace-level configuration
pub const WORKSPACE_VALIDATIONS: &[Validation] = &[no_package_task_syntax, extends_root_only];

/// Run each validation in order and collect their errors
pub fn validate(config: &Configuration, validations: &[Validation]) -> Vec<ConfigError> {
    let errors: Vec<ConfigError> = validations.iter().flat_map(|check| check(config)).collect();
    debug!(checks = validations.len(), errors = errors.len(), "validated configuration");
    errors
}

/// Validate a workspace configuration, failing on the first problem
pub fn validate_workspace_config(config: &Configuration) -> Result<()> {
    match validate(config, WORKSPACE_VALIDATIONS).into_iter().next() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Workspace configurations may only declare bare task names
pub fn no_package_task_syntax(config: &Configuration) -> Vec<ConfigError> {
    config
        .pipeline
        .keys()
        .filter(|task_id| is_package_task(task_id))
        .map(|task_id| ConfigError::InvalidValue {
            field: format!("pipeline.{}", task_id),
            message: "package tasks (<package>#<task>) are only allowed in the root configuration"
                .to_string(),
        })
        .collect()
}

/// A workspace configuration must extend exactly the root configuration
pub fn extends_root_only(config: &Configuration) -> Vec<ConfigError> {
    if config.extends.len() == 1 && config.extends[0] == ROOT_WORKSPACE {
        return Vec::new();
    }

    vec![ConfigError::InvalidValue {
        field: "extends".to_string(),
        message: format!(
            "must be [\"{}\"], found [{}]",
            ROOT_WORKSPACE,
            config
                .extends
                .iter()
                .map(|e| format!("\"{}\"", e))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }]
}
