//! Configuration types

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use gantry_core::{
    is_absolute_path, AnchoredUnixPath, ConfigError, Diagnostic, Diagnostics, Parsed, Result,
};
use gantry_tasks::parser::{check_dot_env, gather_env_vars, ENV_PIPELINE_DELIMITER};
use gantry_tasks::{parse_task_definition, Pipeline, RawTaskDefinition};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::jsonc::strip_comments;

/// Options for interfacing with the remote cache
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteCacheOptions {
    /// Team the cache belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,

    /// Whether artifacts are signed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub signature: bool,
}

/// The `experimentalSpaces` block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceConfig {
    pub id: String,
}

/// A configuration file exactly as written
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfiguration {
    pub global_dependencies: Option<Vec<String>>,
    pub global_env: Option<Vec<String>>,
    pub global_pass_through_env: Option<Vec<String>>,
    pub global_dot_env: Option<Vec<String>>,
    #[serde(default)]
    pub pipeline: BTreeMap<String, RawTaskDefinition>,
    #[serde(default)]
    pub remote_cache: RemoteCacheOptions,
    #[serde(default)]
    pub extends: Vec<String>,
    pub experimental_spaces: Option<SpaceConfig>,
}

/// One parsed configuration source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    /// Files whose change invalidates every task
    pub global_dependencies: BTreeSet<String>,

    /// Environment variables that affect every task hash
    pub global_env: BTreeSet<String>,

    /// Environment variables passed to every task without hashing
    pub global_pass_through_env: Option<BTreeSet<String>>,

    /// `.env` files for every task, in precedence order
    pub global_dot_env: Option<Vec<AnchoredUnixPath>>,

    /// Task definitions
    pub pipeline: Pipeline,

    /// Remote cache options
    pub remote_cache: RemoteCacheOptions,

    /// Configurations this one inherits from, most general first
    pub extends: Vec<String>,

    /// Workspace grouping identifier
    pub space_id: Option<String>,
}

impl Configuration {
    /// A configuration with nothing declared
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse configuration text (JSON with comments). `path` is only used
    /// for error messages.
    pub fn from_jsonc(text: &str, path: &Path) -> Result<Parsed<Self>> {
        let parse_error = |message: String| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        };
        let json = strip_comments(text).map_err(|e| parse_error(e.to_string()))?;
        let raw: RawConfiguration =
            serde_json::from_str(&json).map_err(|e| parse_error(e.to_string()))?;
        Self::from_raw(raw, path)
    }

    /// Validate and normalize a raw configuration
    pub fn from_raw(raw: RawConfiguration, path: &Path) -> Result<Parsed<Self>> {
        let mut diagnostics = Diagnostics::new();
        let invalid_global = |source| ConfigError::InvalidGlobal {
            path: path.to_path_buf(),
            source,
        };

        let mut global_env = BTreeSet::new();
        gather_env_vars(raw.global_env.as_deref().unwrap_or_default(), "globalEnv", &mut global_env)
            .map_err(invalid_global)?;

        let global_pass_through_env = match &raw.global_pass_through_env {
            Some(vars) => {
                let mut set = BTreeSet::new();
                gather_env_vars(vars, "globalPassThroughEnv", &mut set).map_err(invalid_global)?;
                Some(set)
            }
            None => None,
        };

        let mut global_dependencies = BTreeSet::new();
        for value in raw.global_dependencies.unwrap_or_default() {
            if let Some(var) = value.strip_prefix(ENV_PIPELINE_DELIMITER) {
                diagnostics.push(Diagnostic::DeprecatedEnvDependency {
                    field: "globalDependencies".to_string(),
                    value: value.clone(),
                });
                global_env.insert(var.to_string());
            } else {
                if is_absolute_path(&value) {
                    diagnostics.push(Diagnostic::AbsolutePath {
                        field: "globalDependencies".to_string(),
                        value: value.clone(),
                    });
                }
                global_dependencies.insert(value);
            }
        }

        let global_dot_env = match &raw.global_dot_env {
            Some(entries) => Some(check_dot_env(entries, "globalDotEnv").map_err(invalid_global)?),
            None => None,
        };

        let mut pipeline = Pipeline::new();
        for (task, raw_task) in raw.pipeline {
            let parsed = parse_task_definition(raw_task).map_err(|source| ConfigError::InvalidTask {
                path: path.to_path_buf(),
                task: task.clone(),
                source,
            })?;
            diagnostics.extend(parsed.diagnostics);
            pipeline.insert(task, parsed.value);
        }

        debug!(
            path = %path.display(),
            tasks = pipeline.len(),
            extends = raw.extends.len(),
            "parsed configuration"
        );

        let config = Self {
            global_dependencies,
            global_env,
            global_pass_through_env,
            global_dot_env,
            pipeline,
            remote_cache: raw.remote_cache,
            extends: raw.extends,
            space_id: raw.experimental_spaces.map(|space| space.id),
        };
        Ok(Parsed::new(config, diagnostics))
    }

    /// Canonical JSON form, used for dry-run output and pruned configuration files
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(PristineConfiguration::from(self))?)
    }

    /// Canonical JSON text, pretty-printed for writing to disk
    pub fn to_pretty_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&PristineConfiguration::from(self))?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PristineConfiguration<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    global_dependencies: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_env: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_pass_through_env: Option<&'a BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    global_dot_env: Option<&'a [AnchoredUnixPath]>,
    pipeline: &'a Pipeline,
    remote_cache: &'a RemoteCacheOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    extends: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    experimental_spaces: Option<SpaceConfig>,
}

impl<'a> From<&'a Configuration> for PristineConfiguration<'a> {
    fn from(config: &'a Configuration) -> Self {
        Self {
            global_dependencies: Some(&config.global_dependencies).filter(|set| !set.is_empty()),
            global_env: Some(&config.global_env).filter(|set| !set.is_empty()),
            global_pass_through_env: config.global_pass_through_env.as_ref(),
            global_dot_env: config.global_dot_env.as_deref(),
            pipeline: &config.pipeline,
            remote_cache: &config.remote_cache,
            extends: Some(config.extends.as_slice()).filter(|extends| !extends.is_empty()),
            experimental_spaces: config.space_id.clone().map(|id| SpaceConfig { id }),
        }
    }
}
