//! Parsing raw task blocks into tracked task definitions
//!
//! Parsing is pure. Anything worth warning about is returned as a
//! [`Diagnostic`] next to the parsed value instead of being logged here.

use std::collections::BTreeSet;

use gantry_core::{is_absolute_path, AnchoredUnixPath, Diagnostic, Diagnostics, Parsed, TaskError};
use serde::Deserialize;

use crate::task::{OutputMode, TaskDependencies, TaskOutputs};
use crate::tracked::TrackedTaskDefinition;

/// Deprecated prefix marking an environment variable
pub const ENV_PIPELINE_DELIMITER: char = '$';

/// Prefix marking a dependency on upstream workspaces
pub const TOPOLOGICAL_PIPELINE_DELIMITER: char = '^';

/// Prefix marking an excluded output glob
pub const OUTPUT_EXCLUSION_PREFIX: char = '!';

/// A task block exactly as written. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTaskDefinition {
    pub outputs: Option<Vec<String>>,
    pub cache: Option<bool>,
    pub depends_on: Option<Vec<String>>,
    pub inputs: Option<Vec<String>>,
    pub output_mode: Option<OutputMode>,
    pub persistent: Option<bool>,
    pub env: Option<Vec<String>>,
    pub pass_through_env: Option<Vec<String>>,
    pub dot_env: Option<Vec<String>>,
}

/// A `dependsOn` list split into its meanings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDependsOn {
    pub dependencies: TaskDependencies,
    /// Variables declared with the deprecated `$` prefix, prefix stripped
    pub env: BTreeSet<String>,
}

/// Classify each `dependsOn` entry by its prefix.
///
/// `^name` is a topological dependency, `$NAME` a deprecated env
/// declaration, anything else a task dependency.
pub fn normalize_depends_on(entries: &[String]) -> Parsed<NormalizedDependsOn> {
    let mut normalized = NormalizedDependsOn::default();
    let mut diagnostics = Diagnostics::new();

    for entry in entries {
        if let Some(var) = entry.strip_prefix(ENV_PIPELINE_DELIMITER) {
            diagnostics.push(Diagnostic::DeprecatedEnvDependency {
                field: "dependsOn".to_string(),
                value: entry.clone(),
            });
            normalized.env.insert(var.to_string());
        } else if let Some(task) = entry.strip_prefix(TOPOLOGICAL_PIPELINE_DELIMITER) {
            normalized.dependencies.topological.insert(task.to_string());
        } else {
            normalized.dependencies.tasks.insert(entry.clone());
        }
    }

    Parsed::new(normalized, diagnostics)
}

/// Split output globs into inclusions and `!`-prefixed exclusions, both sorted
pub fn partition_outputs(globs: &[String]) -> Parsed<TaskOutputs> {
    let mut outputs = TaskOutputs::default();
    let mut diagnostics = Diagnostics::new();

    for glob in globs {
        let (pattern, excluded) = match glob.strip_prefix(OUTPUT_EXCLUSION_PREFIX) {
            Some(pattern) => (pattern, true),
            None => (glob.as_str(), false),
        };
        if is_absolute_path(pattern) {
            diagnostics.push(Diagnostic::AbsolutePath {
                field: "outputs".to_string(),
                value: glob.clone(),
            });
        }
        if excluded {
            outputs.exclusions.push(pattern.to_string());
        } else {
            outputs.inclusions.push(pattern.to_string());
        }
    }

    outputs.sort();
    Parsed::new(outputs, diagnostics)
}

/// Add env vars to `into`, rejecting any that carry the deprecated `$` prefix
pub fn gather_env_vars(
    vars: &[String],
    key: &str,
    into: &mut BTreeSet<String>,
) -> Result<(), TaskError> {
    for value in vars {
        if value.starts_with(ENV_PIPELINE_DELIMITER) {
            return Err(TaskError::InvalidEnvPrefix {
                key: key.to_string(),
                value: value.clone(),
            });
        }
        into.insert(value.clone());
    }
    Ok(())
}

/// Validate `.env` paths, keeping declared order
pub fn check_dot_env(entries: &[String], key: &str) -> Result<Vec<AnchoredUnixPath>, TaskError> {
    entries
        .iter()
        .map(|entry| {
            AnchoredUnixPath::new(entry).map_err(|source| TaskError::InvalidPath {
                key: key.to_string(),
                source,
            })
        })
        .collect()
}

fn warn_absolute(field: &str, values: &[String], diagnostics: &mut Diagnostics) {
    for value in values.iter().filter(|v| is_absolute_path(v)) {
        diagnostics.push(Diagnostic::AbsolutePath {
            field: field.to_string(),
            value: value.clone(),
        });
    }
}

/// Convert one raw task block into a tracked definition
pub fn parse_task_definition(raw: RawTaskDefinition) -> Result<Parsed<TrackedTaskDefinition>, TaskError> {
    let mut diagnostics = Diagnostics::new();
    let mut definition = TrackedTaskDefinition::new();

    if let Some(globs) = &raw.outputs {
        let parsed = partition_outputs(globs);
        diagnostics.extend(parsed.diagnostics);
        definition.outputs = Some(parsed.value);
    }

    definition.cache = raw.cache;

    let mut env: Option<BTreeSet<String>> = None;
    if let Some(entries) = &raw.depends_on {
        let parsed = normalize_depends_on(entries);
        diagnostics.extend(parsed.diagnostics);
        if !parsed.value.env.is_empty() {
            env = Some(parsed.value.env);
        }
        definition.depends_on = Some(parsed.value.dependencies);
    }

    if let Some(vars) = &raw.env {
        let into = env.get_or_insert_with(BTreeSet::new);
        gather_env_vars(vars, "env", into)?;
    }
    definition.env = env;

    if let Some(vars) = &raw.pass_through_env {
        let mut pass_through = BTreeSet::new();
        gather_env_vars(vars, "passThroughEnv", &mut pass_through)?;
        definition.pass_through_env = Some(pass_through);
    }

    if let Some(entries) = &raw.dot_env {
        definition.dot_env = Some(check_dot_env(entries, "dotEnv")?);
    }

    if let Some(inputs) = raw.inputs {
        warn_absolute("inputs", &inputs, &mut diagnostics);
        definition.inputs = Some(inputs);
    }

    definition.output_mode = raw.output_mode;
    definition.persistent = raw.persistent;

    Ok(Parsed::new(definition, diagnostics))
}

/// Parse a single task block from JSON text
pub fn parse_task_json(json: &str) -> gantry_core::Result<Parsed<TrackedTaskDefinition>> {
    let raw: RawTaskDefinition = serde_json::from_str(json)?;
    Ok(parse_task_definition(raw)?)
}
