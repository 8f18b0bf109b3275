//! Merging task definitions along an extends chain

use tracing::trace;

use crate::task::ResolvedTaskDefinition;
use crate::tracked::TrackedTaskDefinition;

/// Merge definitions ordered from least to most specific into one resolved definition.
///
/// Starts from the defaults (`cache` is `true`) and, for each definition in
/// turn, overwrites only the fields that definition declared. A later
/// definition that never mentions a field leaves the earlier value alone.
/// An empty input yields the defaults.
pub fn merge_task_definitions<'a, I>(definitions: I) -> ResolvedTaskDefinition
where
    I: IntoIterator<Item = &'a TrackedTaskDefinition>,
{
    let mut merged = ResolvedTaskDefinition::default();

    for (index, definition) in definitions.into_iter().enumerate() {
        trace!(index, fields = ?definition.defined_fields(), "merging task definition");

        if let Some(outputs) = &definition.outputs {
            merged.outputs = outputs.clone();
        }
        if let Some(cache) = definition.cache {
            merged.cache = cache;
        }
        if let Some(depends_on) = &definition.depends_on {
            merged.task_dependencies = depends_on.tasks.clone();
            merged.topological_dependencies = depends_on.topological.clone();
        }
        if let Some(inputs) = &definition.inputs {
            merged.inputs = inputs.clone();
        }
        if let Some(output_mode) = definition.output_mode {
            merged.output_mode = output_mode;
        }
        if let Some(persistent) = definition.persistent {
            merged.persistent = persistent;
        }
        if let Some(env) = &definition.env {
            merged.env = env.clone();
        }
        if let Some(pass_through_env) = &definition.pass_through_env {
            merged.pass_through_env = Some(pass_through_env.clone());
        }
        if let Some(dot_env) = &definition.dot_env {
            merged.dot_env = dot_env.clone();
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::task::{OutputMode, TaskDependencies, TaskOutputs};

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn outputs(inclusions: &[&str]) -> TaskOutputs {
        TaskOutputs {
            inclusions: inclusions.iter().map(|s| s.to_string()).collect(),
            exclusions: Vec::new(),
        }
    }

    #[test]
    fn test_empty_merge_yields_defaults() {
        let merged = merge_task_definitions(std::iter::empty());
        assert_eq!(merged, ResolvedTaskDefinition::default());
        assert!(merged.cache);
    }

    #[test]
    fn test_field_scoped_last_writer_wins() {
        let root = TrackedTaskDefinition::new().with_outputs(outputs(&["dist"]));
        let workspace = TrackedTaskDefinition::new().with_cache(false);

        let merged = merge_task_definitions([&root, &workspace]);
        assert_eq!(merged.outputs.inclusions, vec!["dist"]);
        assert!(!merged.cache);
    }

    #[test]
    fn test_undeclared_field_does_not_reset() {
        let root = TrackedTaskDefinition::new().with_cache(false);
        let workspace = TrackedTaskDefinition::new();

        let merged = merge_task_definitions([&root, &workspace]);
        assert!(!merged.cache);
    }

    #[test]
    fn test_explicit_empty_value_overrides() {
        let root = TrackedTaskDefinition::new()
            .with_outputs(outputs(&["dist/**"]))
            .with_env(["API_URL"]);
        let workspace = TrackedTaskDefinition::new()
            .with_outputs(TaskOutputs::default())
            .with_env(Vec::<String>::new());

        let merged = merge_task_definitions([&root, &workspace]);
        assert!(merged.outputs.is_empty());
        assert!(merged.env.is_empty());
    }

    #[test]
    fn test_dependencies_replaced_as_pair() {
        let root = TrackedTaskDefinition::new().with_depends_on(TaskDependencies {
            tasks: set(&["codegen"]),
            topological: set(&["build"]),
        });
        let workspace = TrackedTaskDefinition::new().with_depends_on(TaskDependencies {
            tasks: set(&["lint"]),
            topological: BTreeSet::new(),
        });

        let merged = merge_task_definitions([&root, &workspace]);
        assert_eq!(merged.task_dependencies, set(&["lint"]));
        assert!(merged.topological_dependencies.is_empty());
    }

    #[test]
    fn test_pass_through_env_absent_vs_empty() {
        let root = TrackedTaskDefinition {
            pass_through_env: Some(set(&["AWS_TOKEN"])),
            ..TrackedTaskDefinition::default()
        };
        let untouched = merge_task_definitions([&root, &TrackedTaskDefinition::new()]);
        assert_eq!(untouched.pass_through_env, Some(set(&["AWS_TOKEN"])));

        let cleared = TrackedTaskDefinition {
            pass_through_env: Some(BTreeSet::new()),
            ..TrackedTaskDefinition::default()
        };
        let merged = merge_task_definitions([&root, &cleared]);
        assert_eq!(merged.pass_through_env, Some(BTreeSet::new()));

        assert_eq!(merge_task_definitions([&TrackedTaskDefinition::new()]).pass_through_env, None);
    }

    #[test]
    fn test_three_level_chain() {
        let root = TrackedTaskDefinition {
            output_mode: Some(OutputMode::NewOnly),
            inputs: Some(vec!["src/**".to_string()]),
            ..TrackedTaskDefinition::default()
        }
        .with_cache(false);
        let shared = TrackedTaskDefinition::new().with_cache(true);
        let workspace = TrackedTaskDefinition::new().with_persistent(true);

        let merged = merge_task_definitions([&root, &shared, &workspace]);
        assert!(merged.cache);
        assert!(merged.persistent);
        assert_eq!(merged.output_mode, OutputMode::NewOnly);
        assert_eq!(merged.inputs, vec!["src/**"]);
    }
}
