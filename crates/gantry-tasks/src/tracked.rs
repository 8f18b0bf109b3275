//! Task definitions that remember which fields were written down
//!
//! Every field is optional: `None` means the key was absent from the source,
//! `Some` means it was present, even if its value equals the default. Merging
//! relies on this to tell "not mentioned" apart from "explicitly reset".

use std::collections::BTreeSet;

use gantry_core::AnchoredUnixPath;
use serde::Serialize;

use crate::merge::merge_task_definitions;
use crate::serialize::PristineTaskDefinition;
use crate::task::{FieldId, OutputMode, ResolvedTaskDefinition, TaskDependencies, TaskOutputs};

/// Fields that are not yet part of the stable schema.
///
/// Empty today. Anything added here is excluded from stable hashes until it
/// is explicitly set on a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskExperiments {}

impl TaskExperiments {
    pub fn defined_fields(&self) -> BTreeSet<&'static str> {
        BTreeSet::new()
    }
}

/// A task definition as parsed from one configuration source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedTaskDefinition {
    pub outputs: Option<TaskOutputs>,
    pub cache: Option<bool>,
    pub depends_on: Option<TaskDependencies>,
    pub inputs: Option<Vec<String>>,
    pub output_mode: Option<OutputMode>,
    pub persistent: Option<bool>,
    pub env: Option<BTreeSet<String>>,
    pub pass_through_env: Option<BTreeSet<String>>,
    pub dot_env: Option<Vec<AnchoredUnixPath>>,
    pub experimental: TaskExperiments,
}

impl TrackedTaskDefinition {
    /// Create a definition with no fields declared
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `cache`
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Declare `outputs`
    pub fn with_outputs(mut self, outputs: TaskOutputs) -> Self {
        self.outputs = Some(outputs);
        self
    }

    /// Declare `dependsOn`
    pub fn with_depends_on(mut self, depends_on: TaskDependencies) -> Self {
        self.depends_on = Some(depends_on);
        self
    }

    /// Declare `persistent`
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = Some(persistent);
        self
    }

    /// Declare `env`
    pub fn with_env<I, S>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env = Some(env.into_iter().map(Into::into).collect());
        self
    }

    /// Whether the field was present in the source
    pub fn has_field(&self, field: FieldId) -> bool {
        match field {
            FieldId::Outputs => self.outputs.is_some(),
            FieldId::Cache => self.cache.is_some(),
            FieldId::DependsOn => self.depends_on.is_some(),
            FieldId::Inputs => self.inputs.is_some(),
            FieldId::OutputMode => self.output_mode.is_some(),
            FieldId::Persistent => self.persistent.is_some(),
            FieldId::Env => self.env.is_some(),
            FieldId::PassThroughEnv => self.pass_through_env.is_some(),
            FieldId::DotEnv => self.dot_env.is_some(),
        }
    }

    /// Stable-schema fields present in the source
    pub fn defined_fields(&self) -> BTreeSet<FieldId> {
        FieldId::ALL
            .into_iter()
            .filter(|field| self.has_field(*field))
            .collect()
    }

    /// Experimental fields present in the source
    pub fn experimental_fields(&self) -> BTreeSet<&'static str> {
        self.experimental.defined_fields()
    }

    pub fn has_experimental_fields(&self) -> bool {
        !self.experimental_fields().is_empty()
    }

    /// This definition alone, with defaults filled in for absent fields
    pub fn resolve(&self) -> ResolvedTaskDefinition {
        merge_task_definitions([self])
    }

    /// Canonical form used for hashing and printing
    pub fn to_pristine(&self) -> PristineTaskDefinition {
        if self.has_experimental_fields() {
            PristineTaskDefinition::WithExperiments {
                definition: self.resolve(),
                experimental: self.experimental.clone(),
            }
        } else {
            PristineTaskDefinition::Stable(self.resolve())
        }
    }
}

impl From<&ResolvedTaskDefinition> for TrackedTaskDefinition {
    /// Treat every field of a resolved definition as declared
    fn from(resolved: &ResolvedTaskDefinition) -> Self {
        Self {
            outputs: Some(resolved.outputs.clone()),
            cache: Some(resolved.cache),
            depends_on: Some(resolved.dependencies()),
            inputs: Some(resolved.inputs.clone()),
            output_mode: Some(resolved.output_mode),
            persistent: Some(resolved.persistent),
            env: Some(resolved.env.clone()),
            pass_through_env: resolved.pass_through_env.clone(),
            dot_env: Some(resolved.dot_env.clone()),
            experimental: TaskExperiments::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_definition_has_no_fields() {
        let def = TrackedTaskDefinition::new();
        assert!(def.defined_fields().is_empty());
        assert!(!def.has_experimental_fields());
    }

    #[test]
    fn test_defined_fields_follow_options() {
        let def = TrackedTaskDefinition::new()
            .with_cache(false)
            .with_env(Vec::<String>::new());
        let fields = def.defined_fields();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&FieldId::Cache));
        assert!(fields.contains(&FieldId::Env));
        assert!(!def.has_field(FieldId::Outputs));
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let resolved = TrackedTaskDefinition::new().with_persistent(true).resolve();
        assert!(resolved.cache);
        assert!(resolved.persistent);
        assert!(resolved.env.is_empty());
    }

    #[test]
    fn test_to_pristine_is_stable_without_experiments() {
        let def = TrackedTaskDefinition::new().with_cache(false);
        match def.to_pristine() {
            PristineTaskDefinition::Stable(resolved) => assert!(!resolved.cache),
            other => panic!("expected stable pristine definition, got {:?}", other),
        }
    }

    #[test]
    fn test_from_resolved_marks_every_field() {
        let resolved = ResolvedTaskDefinition::default();
        let tracked = TrackedTaskDefinition::from(&resolved);
        // passThroughEnv stays absent when it was never configured
        assert_eq!(tracked.defined_fields().len(), FieldId::ALL.len() - 1);
        assert_eq!(tracked.resolve(), resolved);
    }
}
