//! Pipelines: task identifiers mapped to tracked definitions

use std::collections::BTreeMap;

use gantry_core::TaskError;
use serde::{Serialize, Serializer};

use crate::serialize::PristineTaskDefinition;
use crate::task::{strip_package_name, ResolvedTaskDefinition, TaskId};
use crate::tracked::TrackedTaskDefinition;

/// Task definitions from one configuration source, keyed by task id
/// (`build` or `web#build`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pipeline(BTreeMap<String, TrackedTaskDefinition>);

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a definition
    pub fn insert(&mut self, task_id: impl Into<String>, definition: TrackedTaskDefinition) {
        self.0.insert(task_id.into(), definition);
    }

    pub fn get(&self, task_id: &str) -> Option<&TrackedTaskDefinition> {
        self.0.get(task_id)
    }

    pub fn contains_key(&self, task_id: &str) -> bool {
        self.0.contains_key(task_id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TrackedTaskDefinition)> {
        self.0.iter().map(|(id, def)| (id.as_str(), def))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Find the definition for a task.
    ///
    /// The package-qualified `task_id` wins; otherwise the bare `task_name`
    /// serves every package that does not override it.
    pub fn lookup(&self, task_id: &str, task_name: &str) -> Result<&TrackedTaskDefinition, TaskError> {
        self.0
            .get(task_id)
            .or_else(|| self.0.get(task_name))
            .ok_or_else(|| TaskError::TaskNotFound(task_id.to_string()))
    }

    /// Look up by a parsed task id, falling back to its bare task name
    pub fn lookup_id(&self, id: &TaskId) -> Result<&TrackedTaskDefinition, TaskError> {
        self.lookup(&id.to_string(), id.task())
    }

    /// Whether the task is declared, either bare or for some package
    pub fn has_task(&self, task_name: &str) -> bool {
        self.0.keys().any(|key| {
            key == task_name || (TaskId::parse(key).is_package_task() && strip_package_name(key) == task_name)
        })
    }

    /// Defaults-filled view of one entry, falling back to the task
    /// portion of the id
    pub fn get_task_definition(&self, task_id: &str) -> Option<ResolvedTaskDefinition> {
        self.0
            .get(task_id)
            .or_else(|| self.0.get(strip_package_name(task_id)))
            .map(TrackedTaskDefinition::resolve)
    }

    /// Canonical view of every entry, used for printing and pruning
    pub fn to_pristine(&self) -> BTreeMap<String, PristineTaskDefinition> {
        self.0
            .iter()
            .map(|(id, def)| (id.clone(), def.to_pristine()))
            .collect()
    }
}

impl FromIterator<(String, TrackedTaskDefinition)> for Pipeline {
    fn from_iter<I: IntoIterator<Item = (String, TrackedTaskDefinition)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Pipeline {
    type Item = (String, TrackedTaskDefinition);
    type IntoIter = std::collections::btree_map::IntoIter<String, TrackedTaskDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl Serialize for Pipeline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_pristine().serialize(serializer)
    }
}
