//! Resolving a task across an extends chain

use gantry_core::TaskError;
use gantry_tasks::{merge_task_definitions, ResolvedTaskDefinition, TrackedTaskDefinition};
use tracing::debug;

use super::types::Configuration;

/// Look the task up in every configuration of an ordered chain (most general
/// first), skipping configurations that do not declare it.
///
/// Fails with [`TaskError::TaskNotFound`] only when no configuration does.
pub fn collect_task_definitions<'a, I>(
    chain: I,
    task_id: &str,
    task_name: &str,
) -> Result<Vec<&'a TrackedTaskDefinition>, TaskError>
where
    I: IntoIterator<Item = &'a Configuration>,
{
    let definitions: Vec<_> = chain
        .into_iter()
        .filter_map(|config| config.pipeline.lookup(task_id, task_name).ok())
        .collect();

    if definitions.is_empty() {
        return Err(TaskError::TaskNotFound(task_id.to_string()));
    }

    debug!(task_id, sources = definitions.len(), "collected task definitions");
    Ok(definitions)
}

/// Collect and merge a task's definitions along the chain
pub fn resolve_task<'a, I>(
    chain: I,
    task_id: &str,
    task_name: &str,
) -> Result<ResolvedTaskDefinition, TaskError>
where
    I: IntoIterator<Item = &'a Configuration>,
{
    let definitions = collect_task_definitions(chain, task_id, task_name)?;
    Ok(merge_task_definitions(definitions))
}
