//! Canonical JSON form of task definitions
//!
//! The output is deterministic regardless of how the source was written:
//! every stable field is always present, sets come out sorted, and only
//! `dotEnv` and `inputs` keep their declared order. Hashes are computed
//! over this form, so changing it invalidates every cache.

use std::collections::BTreeSet;

use gantry_core::AnchoredUnixPath;
use serde::{Serialize, Serializer};

use crate::task::{OutputMode, ResolvedTaskDefinition};
use crate::tracked::TaskExperiments;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RawTaskWithDefaults<'a> {
    outputs: Vec<String>,
    cache: bool,
    depends_on: Vec<String>,
    inputs: &'a [String],
    output_mode: OutputMode,
    persistent: bool,
    env: &'a BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pass_through_env: Option<&'a BTreeSet<String>>,
    dot_env: &'a [AnchoredUnixPath],
}

impl<'a> From<&'a ResolvedTaskDefinition> for RawTaskWithDefaults<'a> {
    fn from(def: &'a ResolvedTaskDefinition) -> Self {
        Self {
            outputs: def.outputs.to_globs(),
            cache: def.cache,
            depends_on: def.dependencies().to_depends_on(),
            inputs: &def.inputs,
            output_mode: def.output_mode,
            persistent: def.persistent,
            env: &def.env,
            pass_through_env: def.pass_through_env.as_ref(),
            dot_env: &def.dot_env,
        }
    }
}

impl Serialize for ResolvedTaskDefinition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RawTaskWithDefaults::from(self).serialize(serializer)
    }
}

impl ResolvedTaskDefinition {
    /// Canonical JSON object
    pub fn to_json(&self) -> gantry_core::Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Canonical JSON text, the input to task hashing
    pub fn to_canonical_string(&self) -> gantry_core::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// The printable, hashable view of one pipeline entry.
///
/// Experimental fields only appear when a task sets one, so introducing a
/// new experimental field never shifts the hash of existing tasks.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PristineTaskDefinition {
    /// Stable-schema fields only
    Stable(ResolvedTaskDefinition),
    /// Stable fields plus the experimental ones
    WithExperiments {
        #[serde(flatten)]
        definition: ResolvedTaskDefinition,
        #[serde(flatten)]
        experimental: TaskExperiments,
    },
}

impl PristineTaskDefinition {
    /// The stable part of the definition
    pub fn definition(&self) -> &ResolvedTaskDefinition {
        match self {
            Self::Stable(definition) => definition,
            Self::WithExperiments { definition, .. } => definition,
        }
    }
}
