//! package.json handling
//!
//! Only the parts of the manifest that feed pipeline configuration are
//! modelled; everything else is preserved in `other`.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};

/// Manifest file name
pub const MANIFEST_FILE: &str = "package.json";

/// Key under which older manifests declared an inline pipeline
pub const LEGACY_CONFIG_KEY: &str = "gantry";

/// package.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageJson {
    /// Package name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Package version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Scripts, keyed by script name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scripts: BTreeMap<String, String>,

    /// Inline pipeline block from before the configuration file existed
    #[serde(rename = "gantry", skip_serializing_if = "Option::is_none")]
    pub legacy_config: Option<serde_json::Value>,

    /// Preserve other fields
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

impl PackageJson {
    /// Load package.json from path
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading manifest");
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        serde_json::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Load package.json from a directory, falling back to an empty manifest if absent
    pub fn load_from_dir_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(MANIFEST_FILE);
        if !path.exists() {
            debug!(dir = %dir.display(), "no manifest found, using empty manifest");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Build a manifest from script names and commands
    pub fn with_scripts<I, K, V>(scripts: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Script names in sorted order
    pub fn script_names(&self) -> impl Iterator<Item = &str> {
        self.scripts.keys().map(String::as_str)
    }
}
