//! CLI commands

mod config;
mod hash;
mod init;
mod prune;
mod resolve;
mod validate;

pub use config::ConfigCommand;
pub use hash::HashCommand;
pub use init::InitCommand;
pub use prune::PruneCommand;
pub use resolve::ResolveCommand;
pub use validate::ValidateCommand;

use std::path::Path;

use anyhow::Context;
use gantry_config::{load_or_synthesize, Configuration};
use gantry_core::PackageJson;

/// Load the configuration at the repository root
pub(crate) fn load_root_config(dir: &Path, single_package: bool) -> anyhow::Result<Configuration> {
    let manifest = PackageJson::load_from_dir_or_default(dir)
        .with_context(|| format!("Failed to read manifest in {}", dir.display()))?;
    let config = load_or_synthesize(dir, &manifest, single_package)?;
    Ok(config)
}
