//! Prune command

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use gantry_config::{Configuration, CONFIG_FILE};

use super::load_root_config;
use crate::cli::{Cli, OutputFormat};

/// Write the canonical configuration to another directory
#[derive(Debug, Args)]
pub struct PruneCommand {
    /// Directory to write the pruned gantry.json into
    #[arg(short, long)]
    pub out: PathBuf,
}

impl PruneCommand {
    /// Execute the prune command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(out = %self.out.display(), "executing prune command");
        let cwd = std::env::current_dir()?;
        let config = load_root_config(&cwd, cli.single_package)?;
        let path = write_pruned(&config, &self.out)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "path": path.to_string_lossy(),
                    "tasks": config.pipeline.len(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!(
                        "{} Wrote {} task(s) to {}",
                        style("✓").green().bold(),
                        config.pipeline.len(),
                        style(path.display()).cyan()
                    );
                }
            }
        }

        Ok(())
    }
}

/// Write the canonical configuration into `out_dir`, returning the file path
pub(crate) fn write_pruned(config: &Configuration, out_dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let path = out_dir.join(CONFIG_FILE);
    std::fs::write(&path, config.to_pretty_string()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
