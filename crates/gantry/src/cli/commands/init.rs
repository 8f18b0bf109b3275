//! Init command

use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use gantry_config::{Configuration, CONFIG_FILE, DEFAULT_CONFIG_TEMPLATE};

use crate::cli::Cli;

/// Write a starter gantry.json
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    pub force: bool,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl InitCommand {
    /// Execute the init command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(force = self.force, "executing init command");
        let cwd = std::env::current_dir()?;
        let config_path = self.output.clone().unwrap_or_else(|| cwd.join(CONFIG_FILE));

        if config_path.exists() && !self.force {
            anyhow::bail!(
                "Configuration file already exists at {}. Use --force to overwrite.",
                config_path.display()
            );
        }

        // The template must stay loadable
        Configuration::from_jsonc(DEFAULT_CONFIG_TEMPLATE, &config_path)?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        if !cli.quiet {
            println!(
                "{} Created configuration at {}",
                style("✓").green().bold(),
                style(config_path.display()).cyan()
            );
            println!();
            println!("Next steps:");
            println!("  1. Edit {} to describe your task pipeline", config_path.display());
            println!("  2. Run {} to verify your setup", style("gantry validate").cyan());
            println!("  3. Run {} to inspect a task", style("gantry resolve build").cyan());
        }

        Ok(())
    }
}
