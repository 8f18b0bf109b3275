//! Config command

use clap::Args;
use tracing::info;

use super::load_root_config;
use crate::cli::Cli;

/// Print the canonical form of the root configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    /// Print a single task's defaults-filled definition instead
    #[arg(long)]
    pub task: Option<String>,
}

impl ConfigCommand {
    /// Execute the config command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(task = ?self.task, "executing config command");
        let cwd = std::env::current_dir()?;
        let config = load_root_config(&cwd, cli.single_package)?;

        match &self.task {
            Some(task_id) => {
                let definition = config
                    .pipeline
                    .get_task_definition(task_id)
                    .ok_or_else(|| anyhow::anyhow!("Task {} is not declared in the pipeline", task_id))?;
                println!("{}", serde_json::to_string_pretty(&definition)?);
            }
            None => println!("{}", config.to_pretty_string()?),
        }

        Ok(())
    }
}
