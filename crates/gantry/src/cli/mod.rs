//! CLI definition and command handling

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

use commands::{
    ConfigCommand, HashCommand, InitCommand, PruneCommand, ResolveCommand, ValidateCommand,
};

/// Gantry - Task pipeline configuration for monorepos
#[derive(Debug, Parser)]
#[command(name = "gantry")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<std::path::PathBuf>,

    /// Treat the repository as a single package, synthesizing tasks from package.json scripts
    #[arg(long, global = true, env = "GANTRY_SINGLE_PACKAGE")]
    pub single_package: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Write a starter gantry.json
    Init(InitCommand),

    /// Print the merged definition of a task
    Resolve(ResolveCommand),

    /// Print the cache-key hash of a task definition
    Hash(HashCommand),

    /// Print the canonical form of the root configuration
    Config(ConfigCommand),

    /// Write the canonical configuration to another directory
    Prune(PruneCommand),

    /// Validate root and workspace configurations
    Validate(ValidateCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Resolve(ref cmd) => cmd.execute(&self),
            Commands::Hash(ref cmd) => cmd.execute(&self),
            Commands::Config(ref cmd) => cmd.execute(&self),
            Commands::Prune(ref cmd) => cmd.execute(&self),
            Commands::Validate(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resolve() {
        let cli = Cli::try_parse_from([
            "gantry",
            "--format",
            "json",
            "resolve",
            "build",
            "--package",
            "web",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.single_package);
        match cli.command {
            Commands::Resolve(cmd) => {
                assert_eq!(cmd.task.task, "build");
                assert_eq!(cmd.task.package.as_deref(), Some("web"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["gantry", "config", "--single-package", "-q"]).unwrap();
        assert!(cli.single_package);
        assert!(cli.quiet);
    }

    #[test]
    fn test_prune_requires_out() {
        assert!(Cli::try_parse_from(["gantry", "prune"]).is_err());
    }
}
