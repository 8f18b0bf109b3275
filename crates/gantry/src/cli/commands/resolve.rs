//! Resolve command

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use gantry_config::{read_config, resolve_task, Configuration, CONFIG_FILE};
use gantry_tasks::{ResolvedTaskDefinition, TaskId};

use super::load_root_config;
use crate::cli::{Cli, OutputFormat};

/// Which task to resolve, and where
#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task name, or `package#task`
    pub task: String,

    /// Package the task runs in
    #[arg(short, long)]
    pub package: Option<String>,

    /// Workspace directory whose gantry.json extends the root configuration
    #[arg(short, long)]
    pub workspace_dir: Option<PathBuf>,
}

impl TaskArgs {
    /// The task id to look up, package-qualified when a package is known
    pub fn task_id(&self) -> TaskId {
        match &self.package {
            Some(package) => TaskId::new(package.clone(), TaskId::parse(&self.task).task()),
            None => TaskId::parse(&self.task),
        }
    }

    /// Merge the task's definitions from the root and workspace configurations
    pub fn resolve(&self, cli: &Cli) -> anyhow::Result<ResolvedTaskDefinition> {
        let root_dir = std::env::current_dir()?;
        let mut chain = vec![load_root_config(&root_dir, cli.single_package)?];

        if let Some(dir) = &self.workspace_dir {
            let path = root_dir.join(dir).join(CONFIG_FILE);
            match read_config(&path)? {
                Some(parsed) => chain.push(parsed.into_logged()),
                None => debug!(path = %path.display(), "workspace has no configuration"),
            }
        }

        resolve_in_chain(&chain, &self.task_id())
    }
}

pub(crate) fn resolve_in_chain(
    chain: &[Configuration],
    task_id: &TaskId,
) -> anyhow::Result<ResolvedTaskDefinition> {
    let id = task_id.to_string();
    let resolved = resolve_task(chain, &id, task_id.task())
        .with_context(|| format!("Failed to resolve {}", id))?;
    Ok(resolved)
}

/// Print the merged definition of a task
#[derive(Debug, Args)]
pub struct ResolveCommand {
    #[command(flatten)]
    pub task: TaskArgs,
}

impl ResolveCommand {
    /// Execute the resolve command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(task = %self.task.task, package = ?self.task.package, "executing resolve command");
        let resolved = self.task.resolve(cli)?;
        let json = serde_json::to_string_pretty(&resolved)?;

        match cli.format {
            OutputFormat::Json => println!("{}", json),
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", style(self.task.task_id()).bold());
                }
                println!("{}", json);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config(text: &str) -> Configuration {
        Configuration::from_jsonc(text, Path::new(CONFIG_FILE)).unwrap().value
    }

    #[test]
    fn test_task_id_from_args() {
        let args = TaskArgs {
            task: "build".to_string(),
            package: Some("web".to_string()),
            workspace_dir: None,
        };
        assert_eq!(args.task_id().to_string(), "web#build");

        let args = TaskArgs {
            task: "docs#build".to_string(),
            package: None,
            workspace_dir: None,
        };
        assert_eq!(args.task_id(), TaskId::new("docs", "build"));
    }

    #[test]
    fn test_resolve_in_chain() {
        let chain = vec![
            config(r#"{"pipeline": {"build": {"outputs": ["dist/**"]}}}"#),
            config(r#"{"extends": ["//"], "pipeline": {"build": {"cache": false}}}"#),
        ];
        let resolved = resolve_in_chain(&chain, &TaskId::new("web", "build")).unwrap();
        assert!(!resolved.cache);
        assert_eq!(resolved.outputs.inclusions, vec!["dist/**"]);

        let err = resolve_in_chain(&chain, &TaskId::bare("lint")).unwrap_err();
        assert!(err.to_string().contains("lint"));
    }
}
