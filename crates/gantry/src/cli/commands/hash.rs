//! Hash command

use clap::Args;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use gantry_tasks::ResolvedTaskDefinition;

use super::resolve::TaskArgs;
use crate::cli::{Cli, OutputFormat};

/// Print the cache-key hash of a task definition
#[derive(Debug, Args)]
pub struct HashCommand {
    #[command(flatten)]
    pub task: TaskArgs,
}

impl HashCommand {
    /// Execute the hash command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(task = %self.task.task, package = ?self.task.package, "executing hash command");
        let resolved = self.task.resolve(cli)?;
        let hash = definition_hash(&resolved)?;

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "task": self.task.task_id().to_string(),
                    "hash": hash,
                    "definition": resolved.to_json()?,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => println!("{}", hash),
        }

        Ok(())
    }
}

/// SHA-256 of the canonical JSON form of a resolved definition
pub fn definition_hash(definition: &ResolvedTaskDefinition) -> anyhow::Result<String> {
    let canonical = definition.to_canonical_string()?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let hash = format!("{:x}", hasher.finalize());
    debug!(hash = %hash, "computed definition hash");
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use gantry_tasks::{merge_task_definitions, parse_task_json};

    use super::*;

    fn resolved(json: &str) -> ResolvedTaskDefinition {
        let tracked = parse_task_json(json).unwrap().value;
        merge_task_definitions([&tracked])
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = definition_hash(&ResolvedTaskDefinition::default()).unwrap();
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_ignores_declaration_order() {
        let a = resolved(r#"{"dependsOn": ["^build", "lint", "codegen"], "env": ["B", "A"]}"#);
        let b = resolved(r#"{"env": ["A", "B"], "dependsOn": ["codegen", "^build", "lint"]}"#);
        assert_eq!(definition_hash(&a).unwrap(), definition_hash(&b).unwrap());
    }

    #[test]
    fn test_hash_changes_with_definition() {
        let cached = resolved(r#"{"cache": true}"#);
        let uncached = resolved(r#"{"cache": false}"#);
        assert_ne!(definition_hash(&cached).unwrap(), definition_hash(&uncached).unwrap());
    }

    #[test]
    fn test_hash_respects_dot_env_order() {
        let a = resolved(r#"{"dotEnv": [".env.local", ".env"]}"#);
        let b = resolved(r#"{"dotEnv": [".env", ".env.local"]}"#);
        assert_ne!(definition_hash(&a).unwrap(), definition_hash(&b).unwrap());
    }
}
