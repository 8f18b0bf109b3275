//! Validate command

use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use gantry_config::{
    config_path, load_or_synthesize_with_diagnostics, read_config, validate, WORKSPACE_VALIDATIONS,
};
use gantry_core::PackageJson;

use crate::cli::output;
use crate::cli::{Cli, OutputFormat};
use crate::exit_codes;

/// Validate root and workspace configurations
#[derive(Debug, Args)]
pub struct ValidateCommand {
    /// Workspace directories whose configuration should be checked
    #[arg(short, long = "workspace")]
    pub workspaces: Vec<PathBuf>,

    /// Strict mode - treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

/// Problems found across the checked configurations
#[derive(Debug, Default)]
pub(crate) struct Report {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidateCommand {
    /// Execute the validate command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(
            workspaces = self.workspaces.len(),
            strict = self.strict,
            "executing validate command"
        );
        let cwd = std::env::current_dir()?;

        let mut report = match PackageJson::load_from_dir_or_default(&cwd) {
            Ok(manifest) => check_root(&cwd, &manifest, cli.single_package),
            Err(e) => Report {
                errors: vec![format!("Manifest: {}", e)],
                warnings: Vec::new(),
            },
        };
        let root_failed = !report.errors.is_empty();

        for workspace in &self.workspaces {
            check_workspace(&cwd.join(workspace), &mut report);
        }

        if self.strict {
            let mut warnings = std::mem::take(&mut report.warnings);
            report.errors.append(&mut warnings);
        }

        let passed = report.errors.is_empty();

        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "valid": passed,
                    "config_path": config_path(&cwd).to_string_lossy(),
                    "errors": report.errors,
                    "warnings": report.warnings,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    print_report(&cwd, &report, passed);
                }
            }
        }

        if root_failed {
            std::process::exit(exit_codes::CONFIG_ERROR);
        }
        if !passed {
            std::process::exit(exit_codes::VALIDATION_ERROR);
        }

        Ok(())
    }
}

pub(crate) fn check_root(dir: &Path, manifest: &PackageJson, single_package: bool) -> Report {
    let mut report = Report::default();
    match load_or_synthesize_with_diagnostics(dir, manifest, single_package) {
        Ok(parsed) => {
            report
                .warnings
                .extend(parsed.diagnostics.iter().map(|d| format!("{}: {}", CONFIG_LABEL, d)));
        }
        Err(e) => report.errors.push(format!("{}: {}", CONFIG_LABEL, e)),
    }
    report
}

pub(crate) fn check_workspace(dir: &Path, report: &mut Report) {
    let path = config_path(dir);
    let label = path.display().to_string();

    match read_config(&path) {
        Ok(Some(parsed)) => {
            report
                .warnings
                .extend(parsed.diagnostics.iter().map(|d| format!("{}: {}", label, d)));
            report.errors.extend(
                validate(&parsed.value, WORKSPACE_VALIDATIONS)
                    .into_iter()
                    .map(|e| format!("{}: {}", label, e)),
            );
        }
        Ok(None) => report
            .warnings
            .push(format!("{}: no configuration, root definitions apply", label)),
        Err(e) => report.errors.push(format!("{}: {}", label, e)),
    }
}

const CONFIG_LABEL: &str = "Configuration";

fn print_report(dir: &Path, report: &Report, passed: bool) {
    println!("{}", output::header("Validation Results"));
    println!();
    println!("Config: {}", output::path_style().apply_to(config_path(dir).display()));
    println!();

    if !report.errors.is_empty() {
        println!("{}", style("Errors:").red().bold());
        for error in &report.errors {
            println!("  {} {}", style("✗").red(), error);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("{}", style("Warnings:").yellow().bold());
        for warning in &report.warnings {
            println!("  {} {}", style("!").yellow(), warning);
        }
        println!();
    }

    if passed {
        if report.warnings.is_empty() {
            output::success("All checks passed");
        } else {
            output::success(&format!(
                "Validation passed with {} warning(s)",
                report.warnings.len()
            ));
        }
    } else {
        output::error(&format!(
            "Validation failed with {} error(s)",
            report.errors.len()
        ));
    }
}

#[cfg(test)]
mod tests {
    use gantry_config::CONFIG_FILE;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_root_diagnostics_become_warnings() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"pipeline": {"build": {"dependsOn": ["$TOKEN"], "outputs": ["/abs/**"]}}}"#,
        )
        .unwrap();

        let report = check_root(temp.path(), &PackageJson::default(), false);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_missing_root_config_is_error() {
        let temp = TempDir::new().unwrap();
        let report = check_root(temp.path(), &PackageJson::default(), false);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("Could not find"));

        let report = check_root(temp.path(), &PackageJson::default(), true);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_workspace_validations() {
        let temp = TempDir::new().unwrap();
        let web = temp.path().join("apps/web");
        std::fs::create_dir_all(&web).unwrap();
        std::fs::write(
            web.join(CONFIG_FILE),
            r#"{"extends": ["//"], "pipeline": {"docs#build": {}}}"#,
        )
        .unwrap();

        let mut report = Report::default();
        check_workspace(&web, &mut report);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("docs#build"));

        let mut report = Report::default();
        check_workspace(&temp.path().join("apps/api"), &mut report);
        assert!(report.errors.is_empty());
        assert_eq!(report.warnings.len(), 1);
    }
}
