//! Gantry - Task pipeline configuration CLI

mod cli;
mod exit_codes;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(console_level(cli.verbose, cli.quiet));

    cli.execute()
}

/// Console level when RUST_LOG is not set
fn console_level(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Set up tracing with two layers:
/// - Console: controlled by RUST_LOG (default: warn, or debug with --verbose)
/// - File: always debug-level JSON to ~/.gantry/logs/
fn init_tracing(default_level: &str) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if let Some(log_dir) = log_directory() {
        let file_appender = tracing_appender::rolling::daily(&log_dir, "gantry.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_filter(console_filter),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(non_blocking)
                    .with_target(true)
                    .with_filter(EnvFilter::new("debug")),
            )
            .init();

        return Some(guard);
    }

    // Console only when there is no home directory
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    None
}

fn log_directory() -> Option<std::path::PathBuf> {
    let log_dir = dirs::home_dir()?.join(".gantry").join("logs");
    std::fs::create_dir_all(&log_dir).ok()?;
    Some(log_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_level_follows_flags() {
        assert_eq!(console_level(false, false), "warn");
        assert_eq!(console_level(true, false), "debug");
        assert_eq!(console_level(false, true), "error");
        assert_eq!(console_level(true, true), "debug");
    }

    #[test]
    fn test_verbose_flag_raises_console_level() {
        let cli = Cli::try_parse_from(["gantry", "config", "--verbose"]).unwrap();
        assert_eq!(console_level(cli.verbose, cli.quiet), "debug");
    }
}
