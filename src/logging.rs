//! Tracing subscriber setup.

use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_PREFIX: &str = "gitdesk.log";

fn filter(level: Level) -> EnvFilter {
    EnvFilter::from_default_env().add_directive(level.into())
}

/// Install the global subscriber.
///
/// With a log directory, output goes to a daily-rolling file and the returned
/// guard must be kept alive until exit so buffered lines are flushed. Without
/// one, warnings and errors go to stderr.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let level = if verbose { Level::DEBUG } else { Level::INFO };

            tracing_subscriber::fmt()
                .with_writer(writer)
                .with_ansi(false)
                .with_env_filter(filter(level))
                .try_init()
                .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;

            tracing::info!("Logging initialized (verbose: {})", verbose);
            Ok(Some(guard))
        }
        None => {
            // Shares stderr with the progress bar.
            let level = if verbose { Level::DEBUG } else { Level::WARN };
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_env_filter(filter(level))
                .try_init()
                .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))?;
            Ok(None)
        }
    }
}
