//! Logging configuration using the tracing ecosystem.
//!
//! The library itself only emits `tracing` events and spans. These helpers
//! install a subscriber for applications and tests that have none.

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Default log level if RUST_LOG is not set.
const DEFAULT_LOG_FILTER: &str = "jirakit=info,warn";

const LOG_FILE_NAME: &str = "jirakit.log";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Log to stderr.
///
/// The level is read from `RUST_LOG`, e.g. `RUST_LOG=jirakit=debug` to see
/// every request and how its response was classified.
///
/// # Errors
///
/// Returns an error if a global subscriber is already set.
///
/// ```no_run
/// jirakit::logging::init().expect("Failed to initialize logging");
/// ```
pub fn init() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber)?;
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "jirakit logging to stderr");

    Ok(())
}

/// Log to a daily rotating `jirakit.log`.
///
/// Uses `dir` when given, otherwise [`log_directory`]. The directory is
/// created if missing.
///
/// # Errors
///
/// Returns an error if the log directory cannot be determined or created, or
/// a global subscriber is already set.
pub fn init_file(dir: Option<&Path>) -> anyhow::Result<()> {
    let log_dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => get_log_directory()?,
    };
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_NAME);

    let subscriber = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(env_filter());

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "jirakit logging started");
    tracing::debug!(log_dir = %log_dir.display(), "Log directory");

    Ok(())
}

/// Get the log directory path.
///
/// Returns the platform-specific local data directory with `jirakit/logs` appended.
fn get_log_directory() -> anyhow::Result<PathBuf> {
    let base_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(base_dir.join("jirakit").join("logs"))
}

/// The default directory for [`init_file`].
pub fn log_directory() -> Option<PathBuf> {
    get_log_directory().ok()
}
