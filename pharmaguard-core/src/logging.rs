//! `tracing` subscriber setup shared by the CLI and the TUI.
//!
//! The CLI logs to stderr. The TUI owns the terminal, so it logs to a file.
//! In both cases `PHARMAGUARD_LOG` takes precedence over the configured filter.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_ENV: &str = "PHARMAGUARD_LOG";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter {filter:?}: {reason}")]
    Filter { filter: String, reason: String },

    #[error("cannot open log file {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("logging already initialized: {0}")]
    Init(String),
}

/// Filter from `PHARMAGUARD_LOG`, else `fallback`.
pub fn env_filter(fallback: &str) -> Result<EnvFilter, LoggingError> {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(fallback))
        .map_err(|e| LoggingError::Filter {
            filter: fallback.to_string(),
            reason: e.to_string(),
        })
}

/// Human-readable logs on stderr.
pub fn init_stderr(fallback: &str) -> Result<(), LoggingError> {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter(fallback)?)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

/// `{data_dir}/pharmaguard/tui.log`.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("pharmaguard").join("tui.log"))
}

/// Append-mode file logs without ANSI colours.
pub fn init_file(path: &Path, fallback: &str) -> Result<(), LoggingError> {
    let file = open_log(path)?;
    let layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(file));
    tracing_subscriber::registry()
        .with(env_filter(fallback)?)
        .with(layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))
}

fn open_log(path: &Path) -> Result<File, LoggingError> {
    let err = |source| LoggingError::File {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(err)?;
    }
    OpenOptions::new().create(true).append(true).open(path).map_err(err)
}
