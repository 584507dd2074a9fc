use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use dbnav_core::config::{default_log_path, AppConfig, ConfigError};
use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open log file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("invalid log filter `{directives}`: {source}")]
    Filter {
        directives: String,
        source: ParseError,
    },
    #[error("failed to install log subscriber: {0}")]
    Install(Box<dyn std::error::Error + Send + Sync>),
}

/// Picks the log destination: command line first, then the config file, then
/// `<config dir>/dbnav/dbnav.log`.
pub fn resolve_log_path(
    cli_override: Option<&Path>,
    config: &AppConfig,
) -> Result<PathBuf, LoggingError> {
    if let Some(path) = cli_override {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = &config.log_file {
        return Ok(path.clone());
    }
    Ok(default_log_path()?)
}

/// `RUST_LOG` wins over the configured level when it is set and non-empty.
pub fn build_filter(env_directives: Option<&str>, level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = env_directives
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(level);
    EnvFilter::try_new(directives).map_err(|source| LoggingError::Filter {
        directives: directives.to_string(),
        source,
    })
}

/// Installs the global subscriber writing to `path`. The terminal is owned by
/// the UI, so nothing is logged to stdout or stderr.
///
/// The returned guard flushes pending records on drop and must outlive the
/// frame loop.
pub fn init_logging(level: &str, path: &Path) -> Result<WorkerGuard, LoggingError> {
    let open_error = |source: io::Error| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_error)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)?;

    let env_directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(env_directives.as_deref(), level)?;

    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        .with_level(true)
        .with_ansi(false)
        .try_init()
        .map_err(LoggingError::Install)?;

    Ok(guard)
}
