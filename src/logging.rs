//! File logging for the terminal binary.
//!
//! The UI owns stdout, so tracing output goes to a log file under the user's
//! cache directory. The filter comes from `RUST_LOG` (default `info`).

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LOG_DIR: &str = "fightcard_terminal";
const LOG_FILE: &str = "fightcard_terminal.log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("no cache directory available for logs")]
    NoCacheDir,
    #[error("failed to prepare log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Keep the returned guard alive for the life of the process or buffered
/// lines are lost.
pub fn init() -> Result<WorkerGuard, LoggingError> {
    let dir = log_dir().ok_or(LoggingError::NoCacheDir)?;
    fs::create_dir_all(&dir).map_err(|source| LoggingError::CreateDir {
        path: dir.clone(),
        source,
    })?;

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(&dir, LOG_FILE));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;
    Ok(guard)
}

fn log_dir() -> Option<PathBuf> {
    if let Ok(base) = std::env::var("XDG_CACHE_HOME")
        && !base.trim().is_empty()
    {
        return Some(PathBuf::from(base).join(LOG_DIR));
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(LOG_DIR))
}
