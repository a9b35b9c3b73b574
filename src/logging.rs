//! Tracing setup: structured logs appended to a file, stderr as fallback.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Where log records end up for this run.
#[derive(Debug)]
pub(crate) enum LogDestination {
    /// Appending to the requested log file.
    File(PathBuf),
    /// The log file could not be opened; records go to stderr.
    Stderr {
        /// Path that was requested.
        requested: PathBuf,
        /// Why it could not be opened.
        error: io::Error,
    },
}

/// Default filter directive: `info`, or `debug` in debug mode.
///
/// `RUST_LOG` still takes precedence when set.
pub(crate) fn default_level(debug_logging: bool) -> &'static str {
    if debug_logging { "debug" } else { "info" }
}

/// Installs the global subscriber. Safe to call more than once.
pub(crate) fn init_logging(log_file: &Path, debug_logging: bool) -> LogDestination {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(debug_logging)));

    match open_log_file(log_file) {
        Ok(file) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init();
            LogDestination::File(log_file.to_path_buf())
        }
        Err(error) => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .try_init();
            LogDestination::Stderr {
                requested: log_file.to_path_buf(),
                error,
            }
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}
