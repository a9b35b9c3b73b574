//! HTTP download engine for streaming listing files to disk.
//!
//! This module provides the HTTP client used for both the listing fetch and
//! the per-file transfers, and the bounded-concurrency engine that runs them.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Semaphore-bounded worker pool, one task per file
//! - Configurable timeouts (30s connect, 5min total by default)
//! - Structured error types with full context
//! - Label sanitization and in-run duplicate filename handling
//!
//! # Example
//!
//! ```no_run
//! use dirget_core::download::HttpClient;
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let url = Url::parse("https://example.com/pub/paper.pdf")?;
//! let bytes = client
//!     .download_to_file(&url, Path::new("./download"), "paper.pdf")
//!     .await?;
//! println!("Downloaded: {bytes} bytes");
//! # Ok(())
//! # }
//! ```

mod client;
pub mod constants;
mod engine;
mod error;
mod filename;

use std::path::Path;

use tracing::debug;

pub use client::HttpClient;
pub use constants::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use engine::{DownloadEngine, EngineError, FailureReason, TaskOutcome, TaskReport};
pub use error::DownloadError;
pub use filename::{FilenameRegistry, sanitize_filename};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.

/// Creates `target_dir` (and missing parents) if it does not exist yet.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if the directory cannot be created or the
/// path exists but is not a directory.
pub async fn ensure_target_dir(target_dir: &Path) -> Result<(), DownloadError> {
    if tokio::fs::metadata(target_dir)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        return Ok(());
    }
    debug!(path = %target_dir.display(), "creating download directory");
    tokio::fs::create_dir_all(target_dir)
        .await
        .map_err(|e| DownloadError::io(target_dir, e))
}
