//! Transfer errors shared by the listing fetch and per-file downloads.
//!
//! Every variant carries the URL or path involved, so a log line is enough
//! to tell which listing entry went wrong.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching a listing page or a file.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// DNS failure, refused connection, reset mid-body and similar.
    #[error("network error fetching {url}: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error reported by the client.
        #[source]
        source: reqwest::Error,
    },

    /// Connect or whole-request timeout elapsed.
    #[error("timed out fetching {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// The server answered with a non-success status.
    #[error("server answered HTTP {status} for {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code received.
        status: u16,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    Client {
        /// Builder error.
        #[source]
        source: reqwest::Error,
    },

    /// Creating or writing a local file failed.
    #[error("cannot write {path}: {source}")]
    Io {
        /// Local path being written.
        path: PathBuf,
        /// OS error.
        #[source]
        source: std::io::Error,
    },
}

impl DownloadError {
    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an error for a client that failed to build.
    pub fn client(source: reqwest::Error) -> Self {
        Self::Client { source }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an IO error for a local path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true when the server reported the resource as missing (404, 410).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::HttpStatus { status: 404 | 410, .. })
    }
}
