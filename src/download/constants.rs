//! Constants for the download module (timeouts, concurrency bounds).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default total request timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Largest timeout accepted from the CLI or config file (1 hour).
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;

/// Default number of simultaneous downloads.
pub const DEFAULT_CONCURRENCY: usize = 5;
