//! Dirget Core Library
//!
//! This library provides the core functionality for the `dirget` tool, which
//! scans a web server's auto-generated directory listing and downloads the
//! files it links to, concurrently, into a local directory.
//!
//! # Architecture
//!
//! The pipeline is linear and only the last stage is concurrent:
//! - [`listing`] - source URI normalization, listing fetch, anchor extraction and filtering
//! - [`download`] - HTTP client and bounded-concurrency download engine
//! - [`summary`] - shared run counters and the final report

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
pub mod listing;
pub mod summary;
mod user_agent;

// Re-export commonly used types
pub use download::{
    DEFAULT_CONCURRENCY, DownloadEngine, DownloadError, EngineError, FailureReason, HttpClient,
    TaskOutcome, TaskReport, ensure_target_dir,
};
pub use listing::{
    DownloadPlan, DownloadTask, FiletypeFilter, LinkCandidate, ListingError, ListingPage,
    SkipReason, SourceLocation, fetch_listing, plan_downloads,
};
pub use summary::{RunReport, RunSummary, format_duration};
