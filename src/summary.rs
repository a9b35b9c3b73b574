//! Aggregate outcome counters and timing for one run.
//!
//! A [`RunSummary`] is created by the orchestrator, shared with every download
//! worker through an `Arc`, and finalized into a serializable [`RunReport`]
//! once the pool has drained.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::download::{FailureReason, TaskOutcome};

/// Shared, thread-safe counters for a single run.
#[derive(Debug)]
pub struct RunSummary {
    started_at: Instant,
    attempted: AtomicUsize,
    succeeded: AtomicUsize,
    not_found: AtomicUsize,
    transfer_failed: AtomicUsize,
    skipped: AtomicUsize,
    bytes_written: AtomicU64,
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}

impl RunSummary {
    /// Creates a summary whose clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            attempted: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            not_found: AtomicUsize::new(0),
            transfer_failed: AtomicUsize::new(0),
            skipped: AtomicUsize::new(0),
            bytes_written: AtomicU64::new(0),
        }
    }

    /// Returns the number of tasks whose outcome has been recorded.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Returns the number of fully written files.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::SeqCst)
    }

    /// Returns attempted minus succeeded.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.attempted().saturating_sub(self.succeeded())
    }

    /// Returns the number of downloads the server reported as missing.
    #[must_use]
    pub fn not_found(&self) -> usize {
        self.not_found.load(Ordering::SeqCst)
    }

    /// Returns the number of downloads that failed for any other reason.
    #[must_use]
    pub fn transfer_failed(&self) -> usize {
        self.transfer_failed.load(Ordering::SeqCst)
    }

    /// Returns the number of anchors skipped before download.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped.load(Ordering::SeqCst)
    }

    /// Returns the total bytes written by successful downloads.
    #[must_use]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::SeqCst)
    }

    /// Returns wall-clock time since the summary was created.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Adds `count` anchors rejected by the link filter.
    pub fn record_skipped(&self, count: usize) {
        self.skipped.fetch_add(count, Ordering::SeqCst);
    }

    /// Folds one task outcome into the counters.
    ///
    /// The success counter is bumped after the byte count so a reader that
    /// sees a success also sees its bytes.
    pub fn record(&self, outcome: &TaskOutcome) {
        match outcome {
            TaskOutcome::Success { bytes_written } => {
                self.bytes_written
                    .fetch_add(*bytes_written, Ordering::SeqCst);
                self.succeeded.fetch_add(1, Ordering::SeqCst);
            }
            TaskOutcome::Failure(FailureReason::NotFound) => {
                self.not_found.fetch_add(1, Ordering::SeqCst);
            }
            TaskOutcome::Failure(FailureReason::Transfer { .. }) => {
                self.transfer_failed.fetch_add(1, Ordering::SeqCst);
            }
        }
        self.attempted.fetch_add(1, Ordering::SeqCst);
    }

    /// Snapshots the counters and elapsed time into a report.
    #[must_use]
    pub fn finish(&self) -> RunReport {
        let elapsed = self.elapsed();
        RunReport {
            attempted: self.attempted(),
            succeeded: self.succeeded(),
            failed: self.failed(),
            not_found: self.not_found(),
            transfer_failed: self.transfer_failed(),
            skipped: self.skipped(),
            bytes_written: self.bytes_written(),
            elapsed_secs: elapsed.as_secs_f64(),
            elapsed_human: format_duration(elapsed),
        }
    }
}

/// Final, immutable view of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Download tasks attempted.
    pub attempted: usize,
    /// Files fully written.
    pub succeeded: usize,
    /// `attempted - succeeded`.
    pub failed: usize,
    /// Failures caused by a missing remote resource.
    pub not_found: usize,
    /// Failures caused by transport, status or disk errors.
    pub transfer_failed: usize,
    /// Anchors rejected before download.
    pub skipped: usize,
    /// Bytes written across all successful files.
    pub bytes_written: u64,
    /// Elapsed wall-clock seconds.
    pub elapsed_secs: f64,
    /// Elapsed time in long human-readable form.
    pub elapsed_human: String,
}

/// Formats a duration in long form, e.g. `2 minutes 3.5 seconds`.
///
/// Seconds are rounded to two decimals; zero-valued units are omitted except
/// for a zero duration, which renders as `0 seconds`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(duration: Duration) -> String {
    let centis = (duration.as_secs_f64() * 100.0).round() as u64;
    let total_secs = centis / 100;
    let frac = centis % 100;

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    let mut parts = Vec::new();
    for (value, unit) in [(days, "day"), (hours, "hour"), (minutes, "minute")] {
        if value > 0 {
            parts.push(pluralize(&value.to_string(), value == 1, unit));
        }
    }

    if secs > 0 || frac > 0 || parts.is_empty() {
        let rendered = if frac == 0 {
            secs.to_string()
        } else {
            format!("{secs}.{frac:02}").trim_end_matches('0').to_string()
        };
        parts.push(pluralize(&rendered, secs == 1 && frac == 0, "second"));
    }

    parts.join(" ")
}

fn pluralize(value: &str, singular: bool, unit: &str) -> String {
    if singular {
        format!("{value} {unit}")
    } else {
        format!("{value} {unit}s")
    }
}
