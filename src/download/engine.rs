//! Download engine for concurrent file downloads.
//!
//! This module provides the `DownloadEngine` which fetches a list of
//! [`DownloadTask`]s using a semaphore-based concurrency control pattern.
//! Every task is attempted exactly once; a failing task never aborts the batch.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::path::Path;
//! use dirget_core::RunSummary;
//! use dirget_core::download::{DownloadEngine, HttpClient};
//! use dirget_core::listing::DownloadTask;
//!
//! # async fn example(tasks: Vec<DownloadTask>) -> Result<(), Box<dyn std::error::Error>> {
//! let engine = DownloadEngine::new(5)?;
//! let client = HttpClient::new();
//! let summary = Arc::new(RunSummary::new());
//! let reports = engine
//!     .download_all(&client, tasks, Path::new("./download"), &summary)
//!     .await?;
//! println!("Succeeded: {} of {}", summary.succeeded(), reports.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use super::constants::{DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::{DownloadError, HttpClient};
use crate::listing::DownloadTask;
use crate::summary::RunSummary;

/// Error type for download engine operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

/// Why a download task did not produce a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// The server reported the resource as missing (404/410).
    NotFound,
    /// Any other status, network, timeout or disk error.
    Transfer {
        /// Human-readable error description.
        message: String,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => f.write_str("not found"),
            Self::Transfer { message } => f.write_str(message),
        }
    }
}

/// Outcome of attempting one download task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The file was fully written.
    Success {
        /// Bytes written to disk.
        bytes_written: u64,
    },
    /// The task failed; nothing (or nothing complete) was written.
    Failure(FailureReason),
}

impl TaskOutcome {
    /// Returns true for [`TaskOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<Result<u64, DownloadError>> for TaskOutcome {
    fn from(result: Result<u64, DownloadError>) -> Self {
        match result {
            Ok(bytes_written) => Self::Success { bytes_written },
            Err(e) if e.is_not_found() => Self::Failure(FailureReason::NotFound),
            Err(e) => Self::Failure(FailureReason::Transfer {
                message: e.to_string(),
            }),
        }
    }
}

/// A task paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    /// The task that was attempted.
    pub task: DownloadTask,
    /// What happened.
    pub outcome: TaskOutcome,
}

/// Download engine for concurrent file downloads.
///
/// # Concurrency Model
///
/// - Each download runs in its own Tokio task
/// - A semaphore permit is acquired before spawning each download, so no more
///   than `concurrency` transfers are ever in flight
/// - Permits are released automatically when downloads complete (RAII)
/// - Each worker returns a [`TaskReport`]; the engine folds outcomes into the
///   shared [`RunSummary`] as they finish
#[derive(Debug)]
pub struct DownloadEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
}

impl Default for DownloadEngine {
    fn default() -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl DownloadEngine {
    /// Creates a new download engine with the specified concurrency limit.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConcurrency`] if the value is outside
    /// the valid range (1-100).
    ///
    /// # Example
    ///
    /// ```
    /// use dirget_core::download::DownloadEngine;
    ///
    /// let engine = DownloadEngine::new(5).unwrap();
    /// assert_eq!(engine.concurrency(), 5);
    /// ```
    #[instrument(level = "debug")]
    pub fn new(concurrency: usize) -> Result<Self, EngineError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(EngineError::InvalidConcurrency { value: concurrency });
        }

        debug!(concurrency, "creating download engine");

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Downloads every task into `target_dir`, at most `concurrency` at a time.
    ///
    /// `target_dir` must already exist. Reports are returned in the order of
    /// `tasks`; completion order is unspecified.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    ///
    /// Note: Individual download failures do NOT cause this method to error.
    /// They are reported per task and counted in `summary`.
    pub async fn download_all<I>(
        &self,
        client: &HttpClient,
        tasks: I,
        target_dir: &Path,
        summary: &Arc<RunSummary>,
    ) -> Result<Vec<TaskReport>, EngineError>
    where
        I: IntoIterator<Item = DownloadTask>,
    {
        self.download_all_reporting(client, tasks, target_dir, summary, None)
            .await
    }

    /// Like [`download_all`](Self::download_all), additionally sending each
    /// [`TaskReport`] on `completed` as soon as its task finishes.
    ///
    /// The channel closes once every task has reported and the returned
    /// future has resolved.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SemaphoreClosed`] if the semaphore is closed.
    #[instrument(skip(self, client, tasks, summary, completed), fields(target_dir = %target_dir.display()))]
    pub async fn download_all_reporting<I>(
        &self,
        client: &HttpClient,
        tasks: I,
        target_dir: &Path,
        summary: &Arc<RunSummary>,
        completed: Option<UnboundedSender<TaskReport>>,
    ) -> Result<Vec<TaskReport>, EngineError>
    where
        I: IntoIterator<Item = DownloadTask>,
    {
        let mut handles = Vec::new();

        info!(concurrency = self.concurrency, "starting downloads");

        for task in tasks {
            // Blocks while `concurrency` downloads are in flight.
            let permit = self
                .semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|_| EngineError::SemaphoreClosed)?;

            let client = client.clone();
            let summary = Arc::clone(summary);
            let target_dir = target_dir.to_path_buf();
            let spawned_task = task.clone();
            let completed = completed.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let outcome = download_one(&client, &spawned_task, &target_dir).await;
                summary.record(&outcome);
                if let Some(completed) = completed {
                    // Receiver may already be dropped.
                    let _ = completed.send(TaskReport {
                        task: spawned_task,
                        outcome: outcome.clone(),
                    });
                }
                outcome
            });
            handles.push((task, handle));
        }

        debug!(
            task_count = handles.len(),
            "waiting for downloads to complete"
        );

        let mut reports = Vec::with_capacity(handles.len());
        for (task, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(filename = %task.filename, error = %e, "download task panicked");
                    let outcome = TaskOutcome::Failure(FailureReason::Transfer {
                        message: format!("download task panicked: {e}"),
                    });
                    summary.record(&outcome);
                    if let Some(completed) = &completed {
                        let _ = completed.send(TaskReport {
                            task: task.clone(),
                            outcome: outcome.clone(),
                        });
                    }
                    outcome
                }
            };
            reports.push(TaskReport { task, outcome });
        }

        info!(
            attempted = summary.attempted(),
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            "downloads complete"
        );

        Ok(reports)
    }
}

/// Fetches and writes a single task, folding any error into the outcome.
#[instrument(skip(client, task, target_dir), fields(url = %task.url, filename = %task.filename))]
async fn download_one(client: &HttpClient, task: &DownloadTask, target_dir: &Path) -> TaskOutcome {
    debug!("attempting download");
    let outcome = TaskOutcome::from(
        client
            .download_to_file(&task.url, target_dir, &task.filename)
            .await,
    );

    match &outcome {
        TaskOutcome::Success { bytes_written } => {
            info!(bytes = bytes_written, "download completed");
        }
        TaskOutcome::Failure(FailureReason::NotFound) => {
            info!("remote file is not found");
        }
        TaskOutcome::Failure(reason) => {
            warn!(%reason, "download failed");
        }
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_new_valid_concurrency() {
        let engine = DownloadEngine::new(1).unwrap();
        assert_eq!(engine.concurrency(), 1);

        let engine = DownloadEngine::new(5).unwrap();
        assert_eq!(engine.concurrency(), 5);

        let engine = DownloadEngine::new(100).unwrap();
        assert_eq!(engine.concurrency(), 100);
    }

    #[test]
    fn test_engine_default_uses_default_concurrency() {
        assert_eq!(DownloadEngine::default().concurrency(), DEFAULT_CONCURRENCY);
        assert_eq!(DEFAULT_CONCURRENCY, 5);
    }

    #[test]
    fn test_engine_new_invalid_concurrency_zero() {
        let result = DownloadEngine::new(0);
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 0 })
        ));
    }

    #[test]
    fn test_engine_new_invalid_concurrency_too_high() {
        let result = DownloadEngine::new(101);
        assert!(matches!(
            result,
            Err(EngineError::InvalidConcurrency { value: 101 })
        ));
    }

    #[test]
    fn test_engine_error_display() {
        let error = EngineError::InvalidConcurrency { value: 0 };
        let msg = error.to_string();
        assert!(msg.contains("invalid concurrency"));
        assert!(msg.contains('0'));
        assert!(msg.contains("100"));
    }

    #[test]
    fn test_outcome_from_not_found_status() {
        let outcome = TaskOutcome::from(Err(DownloadError::http_status("http://h/a", 404)));
        assert_eq!(outcome, TaskOutcome::Failure(FailureReason::NotFound));
    }

    #[test]
    fn test_outcome_from_server_error_is_transfer_failure() {
        let outcome = TaskOutcome::from(Err(DownloadError::http_status("http://h/a", 503)));
        match outcome {
            TaskOutcome::Failure(FailureReason::Transfer { message }) => {
                assert!(message.contains("503"));
            }
            other => panic!("expected transfer failure, got {other:?}"),
        }
    }

    #[test]
    fn test_outcome_from_success() {
        let outcome = TaskOutcome::from(Ok(42));
        assert!(outcome.is_success());
        assert_eq!(outcome, TaskOutcome::Success { bytes_written: 42 });
    }

    #[tokio::test]
    async fn test_download_all_empty_returns_no_reports() {
        let engine = DownloadEngine::new(2).unwrap();
        let summary = Arc::new(RunSummary::new());
        let dir = tempfile::TempDir::new().unwrap();
        let reports = engine
            .download_all(&HttpClient::new(), Vec::new(), dir.path(), &summary)
            .await
            .unwrap();
        assert!(reports.is_empty());
        assert_eq!(summary.attempted(), 0);
    }
}
