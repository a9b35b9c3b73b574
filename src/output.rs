//! Run report rendering for stdout.

use anyhow::Result;
use dirget_core::{RunReport, TaskReport};

/// Width of the separator printed before the summary.
const SEPARATOR_WIDTH: usize = 40;

/// Line announcing a finished file, or `None` for a failed task.
pub(crate) fn success_line(report: &TaskReport) -> Option<String> {
    report
        .outcome
        .is_success()
        .then(|| format!("{} has been downloaded successfully", report.task.filename))
}

/// Separator plus the two summary lines.
pub(crate) fn summary_lines(report: &RunReport) -> Vec<String> {
    vec![
        "-".repeat(SEPARATOR_WIDTH),
        format!("Number of files downloaded: {}", report.succeeded),
        format!("Total downloading time: {}", report.elapsed_human),
    ]
}

/// Prints the end-of-run summary, or the JSON report when `json` is set.
///
/// Per-file lines are printed by the progress reporter as tasks finish.
pub(crate) fn print_run_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for line in summary_lines(report) {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use dirget_core::{DownloadTask, FailureReason, RunSummary, TaskOutcome};
    use url::Url;

    use super::*;

    fn report(filename: &str, outcome: TaskOutcome) -> TaskReport {
        TaskReport {
            task: DownloadTask {
                url: Url::parse(&format!("http://example.com/pub/{filename}")).unwrap(),
                filename: filename.to_string(),
            },
            outcome,
        }
    }

    #[test]
    fn test_success_line_for_written_file() {
        let line = success_line(&report("b.pdf", TaskOutcome::Success { bytes_written: 3 }));
        assert_eq!(line.as_deref(), Some("b.pdf has been downloaded successfully"));
    }

    #[test]
    fn test_success_line_absent_for_failures() {
        assert!(success_line(&report("gone.txt", TaskOutcome::Failure(FailureReason::NotFound))).is_none());
        assert!(
            success_line(&report(
                "cut.bin",
                TaskOutcome::Failure(FailureReason::Transfer {
                    message: "reset".to_string(),
                }),
            ))
            .is_none()
        );
    }

    #[test]
    fn test_summary_lines_format() {
        let summary = RunSummary::new();
        summary.record(&TaskOutcome::Success { bytes_written: 1 });
        summary.record(&TaskOutcome::Failure(FailureReason::NotFound));
        let mut run_report = summary.finish();
        run_report.elapsed_human = "2 minutes 3.5 seconds".to_string();

        let lines = summary_lines(&run_report);
        assert_eq!(lines[0], "-".repeat(40));
        assert_eq!(lines[1], "Number of files downloaded: 1");
        assert_eq!(lines[2], "Total downloading time: 2 minutes 3.5 seconds");
    }
}
