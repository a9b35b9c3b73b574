//! Live run feedback: per-file success lines and the progress bar.

use std::time::Duration;

use dirget_core::TaskReport;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::output::success_line;

/// What the reporter shows while downloads run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReporterOptions {
    /// Draw a progress bar on stderr.
    pub show_bar: bool,
    /// Print a stdout line for each finished file.
    pub print_lines: bool,
    /// Number of tasks in the run.
    pub total: usize,
}

/// Spawns the reporter task. It ends once every sender of `completed` is
/// dropped, i.e. when the engine has finished.
pub(crate) fn spawn_reporter(
    options: ReporterOptions,
    mut completed: UnboundedReceiver<TaskReport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let bar = (options.show_bar && options.total > 0).then(|| new_bar(options.total));
        let mut succeeded = 0_usize;
        let mut failed = 0_usize;

        while let Some(report) = completed.recv().await {
            let line = success_line(&report);
            if line.is_some() {
                succeeded += 1;
            } else {
                failed += 1;
            }

            if let Some(bar) = &bar {
                bar.inc(1);
                bar.set_message(progress_message(succeeded, failed));
            }

            if options.print_lines
                && let Some(line) = line
            {
                match &bar {
                    Some(bar) => bar.suspend(|| println!("{line}")),
                    None => println!("{line}"),
                }
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
    })
}

fn new_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn progress_message(succeeded: usize, failed: usize) -> String {
    match failed {
        0 => format!("{succeeded} downloaded"),
        failed => format!("{succeeded} downloaded, {failed} failed"),
    }
}
