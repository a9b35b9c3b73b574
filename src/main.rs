//! CLI entry point for the dirget tool.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use dirget_core::{
    DownloadEngine, DownloadPlan, HttpClient, ListingPage, RunSummary, SourceLocation,
    ensure_target_dir, fetch_listing, plan_downloads,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

mod cli;
mod config;
mod logging;
mod output;
mod progress;

use cli::Args;
use config::RunConfig;
use logging::LogDestination;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Every task was attempted; per-file failures are reported, not fatal.
    Success,
    /// Configuration or listing fetch failed before any download.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::from(1),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    let config = match load_run_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("Run `dirget --help` for usage.");
            return ProcessExit::Failure.into();
        }
    };

    match logging::init_logging(&config.log_file, config.debug_logging) {
        LogDestination::File(path) => debug!(path = %path.display(), "logging to file"),
        LogDestination::Stderr { requested, error } => warn!(
            path = %requested.display(),
            %error,
            "cannot open log file, logging to stderr"
        ),
    }

    info!("-= SCRIPT STARTED =-");
    debug!(?args, ?config, "options resolved");

    let exit = match run(&config).await {
        Ok(()) => ProcessExit::Success,
        Err(e) => {
            let message = format!("{e:#}");
            error!(error = %message, "run aborted");
            eprintln!("Error: {message}");
            ProcessExit::Failure
        }
    };

    info!("-= SCRIPT FINISHED =-");
    exit.into()
}

fn load_run_config(args: &Args) -> Result<RunConfig> {
    let file_config = config::load_file_config(args.config.as_deref())?;
    RunConfig::resolve(args, file_config.as_ref())
}

async fn run(config: &RunConfig) -> Result<()> {
    let summary = Arc::new(RunSummary::new());

    let location = SourceLocation::parse(&config.source_uri)?;
    info!(uri = %location, "scanning directory listing");

    let client = HttpClient::with_timeouts(config.connect_timeout_secs, config.read_timeout_secs)
        .context("Failed to build HTTP client")?;

    let html = fetch_listing(&client, &location)
        .await
        .with_context(|| format!("Failed to read directory listing at '{location}'"))?;

    let plan = build_plan(&html, &location, config);
    summary.record_skipped(plan.skipped.len());

    ensure_target_dir(&config.download_dir).await?;

    let engine = DownloadEngine::new(config.concurrency)?;

    let (completed_tx, completed_rx) = mpsc::unbounded_channel();
    let reporter = progress::spawn_reporter(
        progress::ReporterOptions {
            show_bar: !config.quiet && !config.json && io::stderr().is_terminal(),
            print_lines: !config.json,
            total: plan.tasks.len(),
        },
        completed_rx,
    );

    let reports = engine
        .download_all_reporting(
            &client,
            plan.tasks,
            &config.download_dir,
            &summary,
            Some(completed_tx),
        )
        .await;

    // Engine has dropped every sender by now.
    let _ = reporter.await;
    let reports = reports?;
    debug!(reports = reports.len(), "all tasks reported");

    let report = summary.finish();
    info!(
        attempted = report.attempted,
        succeeded = report.succeeded,
        failed = report.failed,
        skipped = report.skipped,
        elapsed = %report.elapsed_human,
        "run complete"
    );
    output::print_run_report(&report, config.json)
}

/// Parses the listing and applies the link rules.
///
/// Kept synchronous: the parsed document is not `Send` and must be dropped
/// before the next await.
fn build_plan(html: &str, location: &SourceLocation, config: &RunConfig) -> DownloadPlan {
    let page = ListingPage::parse(html);
    debug!(anchors = page.anchor_count(), "listing parsed");
    let plan = plan_downloads(page.links(location), &config.filetype_filter);
    info!(
        accepted = plan.tasks.len(),
        skipped = plan.skipped.len(),
        "download plan ready"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_exit_maps_to_exit_code() {
        assert_eq!(ExitCode::from(ProcessExit::Success), ExitCode::SUCCESS);
        assert_eq!(ExitCode::from(ProcessExit::Failure), ExitCode::from(1));
    }

    #[test]
    fn test_build_plan_applies_filter() {
        let args = Args::try_parse_from(["dirget", "-u", "http://h/pub/", "-t", "pdf"]).unwrap();
        let config = RunConfig::resolve(&args, None).unwrap();
        let location = SourceLocation::parse(&config.source_uri).unwrap();
        let html = r#"<a href="../">Parent Directory</a>
            <a href="a.pdf">a.pdf</a>
            <a href="b.txt">b.txt</a>"#;

        let plan = build_plan(html, &location, &config);
        assert_eq!(plan.tasks.len(), 1);
        assert_eq!(plan.tasks[0].filename, "a.pdf");
        assert_eq!(plan.tasks[0].url.as_str(), "http://h/pub/a.pdf");
        assert_eq!(plan.skipped.len(), 2);
    }
}
