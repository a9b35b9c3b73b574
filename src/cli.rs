//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

const USAGE_EXAMPLES: &str = "\
Examples:
     dirget -u http://example.com/temp
     dirget -u http://example.com/temp/
     dirget -u http://example.com/temp/list.htm
     dirget -u http://example.com/temp -d download -c 3 -t pdf,txt";

/// Download every file linked from a web server directory listing.
///
/// Dirget fetches one listing page, keeps the links whose label looks like a
/// filename (optionally filtered by extension), and downloads them in parallel.
#[derive(Parser, Debug)]
#[command(name = "dirget")]
#[command(author, version, about, after_help = USAGE_EXAMPLES)]
pub struct Args {
    /// URI of the directory listing (or index page) to scan
    #[arg(short = 'u', long)]
    pub uri: String,

    /// Local directory to save files in (download by default)
    #[arg(short = 'd', long)]
    pub download_dir: Option<PathBuf>,

    /// Number of simultaneous downloads, 1-100 (5 by default)
    #[arg(short = 'c', long, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub concurrency: Option<u8>,

    /// Comma-separated, case-insensitive filetypes to download (all by default)
    #[arg(short = 't', long, value_name = "TYPE1[,TYPE2]")]
    pub filetype: Option<String>,

    /// Debug mode: log at debug level
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Log file to append to (log.txt by default)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// HTTP connect timeout in seconds, 1-3600 (30 by default)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// Per-request timeout in seconds, 1-3600 (300 by default)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub timeout: Option<u64>,

    /// Config file to read defaults from
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the run report as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,

    /// Suppress the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}
