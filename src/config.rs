//! Run configuration: config file loading and merge with CLI flags.
//!
//! Precedence is explicit CLI flag, then config file, then built-in default.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use dirget_core::FiletypeFilter;
use dirget_core::download::constants::{
    CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MAX_TIMEOUT_SECS, MIN_CONCURRENCY,
    READ_TIMEOUT_SECS,
};

use crate::cli::Args;

/// Default directory downloads are written to.
pub const DEFAULT_DOWNLOAD_DIR: &str = "download";

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// File-backed defaults (`key = value` lines, TOML subset).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Default download directory.
    pub download_dir: Option<PathBuf>,
    /// Default concurrency (same range as CLI).
    pub concurrency: Option<u8>,
    /// Default filetype filter (`"all"` or `"pdf,txt"`).
    pub filetype: Option<String>,
    /// Default log file.
    pub log_file: Option<PathBuf>,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: Option<u64>,
    /// Per-request timeout in seconds.
    pub read_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&usize::from(concurrency))
        {
            bail!(
                "Invalid config value for `concurrency`: {concurrency}. Expected range: {MIN_CONCURRENCY}..={MAX_CONCURRENCY}"
            );
        }
        if let Some(filetype) = &self.filetype {
            filetype
                .parse::<FiletypeFilter>()
                .with_context(|| format!("Invalid config value for `filetype`: '{filetype}'"))?;
        }
        validate_timeout_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_timeout_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_timeout_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=MAX_TIMEOUT_SECS).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..={MAX_TIMEOUT_SECS}");
    }
    Ok(())
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Source URI as given; normalized by the listing stage.
    pub source_uri: String,
    /// Directory downloads are written to.
    pub download_dir: PathBuf,
    /// Maximum simultaneous downloads.
    pub concurrency: usize,
    /// Accepted filetypes.
    pub filetype_filter: FiletypeFilter,
    /// Log at debug level.
    pub debug_logging: bool,
    /// Log file path.
    pub log_file: PathBuf,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Per-request timeout in seconds.
    pub read_timeout_secs: u64,
    /// Print the report as JSON.
    pub json: bool,
    /// Hide the progress bar.
    pub quiet: bool,
}

impl RunConfig {
    /// Merges CLI arguments over file config over defaults.
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Result<Self> {
        let file = file.cloned().unwrap_or_default();

        let filetype_raw = args
            .filetype
            .clone()
            .or(file.filetype)
            .unwrap_or_else(|| "all".to_string());
        let filetype_filter = filetype_raw
            .parse::<FiletypeFilter>()
            .with_context(|| format!("Invalid filetype filter '{filetype_raw}'"))?;

        Ok(Self {
            source_uri: args.uri.clone(),
            download_dir: args
                .download_dir
                .clone()
                .or(file.download_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR)),
            concurrency: args
                .concurrency
                .or(file.concurrency)
                .map_or(DEFAULT_CONCURRENCY, usize::from),
            filetype_filter,
            debug_logging: args.debug,
            log_file: args
                .log_file
                .clone()
                .or(file.log_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
            connect_timeout_secs: args
                .connect_timeout
                .or(file.connect_timeout_secs)
                .unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: args
                .timeout
                .or(file.read_timeout_secs)
                .unwrap_or(READ_TIMEOUT_SECS),
            json: args.json,
            quiet: args.quiet,
        })
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/dirget/config.toml`
/// 2. `$HOME/.config/dirget/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("dirget")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("dirget")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }

    match resolve_default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "download_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `download_dir` value on line {line_no}"))?;
                cfg.download_dir = Some(PathBuf::from(parsed));
            }
            "concurrency" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `concurrency` value on line {line_no}"))?;
                let n = u8::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("concurrency out of range on line {line_no}"))?;
                cfg.concurrency = Some(n);
            }
            "filetype" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `filetype` value on line {line_no}"))?;
                cfg.filetype = Some(parsed);
            }
            "log_file" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `log_file` value on line {line_no}"))?;
                cfg.log_file = Some(PathBuf::from(parsed));
            }
            "connect_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `connect_timeout_secs` value on line {line_no}")
                })?;
                cfg.connect_timeout_secs = Some(parsed);
            }
            "read_timeout_secs" => {
                let parsed = parse_integer_u64(value).with_context(|| {
                    format!("Invalid `read_timeout_secs` value on line {line_no}")
                })?;
                cfg.read_timeout_secs = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}
