//! End-to-end CLI tests for the dirget binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[macro_use]
mod support;
use support::fixtures::scenario_listing;

fn dirget(work_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("dirget").unwrap();
    cmd.current_dir(work_dir.path())
        .env_remove("RUST_LOG")
        .env("XDG_CONFIG_HOME", work_dir.path().join("no-config"));
    cmd
}

async fn mount_scenario(mock_server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/pub/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(scenario_listing()))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pub/a.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"pdf bytes"))
        .mount(mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/pub/b.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(mock_server)
        .await;
}

/// Test that --help displays usage information and exits with code 0.
#[test]
fn test_binary_help_displays_usage() {
    let work_dir = TempDir::new().unwrap();
    dirget(&work_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--uri"))
        .stdout(predicate::str::contains("Examples:"));
}

/// Test that --version displays version and exits with code 0.
#[test]
fn test_binary_version_displays_version() {
    let work_dir = TempDir::new().unwrap();
    dirget(&work_dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Test that a missing --uri is a usage error.
#[test]
fn test_binary_missing_uri_returns_error() {
    let work_dir = TempDir::new().unwrap();
    dirget(&work_dir)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--uri"));
}

/// Test that invalid flags cause non-zero exit.
#[test]
fn test_binary_invalid_flag_returns_error() {
    let work_dir = TempDir::new().unwrap();
    dirget(&work_dir)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_unsupported_scheme_exits_with_failure() {
    let work_dir = TempDir::new().unwrap();
    dirget(&work_dir)
        .args(["-u", "ftp://example.com/pub/"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("ftp"));
    assert!(!work_dir.path().join("download").exists());
}

#[test]
fn test_binary_bad_config_file_exits_with_failure() {
    let work_dir = TempDir::new().unwrap();
    let config = work_dir.path().join("dirget.toml");
    std::fs::write(&config, "concurrency = 0\n").unwrap();
    dirget(&work_dir)
        .args(["-u", "http://example.com/pub/", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("concurrency"));
}

#[tokio::test]
async fn test_binary_downloads_filtered_listing() {
    let mock_server = require_mock_server!();
    mount_scenario(&mock_server).await;
    let work_dir = TempDir::new().unwrap();

    dirget(&work_dir)
        .args(["-u", &format!("{}/pub", mock_server.uri()), "-t", "pdf", "-c", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "a.pdf has been downloaded successfully",
        ))
        .stdout(predicate::str::contains("Number of files downloaded: 1"))
        .stdout(predicate::str::contains("Total downloading time:"));

    let downloaded = work_dir.path().join("download").join("a.pdf");
    assert_eq!(std::fs::read(downloaded).unwrap(), b"pdf bytes");
    assert!(!work_dir.path().join("download").join("b.txt").exists());

    let log = std::fs::read_to_string(work_dir.path().join("log.txt")).unwrap();
    assert!(log.contains("-= SCRIPT STARTED =-"));
    assert!(log.contains("-= SCRIPT FINISHED =-"));
    assert!(log.contains("skipping link"));
}

#[tokio::test]
async fn test_binary_not_found_file_does_not_fail_run() {
    let mock_server = require_mock_server!();
    mount_scenario(&mock_server).await;
    let work_dir = TempDir::new().unwrap();
    let target = work_dir.path().join("out");
    let log_file = work_dir.path().join("logs").join("run.log");

    dirget(&work_dir)
        .args(["-u", &format!("{}/pub/", mock_server.uri()), "-d"])
        .arg(&target)
        .arg("--log-file")
        .arg(&log_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Number of files downloaded: 1"))
        .stdout(predicate::str::contains("b.txt has been downloaded").not());

    assert!(target.join("a.pdf").exists());
    let log = std::fs::read_to_string(&log_file).unwrap();
    assert!(log.contains("remote file is not found"));
}

#[tokio::test]
async fn test_binary_json_report() {
    let mock_server = require_mock_server!();
    mount_scenario(&mock_server).await;
    let work_dir = TempDir::new().unwrap();

    let output = dirget(&work_dir)
        .args(["-u", &format!("{}/pub/", mock_server.uri()), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["attempted"], 2);
    assert_eq!(report["succeeded"], 1);
    assert_eq!(report["failed"], 1);
    assert_eq!(report["not_found"], 1);
    assert_eq!(report["skipped"], 3);
}

#[tokio::test]
async fn test_binary_listing_not_found_exits_with_failure() {
    let mock_server = require_mock_server!();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    let work_dir = TempDir::new().unwrap();

    dirget(&work_dir)
        .args(["-u", &format!("{}/nowhere/", mock_server.uri())])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("directory listing"));
}
