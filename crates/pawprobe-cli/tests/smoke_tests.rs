//! Smoke tests for the pawprobe CLI
//!
//! None of these launch a browser.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the pawprobe binary
fn pawprobe() -> Command {
    Command::cargo_bin("pawprobe").expect("pawprobe binary should exist")
}

#[test]
fn test_help_flag() {
    pawprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("PawFinder"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn test_version_flag() {
    pawprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_args_fails() {
    pawprobe().assert().failure();
}

#[test]
fn test_run_help_lists_overrides() {
    pawprobe()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--headed"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_list_shows_every_scenario() {
    let output = pawprobe().args(["--color", "never", "list"]).output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for name in [
        "homepage",
        "home-pets",
        "pet-details",
        "sign-in",
        "marketplace",
        "veterinary",
        "adoption-form",
    ] {
        assert!(stdout.contains(name), "{name} missing from:\n{stdout}");
    }
}

#[test]
fn test_unknown_scenario_rejected() {
    pawprobe()
        .args(["run", "no-such-scenario"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-scenario"))
        .stderr(predicate::str::contains("homepage"));
}

#[test]
fn test_unknown_scenario_rejected_even_with_valid_ones() {
    pawprobe()
        .args(["run", "homepage", "kennel"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("kennel"));
}

#[test]
fn test_bad_base_url_rejected() {
    pawprobe()
        .args(["run", "homepage", "--base-url", "localhost:3000"])
        .env_remove("PAWPROBE_BASE_URL")
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_unreadable_config_rejected() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pawprobe.yaml");
    fs::write(&path, "window_width: [not, a, number]\n").unwrap();

    pawprobe()
        .args(["run", "homepage", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
