//! Command line contract: arguments, output streams and exit codes

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary with Jira settings from the caller's environment removed
fn chiketto() -> Command {
    let mut cmd = Command::cargo_bin("chiketto").unwrap();
    for var in ["JIRA_HOST", "JIRA_URL", "JIRA_USERNAME", "JIRA_TOKEN", "RUST_LOG"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn version_is_printed_on_stdout() {
    chiketto()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn version_ignores_other_arguments() {
    chiketto()
        .args(["CHIK", "--selection-type", "bogus", "--version"])
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_prints_usage() {
    chiketto()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("--from-date"));
}

#[test]
fn no_projects_is_a_clean_noop() {
    chiketto()
        .arg("--from-date=2021-01-01")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}

#[test]
fn start_date_spelling_is_accepted() {
    chiketto().arg("--start-date=2021-01-01").assert().success();
}

#[test]
fn missing_from_date_is_a_usage_error() {
    chiketto()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing option '--start-date'"));
}

#[test]
fn missing_from_date_with_projects_is_a_usage_error() {
    chiketto()
        .args(["CHIK", "--end-date", "2021-01-31"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing option '--start-date'"));
}

#[test]
fn iso_dates_are_accepted() {
    for (from, end) in [
        ("2021-01-01", "2021-12-31"),
        ("2020-02-29", "2020-03-01"),
        ("2021-01-01T00:00:00", "2021-01-02 12:30:00"),
    ] {
        chiketto()
            .args(["--from-date", from, "--end-date", end])
            .assert()
            .success();
    }
}

#[test]
fn malformed_dates_are_usage_errors() {
    chiketto()
        .args(["--from-date", "01/01/2021"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--from-date"));

    chiketto()
        .args(["--from-date", "2021-01-01", "--end-date", "2021-02-30"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--end-date"));
}

#[test]
fn unknown_selection_types_are_usage_errors() {
    for value in ["updated", "Modified", "all", ""] {
        chiketto()
            .args(["-f", "2021-01-01", "--selection-type", value])
            .assert()
            .code(2);
    }
}

#[test]
fn known_selection_types_are_accepted() {
    for value in ["created", "modified"] {
        chiketto()
            .args(["-f", "2021-01-01", "--selection-type", value])
            .assert()
            .success();
    }
}

#[test]
fn username_needs_a_token() {
    chiketto()
        .args(["-f", "2021-01-01", "--username", "dimwit"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing option '--api-token'"));

    chiketto()
        .args(["-f", "2021-01-01"])
        .env("JIRA_TOKEN", "s3cret")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing option '--username'"));
}

#[test]
fn missing_host_fails_extraction() {
    let dir = TempDir::new().unwrap();
    chiketto()
        .args(["CHIK", "-f", "2021-01-01", "--config"])
        .arg(dir.path().join("config.json"))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("No Jira host configured"));
}

#[test]
fn unreachable_jira_fails_extraction() {
    let dir = TempDir::new().unwrap();
    chiketto()
        .args(["CHIK", "-f", "2021-01-01", "--jira-url", "http://127.0.0.1:9/rest/api/2"])
        .arg("--config")
        .arg(dir.path().join("config.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to extract project CHIK"));
}
