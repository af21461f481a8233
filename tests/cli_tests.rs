//! Command-line tests for the `study-timer` binary.

use assert_cmd::Command;
use predicates::prelude::*;

fn study_timer() -> Command {
    Command::cargo_bin("study-timer").unwrap()
}

#[test]
fn test_help_lists_commands() {
    study_timer()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("toggle"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("daemon"));
}

#[test]
fn test_completions_bash() {
    study_timer()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("study-timer"));
}

#[test]
fn test_status_without_daemon_fails() {
    let dir = tempfile::tempdir().unwrap();
    let socket = dir.path().join("missing.sock");

    study_timer()
        .arg("status")
        .arg("--socket")
        .arg(&socket)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Cannot reach the daemon"));
}

#[test]
fn test_zero_study_minutes_rejected() {
    study_timer()
        .args(["run", "--study", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--study"));
}
