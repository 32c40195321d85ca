//! CLI surface tests

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("geodrop").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init-db"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("publish"));
}

#[test]
fn test_no_arguments_shows_usage() {
    let mut cmd = Command::cargo_bin("geodrop").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_version_flag() {
    let mut cmd = Command::cargo_bin("geodrop").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("geodrop"));
}

#[test]
fn test_publish_rejects_missing_archive() {
    let mut cmd = Command::cargo_bin("geodrop").unwrap();
    cmd.args(["publish", "/nonexistent/roof_a.zip"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_status_rejects_bad_database_url() {
    let mut cmd = Command::cargo_bin("geodrop").unwrap();
    cmd.args(["status", "--database-url", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}
