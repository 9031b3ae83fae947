use assert_cmd::Command;
use predicates::prelude::*;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn test_unmatched_close_bracket_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("eval").arg("]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unmatched bracket ']'").and(predicate::str::contains("at offset 0")))
    .stdout(predicate::str::is_empty());
}

#[test]
fn test_unmatched_open_bracket_error() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("eval").arg("+[+")
    .assert()
    .failure()
    .stderr(predicate::str::contains("unmatched bracket '['").and(predicate::str::contains("at offset 1")));
}

#[test]
fn test_caret_points_at_offending_offset() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("eval").arg("ab]")
    .assert()
    .failure()
    .stderr(predicate::str::contains("  ab]\n    ^"));
}

#[test]
fn test_no_subcommand_prints_usage() {
    cargo_bin()
    .timeout(Duration::from_secs(2))
    .assert()
    .code(2)
    .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_exits_zero() {
    cargo_bin()
    .timeout(Duration::from_secs(2)).arg("run").arg("--help")
    .assert()
    .success()
    .stderr(predicate::str::contains("run [OPTIONS] <FILE>..."));
}
