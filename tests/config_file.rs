use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bf").unwrap();
    cmd.env_remove("BF_BITS")
        .env_remove("BF_MAX_STEPS")
        .env_remove("BF_TIMEOUT_MS")
        .timeout(Duration::from_secs(5));
    cmd
}

fn config(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn bits_from_config_file() {
    let cfg = config("[interpreter]\nbits = 16\n");
    cargo_bin()
        .env("BF_CONFIG", cfg.path())
        .args(["eval", "--", "-."])
        .assert()
        .success()
        .stdout("\u{ffff}");
}

#[test]
fn flag_overrides_config_file() {
    let cfg = config("[interpreter]\nbits = 16\n");
    cargo_bin()
        .env("BF_CONFIG", cfg.path())
        .args(["eval", "--bits", "8", "--", "-."])
        .assert()
        .success()
        .stdout("\u{ff}");
}

#[test]
fn max_steps_from_config_file() {
    let cfg = config("[interpreter]\nmax_steps = 20\n");
    cargo_bin()
        .env("BF_CONFIG", cfg.path())
        .args(["eval", "+[]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (20)"));
}
