use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn cargo_bin() -> Command { Command::cargo_bin("bf").unwrap() }

#[test]
fn lists_instructions_with_offsets() {
    cargo_bin()
        .args(["tokens", "a [-]"])
        .assert()
        .success()
        .stdout("<Instruction.LoopStart pos[2]>\n<Instruction.DecrementCell pos[3]>\n<Instruction.LoopEnd pos[4]>\n");
}

#[test]
fn lists_instructions_from_file() {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "+\n.").unwrap();
    cargo_bin()
        .arg("tokens").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("<Instruction.IncrementCell pos[0]>\n<Instruction.Output pos[2]>\n");
}

#[test]
fn reports_unbalanced_brackets_after_listing() {
    cargo_bin()
        .args(["tokens", "[["])
        .assert()
        .failure()
        .stdout(predicate::str::contains("<Instruction.LoopStart pos[1]>"))
        .stderr(predicate::str::contains("unmatched bracket '['"));
}

#[test]
fn file_and_code_together_is_a_usage_error() {
    cargo_bin()
        .args(["tokens", "--file", "x.bf", "+"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot use positional code together with --file"));
}
