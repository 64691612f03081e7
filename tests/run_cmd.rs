use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("bfrun").unwrap()
}

fn source_file(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn runs_program_from_file() {
    let tf = source_file("+++.");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{3}");
}

#[test]
fn comments_in_source_are_ignored() {
    let tf = source_file("three pluses and a dot:\n+++.\n");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .success()
        .stdout("\u{3}");
}

#[test]
fn missing_file_argument_exits_with_usage() {
    cargo_bin()
        .arg("run")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unreadable_source_file_fails() {
    cargo_bin()
        .arg("run")
        .arg("no/such/file.bf")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to read source file"));
}
