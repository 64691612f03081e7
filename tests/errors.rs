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
fn unmatched_close_bracket_reports_line_and_column() {
    let tf = source_file("++]");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("syntax error at 1:3")
                .and(predicate::str::contains("expected '[' before ']'")),
        );
}

#[test]
fn unmatched_open_bracket_reports_end_of_input() {
    let tf = source_file("+[+");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("expected ']' before end of input"));
}

#[test]
fn syntax_error_shows_source_line_with_caret() {
    let tf = source_file("+++]\n");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("+++]").and(predicate::str::contains("^")));
}

#[test]
fn program_output_stays_off_stderr() {
    let tf = source_file("+++.");
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run")
        .arg(tf.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("\u{3}").not());
}
