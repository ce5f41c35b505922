use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command { Command::cargo_bin("inmfuck").unwrap() }

fn two_then_output() -> &'static str { "やりますねぇ！やりますねぇ！で、出ますよ" }

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn run_phrases_emits_code_point_two() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", two_then_output()])
        .assert()
        .success()
        .stdout("\u{2}\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_file_is_trimmed_before_tokenizing() {
    let tf = read_to_tempfile(&format!("\n  {}\n\n", two_then_output()));
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .arg("run").arg("--file").arg(tf.path())
        .assert()
        .success()
        .stdout("\u{2}\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn run_brainfuck_with_flag() {
    let hi = format!("{}.+.", "+".repeat(72));
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--bf", &hi])
        .assert()
        .success()
        .stdout("HI\n");
}

#[test]
fn unrecognized_fragments_are_reported_and_skipped() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", &format!("xy{}", two_then_output())])
        .assert()
        .success()
        .stdout("\u{2}\n")
        .stderr(
            predicate::str::contains("unrecognized phrase at position 0")
                .and(predicate::str::contains("unrecognized phrase at position 1"))
                .and(predicate::str::contains("2 unrecognized phrase fragment(s) in total")),
        );
}

#[test]
fn unmatched_open_bracket_is_reported_and_never_runs() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--bf", "++++++[-."])
        .assert()
        .code(1)
        .stdout("\n")
        .stderr(
            predicate::str::contains("unmatched opening bracket")
                .and(predicate::str::contains("at position 6")),
        );
}

#[test]
fn unmatched_close_bracket_is_reported() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "屋上あんだけど"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched closing bracket").and(predicate::str::contains("at position 0")));
}

#[test]
fn reads_from_stdin_and_echoes_char() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--bf", ",."])
        .write_stdin("Z")
        .assert()
        .success()
        .stdout("Z\n");
}

#[test]
fn exhausted_input_zero_fills_and_warns() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--bf", "+,[+.]"])
        .write_stdin("")
        .assert()
        .success()
        .stdout("\n")
        .stderr(predicate::str::contains("input exhausted at instruction 1"));
}

#[test]
fn trace_prints_table_without_output() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--trace", "ンアッー！"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("STEP | IP")
                .and(predicate::str::contains("Moved pointer head to index 1")),
        )
        .stderr(predicate::str::is_empty());
}

#[test]
fn pointer_wraps_at_both_ends_of_the_tape() {
    // Cell 0 gets 'A'; '<' wraps to the last cell, which gets 'B'; '>' wraps back.
    let code = format!("{}<{}.>.", "+".repeat(65), "+".repeat(66));
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .args(["run", "--bf", &code])
        .assert()
        .success()
        .stdout("BA\n");
}
