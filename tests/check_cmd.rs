use assert_cmd::Command;
use predicates::prelude::*;

fn cargo_bin() -> Command { Command::cargo_bin("inmfuck").unwrap() }

#[test]
fn valid_program_passes() {
    cargo_bin()
        .args(["check", "--bf", "+[>[-]<-]"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("ok (9 instructions)"));
}

#[test]
fn innermost_open_bracket_is_cited() {
    cargo_bin()
        .args(["check", "--bf", "[+[-[]"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched opening bracket").and(predicate::str::contains("at position 2")));
}

#[test]
fn phrases_are_checked_after_decoding() {
    cargo_bin()
        .args(["check", "屋上あんだけど"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unmatched closing bracket"));
}
