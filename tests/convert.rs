use assert_cmd::Command;
use inmfuck::{code_to_phrase, PhraseTable};
use predicates::prelude::*;

fn cargo_bin() -> Command { Command::cargo_bin("inmfuck").unwrap() }

#[test]
fn to_bf_converts_phrases() {
    cargo_bin()
        .args(["to-bf", "やりますねぇ！やりますねぇ！で、出ますよ"])
        .assert()
        .success()
        .stdout("++.\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn to_bf_refuses_unbalanced_programs() {
    let phrases = code_to_phrase(PhraseTable::canonical(), "++++++[-").text;
    cargo_bin()
        .args(["to-bf", &phrases])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("unmatched opening bracket").and(predicate::str::contains("at position 6")));
}

#[test]
fn to_bf_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("prog.bf");
    cargo_bin()
        .args(["to-bf", "--output"])
        .arg(&out)
        .arg("まずうちさぁ王道を征く屋上あんだけど")
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("wrote"));
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "[-]");
}

#[test]
fn to_inm_converts_codes() {
    cargo_bin()
        .args(["to-inm", "+[-]"])
        .assert()
        .success()
        .stdout("やりますねぇ！まずうちさぁ王道を征く屋上あんだけど\n")
        .stderr(predicate::str::is_empty());
}

#[test]
fn to_inm_reports_each_invalid_instruction() {
    cargo_bin()
        .args(["to-inm", "+a+b"])
        .assert()
        .success()
        .stdout("やりますねぇ！やりますねぇ！\n")
        .stderr(
            predicate::str::contains("invalid Brainfuck instruction 'a' at position 1")
                .and(predicate::str::contains("invalid Brainfuck instruction 'b' at position 3")),
        );
}

#[test]
fn to_inm_then_run_roundtrip() {
    let code = format!("{}.", "+".repeat(66));
    let assert = cargo_bin().args(["to-inm", &code]).assert().success();
    let phrases = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");

    let assert = cargo_bin().args(["to-bf", phrases.trim_end()]).assert().success();
    let back = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    assert_eq!(back.trim_end(), code);

    cargo_bin()
        .args(["run", phrases.trim_end()])
        .assert()
        .success()
        .stdout("B\n");
}
