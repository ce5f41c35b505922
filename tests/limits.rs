use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use std::time::Duration;

fn cargo_bin() -> Command {
    Command::cargo_bin("inmfuck").unwrap()
}

fn infinite_bf() -> &'static str {
    "+[]" // increments to 1, then [] does nothing forever (infinite loop)
}

fn read_to_tempfile(content: &str) -> tempfile::NamedTempFile {
    let mut tf = tempfile::NamedTempFile::new().expect("tempfile");
    write!(tf, "{}", content).unwrap();
    tf
}

#[test]
fn test_run_timeout_infinite_flag() {
    let tf = read_to_tempfile(infinite_bf());
    cargo_bin()
        .arg("run").arg("--bf").arg("--timeout").arg("100").arg("--file").arg(tf.path())
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_step_limit_infinite_flag() {
    cargo_bin()
        .args(["run", "--bf", "--max-steps", "50", infinite_bf()])
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"))
        .stdout(predicate::str::contains("Execution aborted").not());
}

#[test]
fn test_run_step_limit_from_env() {
    cargo_bin()
        .env("INM_MAX_STEPS", "50")
        .env_remove("INM_TIMEOUT_MS")
        .args(["run", "--bf", infinite_bf()])
        .timeout(Duration::from_secs(2))
        .assert()
        .failure()
        .stderr(predicate::str::contains("step limit exceeded (50)"));
}

#[test]
fn test_flag_overrides_env() {
    cargo_bin()
        .env("INM_MAX_STEPS", "1")
        .args(["run", "--bf", "--max-steps", "1000", "+++."])
        .timeout(Duration::from_secs(2))
        .assert()
        .success()
        .stdout("\u{3}\n");
}

#[test]
fn test_repl_bare_timeout_infinite() {
    cargo_bin()
        .timeout(Duration::from_secs(2))
        .env_remove("INM_MAX_STEPS")
        .env("INM_TIMEOUT_MS", "100")
        .args(["repl", "--bf"])
        .write_stdin(infinite_bf())
        .assert()
        .stderr(predicate::str::contains("Execution aborted").and(predicate::str::contains("timeout")))
        .stdout(predicate::str::contains("Execution aborted").not());
}
