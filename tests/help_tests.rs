use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("scoutclaw").unwrap()
}

#[test]
fn test_main_help_shows_about_and_commands() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("scoutclaw"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("version"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--help"));
}

#[test]
fn test_help_command_same_as_help_flag() {
    let output1 = cmd().arg("--help").output().unwrap();
    let stdout1 = String::from_utf8_lossy(&output1.stdout);

    let output2 = cmd().arg("help").output().unwrap();
    let stdout2 = String::from_utf8_lossy(&output2.stdout);

    assert!(stdout1.contains("scoutclaw"));
    assert!(stdout2.contains("scoutclaw"));
    assert!(stdout1.contains("Commands:"));
    assert!(stdout2.contains("Commands:"));
}

#[test]
fn test_run_command_help_lists_flags() {
    cmd()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--instructions"))
        .stdout(predicate::str::contains("--first-run-at"))
        .stdout(predicate::str::contains("--interval"))
        .stdout(predicate::str::contains("--model"))
        .stdout(predicate::str::contains("--api-key"))
        .stdout(predicate::str::contains("--base-url"))
        .stdout(predicate::str::contains("--max-iterations"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_version_command_help() {
    cmd()
        .args(["version", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Display version information"));
}

#[test]
fn test_help_shows_usage_line() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .code(0)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_no_command_prints_help() {
    cmd()
        .assert()
        .success()
        .stdout(predicate::str::contains("Commands:"))
        .stdout(predicate::str::contains("run"));
}
