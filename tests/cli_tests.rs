#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

const DIAMOND: &str = "add A fixed 2\n\
                       add B fixed 3 A\n\
                       add C fixed 4 A\n\
                       add D fixed 5 B,C\n";

#[test]
fn cli_reports_baseline_critical_path() {
    run_cli(&format!("{DIAMOND}baseline A D\nquit\n"))
        .success()
        .stdout(str_contains("Critical path: A->C->D"))
        .stdout(str_contains("Project finish: 11.00"));
}

#[test]
fn cli_rejects_unknown_distribution() {
    run_cli("add A lognormal 1,2\nquit\n")
        .success()
        .stdout(str_contains("unsupported distribution kind 'lognormal'"));
}

#[test]
fn cli_rejects_cycles_and_keeps_going() {
    run_cli("add A fixed 1\nadd B fixed 1 A\nadd A fixed 1 B\nshow\nquit\n")
        .success()
        .stdout(str_contains("cycle detected"))
        .stdout(str_contains("| B    |"));
}

#[test]
fn cli_runs_simulation_and_risk() {
    let script = format!(
        "{DIAMOND}add B triangular 2,3,9 A\nsamples 200\nseed 5\nsimulate\nrisk 0.9\nnetwork build\nsummary\nquit\n"
    );
    run_cli(&script)
        .success()
        .stdout(str_contains("Simulated 200 samples from A to D (0 unreachable)."))
        .stdout(str_contains("Value at risk"))
        .stdout(str_contains("Network built: 8 variables"))
        .stdout(str_contains("samples=200"));
}

#[test]
fn cli_requires_simulation_before_risk() {
    run_cli(&format!("{DIAMOND}risk\nquit\n"))
        .success()
        .stdout(str_contains("run a simulation first"));
}

#[test]
fn cli_delete_command_removes_activity() {
    run_cli(&format!("{DIAMOND}delete B\nquit\n"))
        .success()
        .stdout(str_contains("Deleted activity B."));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "add A fixed 4 - Persisted\nsave json {path}\nadd T fixed 1 - Temporary\nload json {path}\nshow\nquit\n"
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Activities loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Activities loaded from")
        .last()
        .unwrap_or_default();
    assert!(after_reload.contains("Persisted"));
    assert!(
        !after_reload.contains("Temporary"),
        "temporary activity should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_config_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!("seed 99\nconfig save {path}\nseed 1\nconfig load {path}\nconfig show\nquit\n");
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let shown = output.split("Config loaded from").last().unwrap_or_default();
    assert!(shown.contains("Seed               : 99"), "{shown}");
}
