//! 命令行端到端测试

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CONFIG: &str = r#"
[unit.ACE_1]
drive_stepper = "ace_drive"
selector_stepper = "ace_selector"
home_pin = "PA1"

[lane.lane1]
unit = "ACE_1"
index = 1
tension = "ACE_tension1"

[lane.lane2]
unit = "ACE_1"
index = 2

[tension.ACE_tension1]
tension_pin = "PB1"
assist_mode = "active"
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn cli() -> Command {
    Command::cargo_bin("ace-cli").unwrap()
}

#[test]
fn test_check_valid_config() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "ace.toml", CONFIG);

    cli()
        .arg("check")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("unit ACE_1: lane1, lane2"))
        .stdout(predicate::str::contains("tension ACE_tension1: active mode"));
}

#[test]
fn test_check_rejects_dangling_reference() {
    let dir = TempDir::new().unwrap();
    let config = write(
        &dir,
        "ace.toml",
        &CONFIG.replace("unit = \"ACE_1\"\nindex = 2", "unit = \"ACE_9\"\nindex = 2"),
    );

    cli().arg("check").arg(&config).assert().failure();
}

#[test]
fn test_run_script() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "ace.toml", CONFIG);
    let script = write(
        &dir,
        "script.json",
        r#"{
            "name": "assist",
            "commands": [
                {"type": "line", "line": "activate lane1"},
                {"type": "line", "line": "ENABLE_TENSION_ASSIST TENSION=ACE_tension1"},
                {"type": "line", "line": "printing on"},
                {"type": "line", "line": "edge PB1 1"},
                {"type": "line", "line": "feeds ace_drive"}
            ]
        }"#,
    );

    cli()
        .arg("run")
        .arg(&config)
        .arg(&script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tension assist enabled for ACE_tension1 (active mode)"))
        .stdout(predicate::str::contains("[10.0]"));
}

#[test]
fn test_run_script_reports_failure() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "ace.toml", CONFIG);
    let script = write(
        &dir,
        "script.json",
        r#"{"name": "bad", "commands": [{"type": "line", "line": "HOME_UNIT UNIT=ACE_9"}]}"#,
    );

    cli()
        .env_remove("RUST_LOG")
        .arg("run")
        .arg(&config)
        .arg(&script)
        .assert()
        .failure()
        .stdout(predicate::str::contains("Running script 'bad' (1 commands)"))
        .stdout(predicate::str::contains("Script command 1 failed: No unit named 'ACE_9'"));
}
