//! Argument parsing, help, version, and offline command behaviour.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn kitchen(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("kitchen-marathon"));
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("KITCHEN_MARATHON_CONFIG")
        .env_remove("KITCHEN_INSTANCE");
    cmd
}

fn tempdir() -> TempDir {
    TempDir::new().expect("tempdir")
}

#[test]
fn test_no_args_shows_help() {
    let dir = tempdir();
    kitchen(&dir).assert().code(2).stderr(predicate::str::contains(
        "Ephemeral test instances on Marathon/Mesos",
    ));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    let dir = tempdir();
    for value in ["1", "true", "yes", "0", ""] {
        kitchen(&dir)
            .arg("version")
            .env("NO_COLOR", value)
            .assert()
            .success()
            .stdout(predicate::str::contains("kitchen-marathon"));
    }
}

#[test]
fn test_no_args_without_no_color_shows_help() {
    let dir = tempdir();
    kitchen(&dir)
        .env_remove("NO_COLOR")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_lists_lifecycle_commands() {
    let dir = tempdir();
    kitchen(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("converge"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("test"));
}

#[test]
fn test_version_command() {
    let dir = tempdir();
    kitchen(&dir)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(concat!(
            "kitchen-marathon ",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_json_is_valid() {
    let dir = tempdir();
    let output = kitchen(&dir)
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_show_json_on_fresh_directory_is_empty_object() {
    let dir = tempdir();
    let output = kitchen(&dir)
        .args(["show", "--json", "--instance", "web01"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value, serde_json::json!({}));
}

#[test]
fn test_show_reads_recorded_state() {
    let dir = tempdir();
    std::fs::create_dir_all(dir.path().join(".kitchen")).expect("mkdir");
    std::fs::write(
        dir.path().join(".kitchen/web01.json"),
        r#"{"app_id": "/kitchen/web01-abc", "hostname": "agent-1.mesos", "port": 31022}"#,
    )
    .expect("write state");

    kitchen(&dir)
        .args(["show", "--instance", "web01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/kitchen/web01-abc"))
        .stdout(predicate::str::contains("31022"));
}

#[test]
fn test_instance_from_env() {
    let dir = tempdir();
    std::fs::create_dir_all(dir.path().join(".kitchen")).expect("mkdir");
    std::fs::write(
        dir.path().join(".kitchen/from-env.json"),
        r#"{"app_id": "/kitchen/from-env-1"}"#,
    )
    .expect("write state");

    kitchen(&dir)
        .args(["show", "--json"])
        .env("KITCHEN_INSTANCE", "from-env")
        .assert()
        .success()
        .stdout(predicate::str::contains("/kitchen/from-env-1"));
}

#[test]
fn test_converge_before_create_fails() {
    let dir = tempdir();
    kitchen(&dir)
        .args(["converge", "--instance", "web01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("kitchen-marathon create"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempdir();
    std::fs::write(
        dir.path().join(".kitchen-marathon.yml"),
        "marathon_host: marathon.local:8080\n",
    )
    .expect("write config");

    kitchen(&dir)
        .args(["create", "--instance", "web01"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_unknown_destroy_strategy_rejected() {
    let dir = tempdir();
    kitchen(&dir)
        .args(["test", "--destroy", "sometimes"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sometimes"));
}

#[test]
fn test_json_flag_only_on_document_commands() {
    let dir = tempdir();
    kitchen(&dir)
        .args(["create", "--json", "--instance", "web01"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--json"));
}
