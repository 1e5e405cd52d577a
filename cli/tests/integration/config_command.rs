//! Integration tests for `fleetboot config` command.
//!
//! All tests set `FLEETBOOT_CONFIG` to a temp path so they never read
//! `~/.fleetboot/config.yaml`.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fleetboot() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleetboot"));
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Returns a `TempDir` and the path string for a config file inside it.
fn temp_config_path() -> (TempDir, String) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir
        .path()
        .join("config.yaml")
        .to_string_lossy()
        .into_owned();
    (dir, path)
}

#[test]
fn test_config_help_shows_show_and_path_subcommands() {
    fleetboot()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("path"));
}

#[test]
fn test_config_path_prints_env_override() {
    let (_dir, path) = temp_config_path();
    fleetboot()
        .args(["config", "path"])
        .env("FLEETBOOT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains(path.as_str()));
}

#[test]
fn test_config_show_no_config_file_uses_defaults() {
    let (_dir, path) = temp_config_path();
    fleetboot()
        .args(["config", "show"])
        .env("FLEETBOOT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("11.4.0"))
        .stdout(predicate::str::contains("_default"))
        .stdout(predicate::str::contains("FLEETBOOT_CONFIG"));
}

#[test]
fn test_config_show_does_not_create_file() {
    let (_dir, path) = temp_config_path();
    fleetboot()
        .args(["config", "show"])
        .env("FLEETBOOT_CONFIG", &path)
        .assert()
        .success();
    assert!(
        !std::path::Path::new(&path).exists(),
        "show must not create the config file"
    );
}

#[test]
fn test_config_show_redacts_password() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "ssh_user: deploy\nssh_password: hunter2\n").expect("write");
    fleetboot()
        .args(["config", "show"])
        .env("FLEETBOOT_CONFIG", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_show_json_is_valid() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "ssh_user: deploy\nrun_list: [\"role[web]\"]\n").expect("write");
    let output = fleetboot()
        .args(["config", "show", "--json"])
        .env("FLEETBOOT_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["config"]["ssh_user"], "deploy");
    assert_eq!(value["config"]["run_list"][0], "role[web]");
}

#[test]
fn test_config_show_invalid_yaml_fails() {
    let (_dir, path) = temp_config_path();
    std::fs::write(&path, "ssh_timeout: [1, 2]\n").expect("write");
    fleetboot()
        .args(["config", "show"])
        .env("FLEETBOOT_CONFIG", &path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("config.yaml"));
}
