//! End-to-end tests for `fleetboot bootstrap` against a fake `ssh` on PATH.
//!
//! The fake client answers `-V` probes, records the command it was asked to
//! run per host and refuses connections to hosts named `bad*`.

#![cfg(unix)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FAKE_SSH: &str = r#"#!/bin/sh
if [ "$1" = "-V" ]; then
  echo "OpenSSH_fake" >&2
  exit 0
fi
while [ "$#" -gt 0 ] && [ "$1" != "--" ]; do
  shift
done
shift
host="$1"
command="$2"
case "$host" in
  bad*)
    echo "ssh: connect to host $host port 22: Connection refused" >&2
    exit 255
    ;;
esac
printf '%s' "$command" > "$(dirname "$0")/$host.cmd"
echo "Chef Client finished on $host"
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("temp dir");
        let ssh = dir.path().join("ssh");
        std::fs::write(&ssh, FAKE_SSH).expect("write fake ssh");
        std::fs::set_permissions(&ssh, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        std::fs::write(dir.path().join("validation.pem"), "VALIDATOR KEY\n").expect("write key");
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn recorded_command(&self, host: &str) -> Option<String> {
        std::fs::read_to_string(self.path().join(format!("{host}.cmd"))).ok()
    }

    fn validator(&self) -> PathBuf {
        self.path().join("validation.pem")
    }

    fn fleetboot(&self) -> Command {
        let path = format!(
            "{}:{}",
            self.path().display(),
            std::env::var("PATH").unwrap_or_default()
        );
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fleetboot"));
        cmd.env("NO_COLOR", "1")
            .env("PATH", path)
            .env("FLEETBOOT_CONFIG", self.path().join("config.yaml"))
            .env_remove("FLEETBOOT_TEMPLATES")
            .env_remove("FLEETBOOT_SSH_PASSWORD")
            .env_remove("RUST_LOG")
            .args(["bootstrap", "--ssh-user", "ubuntu", "--validator-path"])
            .arg(self.validator());
        cmd
    }
}

#[test]
fn test_bootstrap_all_hosts_ok_exits_zero() {
    let fx = Fixture::new();
    fx.fleetboot()
        .args(["web1", "web2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("web1"))
        .stdout(predicate::str::contains("2 ok, 0 failed"));

    let command = fx.recorded_command("web1").expect("web1 was dispatched");
    assert!(command.starts_with("sudo bash -c '"), "got: {command}");
    assert!(command.contains("node_name \"web1\""), "got: {command}");
    assert!(command.contains("VALIDATOR KEY"), "got: {command}");
}

#[test]
fn test_bootstrap_partial_failure_exits_two_with_buckets() {
    let fx = Fixture::new();
    let output = fx
        .fleetboot()
        .args(["web1", "bad1", "--json"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["ok"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["ok"][0]["host"], "web1");
    assert_eq!(value["error"][0]["host"], "bad1");
    assert_eq!(value["error"][0]["exit_code"], 255);
    assert!(
        value["error"][0]["stderr"]
            .as_str()
            .unwrap()
            .contains("Connection refused")
    );
}

#[test]
fn test_bootstrap_failed_host_reported_on_stderr() {
    let fx = Fixture::new();
    fx.fleetboot()
        .args(["web1", "bad1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("bad1: exit 255"));
}

#[test]
fn test_bootstrap_duplicate_hosts_run_once() {
    let fx = Fixture::new();
    let output = fx
        .fleetboot()
        .args(["web1", "web1", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["ok"].as_array().map(Vec::len), Some(1));
    assert_eq!(value["error"].as_array().map(Vec::len), Some(0));
}

#[test]
fn test_bootstrap_no_sudo_and_run_list_reach_the_host() {
    let fx = Fixture::new();
    fx.fleetboot()
        .args(["web1", "--no-sudo", "--run-list", "role[base],recipe[app]"])
        .assert()
        .success();

    let command = fx.recorded_command("web1").expect("web1 was dispatched");
    assert!(command.starts_with("bash -c '"), "got: {command}");
    assert!(command.contains("role[base]"), "got: {command}");
    assert!(command.contains("recipe[app]"), "got: {command}");
}
