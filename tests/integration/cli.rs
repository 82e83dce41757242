#[path = "common/mod.rs"]
mod common;

use std::fs;

use assert_cmd::Command;
use common::recording_worker;
use predicates::boolean::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::tempdir;

fn launcher() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chart-export-server"));
    cmd.env_remove("CHART_EXPORT_WORKER_PROGRAM")
        .env_remove("CHART_EXPORT_WORKER_SCRIPT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_prints_usage_and_exits_zero() {
    launcher()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("start"));
}

#[test]
fn start_help_lists_flags() {
    launcher()
        .arg("start")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("--hostname").and(contains("--port")));
}

#[test]
fn version_prints_crate_version() {
    launcher()
        .arg("--version")
        .assert()
        .success()
        .stdout(contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_fails_without_spawning() {
    let temp = tempdir().expect("failed to create tempdir");
    let (script, args_file) = recording_worker(temp.path(), 0);

    launcher()
        .env("CHART_EXPORT_WORKER_PROGRAM", "/bin/sh")
        .env("CHART_EXPORT_WORKER_SCRIPT", &script)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Usage"));

    assert!(!args_file.exists(), "worker must not be spawned");
}

#[test]
fn unrecognized_subcommand_fails_without_spawning() {
    let temp = tempdir().expect("failed to create tempdir");
    let (script, args_file) = recording_worker(temp.path(), 0);

    launcher()
        .env("CHART_EXPORT_WORKER_PROGRAM", "/bin/sh")
        .env("CHART_EXPORT_WORKER_SCRIPT", &script)
        .arg("serve")
        .arg("-p")
        .arg("8080")
        .assert()
        .failure()
        .code(2);

    assert!(!args_file.exists(), "worker must not be spawned");
}

#[test]
fn invalid_port_is_rejected() {
    let temp = tempdir().expect("failed to create tempdir");
    let (script, args_file) = recording_worker(temp.path(), 0);

    launcher()
        .arg("start")
        .arg("--worker-program")
        .arg("/bin/sh")
        .arg("--worker-script")
        .arg(&script)
        .arg("--port")
        .arg("0")
        .assert()
        .failure()
        .code(2);

    assert!(!args_file.exists(), "worker must not be spawned");
}

#[test]
fn unreadable_config_file_exits_one() {
    let temp = tempdir().expect("failed to create tempdir");
    let (script, args_file) = recording_worker(temp.path(), 0);
    let missing = temp.path().join("missing.yaml");

    launcher()
        .arg("start")
        .arg("--config")
        .arg(&missing)
        .arg("--worker-program")
        .arg("/bin/sh")
        .arg("--worker-script")
        .arg(&script)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Failed to read config file"));

    assert!(!args_file.exists(), "worker must not be spawned");
}

#[test]
fn malformed_config_file_exits_one() {
    let temp = tempdir().expect("failed to create tempdir");
    let config = temp.path().join("worker.yaml");
    fs::write(&config, "port: [not, a, port]\n").expect("failed to write config");

    launcher()
        .arg("start")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .code(1)
        .stderr(contains("Invalid YAML format"));
}
