#![allow(deprecated)] // TODO: move from cargo_bin to the cargo_bin_cmd! macro

use assert_cmd::Command;
use predicates::prelude::*;

fn clusterflow() -> Command {
    let mut cmd = Command::cargo_bin("clusterflow").unwrap();
    cmd.env_remove("CLUSTERFLOW_CONFIG_PATH")
        .env_remove("CLUSTERFLOW_PROVIDER")
        .env_remove("CLUSTERFLOW_CLUSTER_NAME");
    cmd
}

/// Help lists every subcommand
#[test]
fn test_cli_help() {
    clusterflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kubernetes clusters"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("down"))
        .stdout(predicate::str::contains("is-up"))
        .stdout(predicate::str::contains("version"));
}

#[test]
fn test_cli_version() {
    clusterflow()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "clusterflow {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_up_help_lists_overrides() {
    clusterflow()
        .args(["up", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--provider"))
        .stdout(predicate::str::contains("--retry-on-tf-failure"))
        .stdout(predicate::str::contains("--break-on-upfail"))
        .stdout(predicate::str::contains("--extra-vars"));
}

#[test]
fn test_invalid_command() {
    clusterflow()
        .arg("invalid-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

/// Without a config file anywhere the run stops before touching any tool
#[test]
fn test_missing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    clusterflow()
        .current_dir(temp_dir.path())
        .env("HOME", temp_dir.path())
        .env("XDG_CONFIG_HOME", temp_dir.path().join(".config"))
        .arg("up")
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn test_config_without_cluster_name_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("clusterflow.yaml");
    std::fs::write(&path, "deployer:\n  target_provider: vpc\n").unwrap();

    clusterflow()
        .current_dir(temp_dir.path())
        .arg("--config")
        .arg(&path)
        .arg("down")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cluster_name is required"));
}

#[test]
fn test_malformed_extra_var_is_rejected() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("clusterflow.yaml");
    std::fs::write(&path, "common:\n  cluster_name: ci-k8s\n").unwrap();

    clusterflow()
        .current_dir(temp_dir.path())
        .args(["up", "--extra-vars", "novalue", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid extra var 'novalue'"));
}
