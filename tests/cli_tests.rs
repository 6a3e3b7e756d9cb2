//! CLI integration tests.

use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn modelplane() -> Command {
    let mut cmd = cargo_bin_cmd!("modelplane");
    cmd.env_remove("GITHUB_TOKEN");
    cmd
}

fn write_config(dir: &Path, extra: &str) -> std::path::PathBuf {
    let models = dir.join("models");
    fs::create_dir_all(&models).unwrap();
    let path = dir.join("modelplane.toml");
    let toml = format!(
        "models_dir = {:?}\nstate_file = {:?}\n\n[containers]\nprofile = \"overlay\"\n{extra}",
        models.display().to_string(),
        dir.join("state/containers.json").display().to_string(),
    );
    fs::write(&path, toml).unwrap();
    path
}

#[test]
fn test_help() {
    modelplane()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("modelplane"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("models"))
        .stdout(predicate::str::contains("sweep"));
}

#[test]
fn test_version() {
    modelplane()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("modelplane"));
}

#[test]
fn test_unknown_subcommand_fails() {
    modelplane().arg("trade").assert().failure();
}

#[test]
fn test_check_config_reports_summary() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    modelplane()
        .args(["--color", "never", "check", "config", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("overlay"));
}

#[test]
fn test_check_config_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "port_range_start = 9000\nport_range_end = 8000\n");

    modelplane()
        .args(["check", "config", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("port_range_end"));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();

    modelplane()
        .args(["check", "config", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_check_config_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    let output = modelplane()
        .args(["--json", "check", "config", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["command"], "check.config");
    assert_eq!(value["profile"], "overlay");
    assert!(value["remote_repo"].is_null());
}

#[test]
fn test_check_health_passes_for_existing_directories() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    modelplane()
        .args(["--color", "never", "check", "health", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("models_dir (critical)"))
        .stdout(predicate::str::contains("Health check passed"));
}

#[test]
fn test_check_health_fails_without_models_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    fs::remove_dir_all(dir.path().join("models")).unwrap();

    modelplane()
        .args(["check", "health", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Health check failed"));
}

#[test]
fn test_models_lists_local_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");
    let models = dir.path().join("models");
    fs::create_dir_all(models.join("fire/1")).unwrap();
    fs::write(models.join("churn.h5"), b"weights").unwrap();
    fs::write(models.join(".hidden"), b"x").unwrap();

    let output = modelplane()
        .args(["--json", "models", "--config"])
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = value["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["churn", "fire"]);
    assert_eq!(value["models"][0]["source"], "local");
}

#[test]
fn test_models_on_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), "");

    modelplane()
        .args(["--color", "never", "models", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No models found"));
}
