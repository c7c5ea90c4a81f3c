use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn wp2vite() -> Command {
    Command::cargo_bin("wp2vite").unwrap()
}

#[test]
fn test_help_lists_commands() {
    wp2vite()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_missing_config_fails_without_writing() {
    let dir = TempDir::new().unwrap();
    let manifest = r#"{
  "name": "cra-app",
  "dependencies": { "react": "^18.2.0", "react-scripts": "5.0.1" },
  "scripts": { "start": "react-scripts start" }
}"#;
    fs::write(dir.path().join("package.json"), manifest).unwrap();

    wp2vite()
        .arg("migrate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--config"));

    assert!(!dir.path().join("vite.config.js").exists());
    assert!(!dir.path().join("index.html").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("package.json")).unwrap(),
        manifest
    );
}

#[test]
fn test_missing_manifest_fails() {
    let dir = TempDir::new().unwrap();

    wp2vite()
        .args(["inspect"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));
}

#[test]
fn test_malformed_settings_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("package.json"), r#"{"name":"x"}"#).unwrap();
    fs::write(dir.path().join("wp2vite.toml"), "mode = [").unwrap();

    wp2vite()
        .arg("migrate")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("wp2vite.toml"));
}
