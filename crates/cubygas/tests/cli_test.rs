//! Integration tests for the `cubygas` CLI binary.
//!
//! Argument parsing, config handling and end-to-end polling against a
//! wiremock cloud. Config directories always point at a temp dir.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `cubygas` binary with env isolation.
fn cubygas_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("cubygas");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("CUBYGAS_PROFILE")
        .env_remove("CUBYGAS_EMAIL")
        .env_remove("CUBYGAS_DEVICES")
        .env_remove("CUBYGAS_BASE_URL")
        .env_remove("CUBYGAS_OUTPUT")
        .env_remove("CUBYGAS_TIMEOUT")
        .env_remove("CUBYGAS_PASSWORD");
    cmd
}

/// Command preconfigured to poll `server` as me@example.com.
fn cloud_cmd(home: &TempDir, server: &MockServer, devices: &str) -> assert_cmd::Command {
    let mut cmd = cubygas_cmd(home);
    cmd.env("CUBYGAS_PASSWORD", "pw").args([
        "--email",
        "me@example.com",
        "--device",
        devices,
        "--base-url",
        &format!("{}/api/v2", server.uri()),
    ]);
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_cloud() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/token/me@example.com"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "token": "tkn", "expiration": 3600 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/history/gas/level/A1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "level": 72.5, "timestamp": "2024-01-01T00:00:00Z" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/history/gas/level/B2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = cubygas_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("poll")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("validate"))
            .and(predicate::str::contains("sensors")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cubygas"));
}

#[test]
fn test_completions_bash() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["-o", "xml", "poll"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_poll_without_config_is_usage_error() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .arg("poll")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cubygas config init"));
}

#[test]
fn test_unknown_profile() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["--profile", "cabin", "poll"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cabin"));
}

#[test]
fn test_config_set_and_profiles() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["config", "set", "email", "me@example.com"])
        .assert()
        .success();
    cubygas_cmd(&home)
        .args(["config", "set", "device_ids", "A1,B2"])
        .assert()
        .success();
    cubygas_cmd(&home)
        .args(["config", "set", "password", "hunter2"])
        .assert()
        .success();

    cubygas_cmd(&home)
        .args(["config", "profiles"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default *"));

    cubygas_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("email = \"me@example.com\"")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_config_set_unknown_key() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["config", "set", "colour", "red"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_use_missing_profile() {
    let home = TempDir::new().unwrap();
    cubygas_cmd(&home)
        .args(["config", "use", "cabin"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cabin"));
}

const BROKEN_CONFIG: &str = r#"[defaults]
timeout = "ten"

[profiles.default]
email = "me@example.com"
password = "hunter2"
device_ids = ["A1"]
"#;

fn write_broken_config(home: &TempDir) -> std::path::PathBuf {
    let dir = home.path().join(".config").join("cubygas");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, BROKEN_CONFIG).unwrap();
    path
}

#[test]
fn test_config_set_keeps_unparsable_file() {
    let home = TempDir::new().unwrap();
    let path = write_broken_config(&home);

    cubygas_cmd(&home)
        .args(["config", "set", "email", "other@example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
    cubygas_cmd(&home)
        .args(["config", "use", "default"])
        .assert()
        .code(1);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), BROKEN_CONFIG);
}

#[test]
fn test_poll_reports_unparsable_config() {
    let home = TempDir::new().unwrap();
    write_broken_config(&home);

    cubygas_cmd(&home)
        .arg("poll")
        .assert()
        .code(1)
        .stderr(
            predicate::str::contains("Configuration error")
                .and(predicate::str::contains("config init").not()),
        );
}

// ── Polling against a mock cloud ────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_json_snapshot() {
    let server = mock_cloud().await;
    let home = TempDir::new().unwrap();

    let output = cloud_cmd(&home, &server, "A1,B2")
        .args(["poll", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        json!({
            "A1": { "level": 72.5, "timestamp": "2024-01-01T00:00:00Z" },
            "B2": { "level": null, "timestamp": null }
        })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_plain() {
    let server = mock_cloud().await;
    let home = TempDir::new().unwrap();

    cloud_cmd(&home, &server, "A1,B2")
        .args(["poll", "-o", "plain"])
        .assert()
        .success()
        .stdout("A1\t72.5\nB2\t-\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_poll_rejected_credentials_exit_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
        .mount(&server)
        .await;
    let home = TempDir::new().unwrap();

    cloud_cmd(&home, &server, "A1")
        .arg("poll")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Authentication failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validate_plain() {
    let server = mock_cloud().await;
    let home = TempDir::new().unwrap();

    cloud_cmd(&home, &server, "A1")
        .args(["validate", "-o", "plain"])
        .assert()
        .success()
        .stdout("valid\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sensors_json() {
    let server = mock_cloud().await;
    let home = TempDir::new().unwrap();

    let output = cloud_cmd(&home, &server, "A1,B2")
        .args(["sensors", "-o", "json"])
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["unique_id"], "cuby_gas_level_A1");
    assert_eq!(value[0]["name"], "Cuby Gas Level A1");
    assert_eq!(value[0]["value"], 72.5);
    assert_eq!(value[0]["unit"], "%");
    assert_eq!(value[1]["value"], serde_json::Value::Null);
    assert_eq!(value[1]["available"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_stops_after_count() {
    let server = mock_cloud().await;
    let home = TempDir::new().unwrap();

    let output = cloud_cmd(&home, &server, "A1")
        .args(["watch", "--interval", "1", "--count", "2", "-o", "json-compact"])
        .timeout(std::time::Duration::from_secs(30))
        .output()
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["A1"]["level"], 72.5);
    }
}
