//! Integration tests for the `wlcdash` binary.
//!
//! Argument parsing and configuration errors run without a controller;
//! the end-to-end cases point the binary at a mock dashboard.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command with env isolation so tests never touch the user's
/// real configuration or keyring.
fn wlcdash_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("wlcdash");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env_remove("WLCDASH_PROFILE")
        .env_remove("WLCDASH_CONTROLLER")
        .env_remove("WLCDASH_OUTPUT")
        .env_remove("WLCDASH_TIMEOUT")
        .env_remove("WLCDASH_USERNAME")
        .env_remove("WLCDASH_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn mock_dashboard() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screens/dashboard.html"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    server
}

/// Run the binary off the async runtime so the mock server keeps serving.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = wlcdash_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    wlcdash_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("clients")
                .and(predicate::str::contains("apps"))
                .and(predicate::str::contains("login")),
        );
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    wlcdash_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("wlcdash"));
}

#[test]
fn unknown_output_format_is_usage_error() {
    let home = tempfile::tempdir().unwrap();
    wlcdash_cmd(home.path())
        .args(["-o", "xml", "clients", "list"])
        .assert()
        .code(2);
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn missing_controller_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let output = wlcdash_cmd(home.path())
        .args(["clients", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No controller configured"));
}

#[test]
fn unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let output = wlcdash_cmd(home.path())
        .args(["--profile", "nope", "login"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Profile 'nope' not found"));
}

#[test]
fn missing_username_is_auth_error() {
    let home = tempfile::tempdir().unwrap();
    wlcdash_cmd(home.path())
        .args(["--controller", "https://10.0.0.2", "login"])
        .env("WLCDASH_PASSWORD", "secret")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("No credentials"));
}

#[test]
fn malformed_config_file_is_reported() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join("wlcdash");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "[profiles.lab\ncontroller = ").unwrap();

    let output = wlcdash_cmd(home.path())
        .args(["--controller", "https://10.0.0.2", "login"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    let text = combined_output(&output);
    assert!(text.contains("config loading failed"), "{text}");
    assert!(!text.contains("No controller configured"), "{text}");
}

#[test]
fn config_path_prints_location() {
    let home = tempfile::tempdir().unwrap();
    wlcdash_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

// ── End to end ──────────────────────────────────────────────────────

fn against(server: &MockServer, home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = wlcdash_cmd(home);
    cmd.args(["--controller", &server.uri(), "--username", "admin"])
        .env("WLCDASH_PASSWORD", "secret");
    cmd
}

#[tokio::test(flavor = "multi_thread")]
async fn login_against_mock_dashboard() {
    let server = mock_dashboard().await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = against(&server, home.path());
    cmd.arg("login");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("Logged in"));
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_credentials_exit_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screens/dashboard.html"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = against(&server, home.path());
    cmd.arg("login");
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn clients_list_as_json() {
    let server = mock_dashboard().await;
    Mock::given(method("GET"))
        .and(path("/screens/webui/resource/spartan/clientDetails.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 1 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/client-table.html"))
        .and(query_param("take", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "data": [{
                "macaddr": "AA:BB:CC:DD:EE:FF",
                "HN": "laptop-01",
                "IP": "10.0.0.20",
                "devtype": "Windows"
            }]
        })))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = against(&server, home.path());
    cmd.args(["-o", "json-compact", "clients", "list"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(0), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(parsed[0]["mac"], "aa:bb:cc:dd:ee:ff");
    assert_eq!(parsed[0]["hostname"], "laptop-01");
    assert_eq!(parsed[0]["ip"], "10.0.0.20");
}

#[tokio::test(flavor = "multi_thread")]
async fn absent_client_exits_not_found() {
    let server = mock_dashboard().await;
    Mock::given(method("GET"))
        .and(path("/data/rfdashboard/clientview_details.html"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;
    let home = tempfile::tempdir().unwrap();

    let mut cmd = against(&server, home.path());
    cmd.args(["clients", "show", "aa:bb:cc:dd:ee:ff"]);
    let output = run(cmd).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("not found"));
}
