//! Integration tests for the `nethawk` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! error handling, and the HTTP-only commands against a mock backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `nethawk` binary with env isolation.
///
/// Clears all `NETHAWK_*` env vars and points config directories at a
/// fresh temp dir so tests never touch the user's real configuration.
fn nethawk_cmd(home: &tempfile::TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("nethawk");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("NO_COLOR", "1")
        .env_remove("NETHAWK_PROFILE")
        .env_remove("NETHAWK_BACKEND")
        .env_remove("NETHAWK_OUTPUT")
        .env_remove("NETHAWK_INSECURE")
        .env_remove("NETHAWK_TIMEOUT")
        .env_remove("NETHAWK_FTP_PASSWORD")
        .env_remove("NETHAWK_MAIL_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn home() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Port nothing listens on.
fn dead_backend() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = home();
    let output = nethawk_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = home();
    nethawk_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("NetHawk")
            .and(predicate::str::contains("scan"))
            .and(predicate::str::contains("ftp"))
            .and(predicate::str::contains("mail"))
            .and(predicate::str::contains("bandwidth")),
    );
}

#[test]
fn test_version_flag() {
    let home = home();
    nethawk_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("nethawk"));
}

#[test]
fn test_scan_ports_help_lists_types() {
    let home = home();
    nethawk_cmd(&home)
        .args(["scan", "ports", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tcp-connect").and(predicate::str::contains("--common")));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    let home = home();
    nethawk_cmd(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    let home = home();
    nethawk_cmd(&home)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    let home = home();
    nethawk_cmd(&home)
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_points_into_config_dir() {
    let home = home();
    nethawk_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_defaults() {
    let home = home();
    nethawk_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://localhost:5000")
                .and(predicate::str::contains("[mail]")),
        );
}

#[test]
fn test_config_show_json() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["config", "show", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["defaults"]["timeout"], 30);
}

#[test]
fn test_ftp_parse_raw_listing_from_stdin() {
    let home = home();
    let listing = "total 12\n\
        drwxr-xr-x    2 ftp      ftp          4096 Mar 03 10:15 incoming\n\
        -rw-r--r--    1 ftp      ftp          2048 Jan 12  2024 notes.txt\n\
        lrwxrwxrwx    1 root     root           11 Feb 01 09:00 latest -> release-1.2\n";
    nethawk_cmd(&home)
        .args(["ftp", "parse", "-o", "plain"])
        .write_stdin(listing)
        .assert()
        .success()
        .stdout(predicate::str::diff("incoming\nnotes.txt\nlatest\n"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = home();
    let output = nethawk_cmd(&home).arg("foobar").output().unwrap();
    assert!(!output.status.success(), "Expected failure for invalid subcommand");
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_unknown_profile_is_not_found() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["--profile", "lab", "overview"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));
    assert!(combined_output(&output).contains("lab"));
}

#[test]
fn test_bad_backend_scheme_is_usage_error() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["--backend", "ftp://example.com", "overview"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("backend_url"));
}

#[test]
fn test_bad_port_list_fails_before_connecting() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["--backend", &dead_backend(), "scan", "ports", "10.0.0.1", "--ports", "22,x"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("ports"));
}

#[test]
fn test_unreachable_backend_is_connection_error() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["--backend", &dead_backend(), "--timeout", "2", "scan", "ports", "10.0.0.1"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_delete_without_tty_requires_yes() {
    let home = home();
    let output = nethawk_cmd(&home)
        .args(["mail", "profiles", "delete", "9f1c"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("--yes"));
}

// ── Against a mock backend ──────────────────────────────────────────

async fn mock_profiles(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ftp/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "1",
            "name": "Production Server",
            "host": "ftp.example.com",
            "port": 21,
            "username": "admin",
            "protocol": "FTPS"
        }])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/mail/connections"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "9f1c",
            "name": "Work",
            "imap_host": "imap.example.com",
            "imap_port": 993,
            "smtp_host": "smtp.example.com",
            "smtp_port": 587,
            "username": "me@example.com"
        }])))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ftp_profiles_json() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;
    let home = home();

    let output = nethawk_cmd(&home)
        .args(["--backend", &server.uri(), "ftp", "profiles", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["name"], "Production Server");
    assert_eq!(value[0]["protocol"], "FTPS");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mail_profiles_plain_lists_ids() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;
    let home = home();

    nethawk_cmd(&home)
        .args(["--backend", &server.uri(), "mail", "profiles", "list", "-o", "plain"])
        .assert()
        .success()
        .stdout(predicate::str::diff("9f1c\n"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_mail_profile_delete_with_yes() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/api/mail/delete_connection/9f1c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Connection deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let home = home();

    nethawk_cmd(&home)
        .args(["--backend", &server.uri(), "-y", "mail", "profiles", "delete", "9f1c"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Connection deleted"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_overview_table() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/overview/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cpu": 42.0, "memory": 61.5, "disk": 70.0, "network": 12.0
        })))
        .mount(&server)
        .await;
    let home = home();

    nethawk_cmd(&home)
        .args(["--backend", &server.uri(), "overview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("CPU").and(predicate::str::contains("42.0%")));
}
