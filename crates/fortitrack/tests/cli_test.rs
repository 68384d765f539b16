//! Integration tests for the `fortitrack` CLI binary.
//!
//! Argument parsing, config handling, and exit codes run without any
//! network; device and status commands run against a wiremock firewall.
#![allow(clippy::unwrap_used)]

use std::process::Stdio;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the binary with env isolation.
fn fortitrack_cmd(config: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("fortitrack");
    cmd.env("HOME", "/tmp/fortitrack-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fortitrack-cli-test-nonexistent")
        .env("FORTITRACK_CONFIG", config)
        .env("NO_COLOR", "1")
        .env_remove("FORTITRACK_PROFILE")
        .env_remove("FORTITRACK_HOST")
        .env_remove("FORTITRACK_PORT")
        .env_remove("FORTITRACK_TOKEN")
        .env_remove("FORTITRACK_VDOM")
        .env_remove("FORTITRACK_INSECURE")
        .env_remove("FORTITRACK_TIMEOUT")
        .env_remove("FORTITRACK_OUTPUT")
        .env_remove("FORTITRACK_LOG_FORMAT")
        .env_remove("RUST_LOG");
    cmd
}

fn temp_config() -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    (dir, path)
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn firewall_with_devices() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/user/device/query"))
        .and(query_param("vdom", "root"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "http_method": "GET",
            "status": "success",
            "http_status": 200,
            "vdom": "root",
            "results": [
                {
                    "master_mac": "aa:bb:cc:dd:ee:01",
                    "hostname": "pixel",
                    "ipv4_address": "192.168.1.20",
                    "is_online": true,
                    "last_seen": 1_700_000_000
                },
                {
                    "master_mac": "aa:bb:cc:dd:ee:02",
                    "hostname": "printer",
                    "is_online": false
                }
            ]
        })))
        .mount(&server)
        .await;
    server
}

async fn next_json<R: AsyncBufRead + Unpin>(lines: &mut Lines<R>) -> Value {
    let line = tokio::time::timeout(Duration::from_secs(15), lines.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    serde_json::from_str(&line).unwrap()
}

async fn firewall_with_status(version: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "http_status": 200,
            "serial": "FGT60F0000000042",
            "version": version,
            "build": 1517,
            "results": { "hostname": "edge", "model": "FGT60F" }
        })))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let (_dir, cfg) = temp_config();
    let output = fortitrack_cmd(&cfg).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg).arg("--help").assert().success().stdout(
        predicate::str::contains("devices")
            .and(predicate::str::contains("watch"))
            .and(predicate::str::contains("status")),
    );
}

#[test]
fn version_flag() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fortitrack"));
}

#[test]
fn completions_zsh() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn json_log_format_emits_structured_lines() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["--host", "http://127.0.0.1:9", "--token", "t"])
        .args(["--log-format", "json", "-vv", "devices", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains(r#""level":"DEBUG""#)
                .and(predicate::str::contains("dispatching command")),
        );
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn config_path_honours_override() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(cfg.to_str().unwrap()));
}

#[test]
fn config_init_then_show_masks_token() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["config", "init", "--name", "home", "--firewall", "10.0.0.1"])
        .assert()
        .success();

    // Add a plaintext token by hand.
    let written = std::fs::read_to_string(&cfg).unwrap();
    std::fs::write(
        &cfg,
        written.replace("[profiles.home]", "[profiles.home]\ntoken = \"hunter2\""),
    )
    .unwrap();

    fortitrack_cmd(&cfg)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("10.0.0.1")
                .and(predicate::str::contains("********"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn config_init_refuses_to_overwrite() {
    let (_dir, cfg) = temp_config();
    let init = ["config", "init", "--firewall", "10.0.0.1"];
    fortitrack_cmd(&cfg).args(init).assert().success();
    fortitrack_cmd(&cfg).args(init).assert().code(2);
    fortitrack_cmd(&cfg).args(init).arg("--force").assert().success();
}

#[tokio::test(flavor = "multi_thread")]
async fn config_init_verify_records_serial() {
    let server = firewall_with_status("v7.2.5").await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--token", "test-token", "config", "init", "--verify"])
        .args(["--name", "edge", "--firewall", &server.uri()])
        .assert()
        .success();
    let written = std::fs::read_to_string(&cfg).unwrap();
    assert!(written.contains("FGT60F0000000042"), "{written}");

    // Same firewall under a second name is refused.
    fortitrack_cmd(&cfg)
        .args(["--token", "test-token", "config", "init", "--verify"])
        .args(["--name", "again", "--firewall", &server.uri()])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("edge"));
}

#[tokio::test(flavor = "multi_thread")]
async fn config_init_verify_rejects_old_firmware() {
    let server = firewall_with_status("v6.2.9").await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--token", "test-token", "config", "init", "--verify"])
        .args(["--firewall", &server.uri()])
        .assert()
        .code(1);
    assert!(!cfg.exists());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn devices_without_any_config_is_a_usage_error() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["devices", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No firewall configured"));
}

#[test]
fn unknown_profile_is_reported() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["--profile", "nope", "devices", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope"));
}

#[test]
fn host_without_token_is_an_auth_error() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["--host", "10.0.0.1", "devices", "list"])
        .assert()
        .code(3);
}

// ── Against a mock firewall ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn devices_list_prints_every_device() {
    let server = firewall_with_devices().await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "test-token"])
        .args(["-o", "plain", "devices", "list"])
        .assert()
        .success()
        .stdout("AA:BB:CC:DD:EE:01\nAA:BB:CC:DD:EE:02\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn devices_list_online_filter() {
    let server = firewall_with_devices().await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "test-token"])
        .args(["-o", "json", "devices", "list", "--online"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("pixel").and(predicate::str::contains("printer").not()),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn devices_get_accepts_any_notation() {
    let server = firewall_with_devices().await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "test-token"])
        .args(["devices", "get", "aabb.ccdd.ee01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pixel").and(predicate::str::contains("online")));
}

#[tokio::test(flavor = "multi_thread")]
async fn devices_get_unknown_mac_exits_not_found() {
    let server = firewall_with_devices().await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "test-token"])
        .args(["devices", "get", "00:00:00:00:00:99"])
        .assert()
        .code(4);
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_token_exits_auth() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "wrong"])
        .args(["devices", "list"])
        .assert()
        .code(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn status_flags_old_firmware() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/monitor/system/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "http_status": 200,
            "serial": "FGT60E0000000001",
            "version": "v6.2.9",
            "build": 1234,
            "results": { "hostname": "edge", "model": "FGT60E" }
        })))
        .mount(&server)
        .await;
    let (_dir, cfg) = temp_config();

    fortitrack_cmd(&cfg)
        .args(["--host", &server.uri(), "--token", "t", "-o", "json", "status"])
        .assert()
        .code(1)
        .stdout(
            predicate::str::contains("\"supported\": false")
                .and(predicate::str::contains("FGT60E0000000001")),
        );
}

#[test]
fn watch_rejects_zero_interval() {
    let (_dir, cfg) = temp_config();
    fortitrack_cmd(&cfg)
        .args(["--host", "http://127.0.0.1:9", "--token", "t"])
        .args(["watch", "--interval", "0"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("interval"));
}

#[tokio::test(flavor = "multi_thread")]
async fn watch_streams_json_events() {
    let server = firewall_with_devices().await;
    let (_dir, cfg) = temp_config();

    let mut child = tokio::process::Command::new(env!("CARGO_BIN_EXE_fortitrack"))
        .env("HOME", "/tmp/fortitrack-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/fortitrack-cli-test-nonexistent")
        .env("FORTITRACK_CONFIG", &cfg)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .args(["--host", &server.uri(), "--token", "test-token"])
        .args(["-o", "json", "watch", "--interval", "60"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .unwrap();

    let mut lines = BufReader::new(child.stdout.take().unwrap()).lines();

    let first = next_json(&mut lines).await;
    assert_eq!(first["signal"], "fortios-127.0.0.1-device-update");
    assert_eq!(first["event"], "device_list_updated");
    assert_eq!(first["ids"], json!(["AA:BB:CC:DD:EE:01", "AA:BB:CC:DD:EE:02"]));

    let second = next_json(&mut lines).await;
    assert_eq!(second["signal"], "fortios-127.0.0.1-device-new");

    child.kill().await.unwrap();
}
