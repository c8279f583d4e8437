//! CLI integration tests
//!
//! Runs the `citechat` binary with `assert_cmd`. Commands that reach the
//! network point at a `wiremock` server; the binary is blocking, so those
//! tests use the multi-threaded runtime to keep the server responsive.
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

fn citechat() -> Command {
    let mut cmd = Command::cargo_bin("citechat").unwrap();
    for var in [
        "CITECHAT_BASE_URL",
        "CITECHAT_TIMEOUT_SECONDS",
        "CITECHAT_SESSION_STORE",
        "CITECHAT_SESSION_DIR",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_help_lists_commands() {
    citechat()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("chat"));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    let (_temp_dir, config_path) =
        common::temp_config_file("server:\n  base_url: \"ftp://example.com/\"\n");

    citechat()
        .arg("--config")
        .arg(config_path)
        .arg("logout")
        .assert()
        .failure()
        .stderr(predicate::str::contains("http or https"));
}

#[test]
fn test_ask_without_session_fails() {
    let (_temp_dir, config_path) = common::temp_config_file("session:\n  store: memory\n");

    citechat()
        .arg("--config")
        .arg(config_path)
        .args(["ask", "what", "is", "this?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Token not defined"));
}

#[test]
fn test_logout_without_session_succeeds() {
    let session_dir = TempDir::new().unwrap();
    let (_temp_dir, config_path) = common::temp_config_file(&common::file_store_config_yaml(
        "http://127.0.0.1:9/",
        session_dir.path(),
    ));

    citechat()
        .arg("--config")
        .arg(config_path)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out."));
}

#[test]
fn test_login_with_blank_username_fails_locally() {
    let session_dir = TempDir::new().unwrap();
    let (_temp_dir, config_path) = common::temp_config_file(&common::file_store_config_yaml(
        "http://127.0.0.1:9/",
        session_dir.path(),
    ));

    citechat()
        .arg("--config")
        .arg(config_path)
        .args(["login", "--username", " ", "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Username field cannot be empty"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_ask_prints_answer_with_context() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/get-answer"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": ["guide.pdf"],
            "pages": [7],
            "answer": "Line one\nLine two"
        })))
        .mount(&server)
        .await;

    let session_dir = TempDir::new().unwrap();
    let (_temp_dir, config_path) = common::temp_config_file(&common::file_store_config_yaml(
        &server.uri(),
        session_dir.path(),
    ));

    citechat()
        .arg("--config")
        .arg(&config_path)
        .args(["login", "--username", "alice", "--password", "secret"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in."));

    citechat()
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config_path)
        .args(["ask", "where", "is", "it?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Line one\nLine two"))
        .stdout(predicate::str::contains("Context:"))
        .stdout(predicate::str::contains("File: guide.pdf, Page: 7"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_json_output_is_parseable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [],
            "pages": [],
            "answer": "No sources needed."
        })))
        .mount(&server)
        .await;

    let session_dir = TempDir::new().unwrap();
    std::fs::write(session_dir.path().join("token"), "abc").unwrap();
    let (_temp_dir, config_path) = common::temp_config_file(&common::file_store_config_yaml(
        &server.uri(),
        session_dir.path(),
    ));

    let output = citechat()
        .arg("--config")
        .arg(&config_path)
        .args(["ask", "--json", "hello"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        value,
        json!({"is_user": false, "text": "No sources needed."})
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_answer_quoting_error_text_exits_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/get-answer"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [],
            "pages": [],
            "answer": "Error: Check logs for more details"
        })))
        .mount(&server)
        .await;

    let session_dir = TempDir::new().unwrap();
    std::fs::write(session_dir.path().join("token"), "abc").unwrap();
    let (_temp_dir, config_path) = common::temp_config_file(&common::file_store_config_yaml(
        &server.uri(),
        session_dir.path(),
    ));

    citechat()
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(&config_path)
        .args(["ask", "what does the log banner say?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Error: Check logs for more details"));
}
