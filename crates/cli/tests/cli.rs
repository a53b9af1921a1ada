//! End-to-end tests for the `ol` binary
//!
//! Each test runs the binary against a private config directory. Only
//! commands that need no live server are covered here; the client itself is
//! tested against a mock server in the ol-openlist crate.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ol(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ol"))
        .args(args)
        .env("OL_CONFIG_DIR", config_dir)
        .env_remove("OL_URL")
        .env_remove("OL_USERNAME")
        .env_remove("OL_PASSWORD")
        .env_remove("OL_PROXY")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute ol")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Output should be valid JSON")
}

#[test]
fn test_server_show_without_config() {
    let dir = TempDir::new().unwrap();
    let output = ol(dir.path(), &["server", "show", "--json"]);

    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["url"], "");
    assert_eq!(json["password_set"], false);
}

#[test]
fn test_server_set_then_show() {
    let dir = TempDir::new().unwrap();

    let output = ol(
        dir.path(),
        &[
            "server",
            "set",
            "http://localhost:5244",
            "admin",
            "secret",
            "--proxy",
            "http://127.0.0.1:8080",
            "--json",
        ],
    );
    assert!(output.status.success(), "set should succeed");
    assert!(dir.path().join("config.toml").exists());

    let output = ol(dir.path(), &["server", "show", "--json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["url"], "http://localhost:5244");
    assert_eq!(json["username"], "admin");
    assert_eq!(json["password_set"], true);
    assert_eq!(json["proxy"], "http://127.0.0.1:8080");

    // The password itself is never printed
    assert!(!String::from_utf8_lossy(&output.stdout).contains("secret"));
}

#[cfg(unix)]
#[test]
fn test_config_file_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let output = ol(
        dir.path(),
        &["server", "set", "http://localhost:5244", "admin", "secret"],
    );
    assert!(output.status.success());

    let mode = std::fs::metadata(dir.path().join("config.toml"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_server_set_rejects_bad_url() {
    let dir = TempDir::new().unwrap();
    let output = ol(dir.path(), &["server", "set", "localhost:5244", "admin", "secret"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_ls_without_server_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = ol(dir.path(), &["ls", "/"]);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("server url is not set"));
}

#[test]
fn test_unreachable_server_fails_login() {
    let dir = TempDir::new().unwrap();
    // Nothing listens on the discard port
    let output = ol(dir.path(), &["ls", "/", "--url", "http://127.0.0.1:9", "--json"]);

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value = serde_json::from_str(&stderr).expect("Error should be JSON");
    assert!(json["error"].as_str().unwrap().contains("Authentication failed"));
}

#[test]
fn test_put_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent.bin");
    let output = ol(
        dir.path(),
        &["put", missing.to_str().unwrap(), "/docs", "--url", "http://127.0.0.1:9"],
    );

    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_completions() {
    let dir = TempDir::new().unwrap();
    let output = ol(dir.path(), &["completions", "bash"]);

    assert!(output.status.success());
    assert!(!output.stdout.is_empty());
}

#[test]
fn test_unknown_command_is_usage_error() {
    let dir = TempDir::new().unwrap();
    let output = ol(dir.path(), &["frobnicate"]);
    assert_eq!(output.status.code(), Some(2));
}
