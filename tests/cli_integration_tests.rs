use std::fs;
use std::process::Command;
use tempfile::TempDir;

fn uploader() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kintone-plugin-uploader"));
    for key in [
        "KINTONE_SUBDOMAIN",
        "KINTONE_USERNAME",
        "KINTONE_PASSWORD",
        "KINTONE_PROXY",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn test_cli_help_command() {
    let output = uploader()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--file"));
    assert!(stdout.contains("--idfile"));
    assert!(stdout.contains("--proxy"));
}

#[test]
fn test_cli_missing_file_exits_with_one() {
    let output = uploader()
        .args(["-d", "example", "-u", "admin", "-p", "secret"])
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--file"));
}

#[test]
fn test_cli_missing_credentials_exits_with_one() {
    let temp_dir = TempDir::new().unwrap();

    let output = uploader()
        .args(["--file", "plugin.zip", "--subdomain", "example"])
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Domain, username and password must all be specified."));
    assert!(!stderr.contains("Uploading file"));
}

#[test]
fn test_cli_credentials_from_environment_are_used() {
    let temp_dir = TempDir::new().unwrap();

    // Nothing listens on port 1, so a run that gets past validation fails on upload
    let output = uploader()
        .args(["--file", "plugin.zip"])
        .env("KINTONE_SUBDOMAIN", "http://127.0.0.1:1")
        .env("KINTONE_USERNAME", "admin")
        .env("KINTONE_PASSWORD", "secret")
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("must all be specified"));
    assert!(stderr.contains("Uploading file"));
}

#[test]
fn test_cli_upload_failure_leaves_idfile_untouched() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("plugin.zip"), "PK").unwrap();
    let id_path = temp_dir.path().join("pluginId.txt");
    fs::write(&id_path, "abc123").unwrap();

    let output = uploader()
        .args([
            "-f",
            "plugin.zip",
            "-d",
            "http://127.0.0.1:1",
            "-u",
            "admin",
            "-p",
            "secret",
        ])
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("An error has occurred"));
    assert_eq!(fs::read_to_string(&id_path).unwrap(), "abc123");
}

#[test]
fn test_cli_malformed_proxy_is_fatal() {
    let temp_dir = TempDir::new().unwrap();

    let output = uploader()
        .args([
            "-f",
            "plugin.zip",
            "-d",
            "example",
            "-u",
            "admin",
            "-p",
            "secret",
            "-x",
            "not a url",
        ])
        .current_dir(temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid proxy URL"));
}

#[test]
fn test_cli_completions_do_not_require_file() {
    let output = uploader()
        .args(["--completions", "bash"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kintone-plugin-uploader"));
}
