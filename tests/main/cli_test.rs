//! CLI contract tests for the `ntfy-bridge` binary.

use std::io::Write;

use assert_cmd::Command;

fn write_config(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).expect("config file creates");
    file.write_all(contents.as_bytes()).expect("config writes");
    path
}

const COMPLETE_CONFIG: &str = r#"
[ntfy]
host = "https://ntfy.example"
token = "tk_secret"
subscribe_topic = "inbox"
publish_topic = "outbox"
sender = "alice"
receiver = "chat"
"#;

#[test]
fn help_lists_the_subcommands() {
    let mut cmd = Command::cargo_bin("ntfy-bridge").expect("binary builds");
    let assert = cmd.arg("--help").assert().success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.contains("start"));
    assert!(output.contains("check-config"));
    assert!(output.contains("publish"));
}

#[test]
fn check_config_accepts_a_complete_config() {
    let dir = tempfile::tempdir().expect("tempdir creates");
    let path = write_config(&dir, COMPLETE_CONFIG);

    let mut cmd = Command::cargo_bin("ntfy-bridge").expect("binary builds");
    let assert = cmd
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(output.contains("config OK"));
    assert!(output.contains("publish_topic=outbox"));
}

#[test]
fn check_config_rejects_a_config_missing_a_key() {
    let dir = tempfile::tempdir().expect("tempdir creates");
    let path = write_config(
        &dir,
        r#"
[ntfy]
host = "https://ntfy.example"
token = ""
subscribe_topic = "inbox"
publish_topic = "outbox"
sender = "alice"
receiver = "chat"
"#,
    );

    let mut cmd = Command::cargo_bin("ntfy-bridge").expect("binary builds");
    cmd.arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure();
}

#[test]
fn check_config_rejects_a_missing_file() {
    let dir = tempfile::tempdir().expect("tempdir creates");
    let path = dir.path().join("nope.toml");

    let mut cmd = Command::cargo_bin("ntfy-bridge").expect("binary builds");
    cmd.arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure();
}
