//! 二进制入口的退出码与输出行为

use std::process::Command;

fn wappscan() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_wappscan"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_argument_prints_usage_and_exits_1() {
    let output = wappscan().output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"), "stdout: {}", stdout);
    assert!(stdout.contains("<INPUT>"));
}

#[test]
fn nonexistent_input_is_fatal_without_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = wappscan()
        .arg(dir.path().join("missing.txt"))
        .arg("--cache")
        .arg(dir.path().join("rules.mp"))
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(!output.stderr.is_empty());
    assert!(!dir.path().join("rules.mp").exists());
}

#[test]
fn blank_input_prints_empty_object() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("urls.txt");
    std::fs::write(&input, "\n   \n\t\n").unwrap();

    let output = wappscan()
        .arg(&input)
        .arg("--rules")
        .arg(dir.path().join("absent-rules.json"))
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "{}\n");
}

#[test]
fn unreachable_targets_keep_one_key_per_url() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("fingerprints.json");
    std::fs::write(&rules, r#"{"apps": {"Nginx": {"headers": {"server": "nginx"}}}}"#).unwrap();

    // 端口 1 上没有服务，连接被拒绝
    let input = dir.path().join("urls.txt");
    std::fs::write(&input, "http://127.0.0.1:1/\n\nhttp://127.0.0.1:1/\nnot a url\n").unwrap();

    let output = wappscan()
        .arg(&input)
        .arg("--rules")
        .arg(&rules)
        .arg("--timeout")
        .arg("5")
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let object = report.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert_eq!(object["http://127.0.0.1:1/"], serde_json::json!([]));
    assert_eq!(object["not a url"], serde_json::json!([]));
}

#[test]
fn broken_rules_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let rules = dir.path().join("fingerprints.json");
    std::fs::write(&rules, "not json").unwrap();
    let input = dir.path().join("urls.txt");
    std::fs::write(&input, "http://127.0.0.1:1/\n").unwrap();

    let output = wappscan().arg(&input).arg("--rules").arg(&rules).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}
