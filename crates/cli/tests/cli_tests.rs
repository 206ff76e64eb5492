//! CLI integration tests

use std::io::Write;
use std::process::{Command, Output};
use tempfile::NamedTempFile;

fn sentinelctl(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sentinelctl"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute command")
}

fn trace_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create trace file");
    for line in lines {
        writeln!(file, "{}", line).expect("Failed to write trace");
    }
    file
}

fn spike_trace() -> NamedTempFile {
    let mut lines = vec!["# steady backend"];
    lines.extend(std::iter::repeat("12.0").take(20));
    lines.push("500.0");
    trace_file(&lines)
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = sentinelctl(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Latency Sentinel"), "Should show app name");
    assert!(stdout.contains("replay"), "Should show replay command");
    assert!(stdout.contains("classify"), "Should show classify command");
    assert!(stdout.contains("status"), "Should show status command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = sentinelctl(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("sentinelctl"), "Should show binary name");
}

#[test]
fn test_replay_table_flags_spike() {
    let trace = spike_trace();
    let output = sentinelctl(&["replay", trace.path().to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "replay should succeed: {:?}", output);
    assert!(stdout.contains("ANOMALY"));
    assert!(stdout.contains("21 samples, 2 classified, 1 anomalies"));
}

#[test]
fn test_replay_json_anomalies_only() {
    let trace = spike_trace();
    let output = sentinelctl(&[
        "--format",
        "json",
        "replay",
        "--anomalies-only",
        trace.path().to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let records: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("replay output should be JSON");
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["tick"], 21);
    assert_eq!(records[0]["verdict"]["is_anomaly"], true);
}

#[test]
fn test_classify_json() {
    let history = trace_file(&["12.0"; 20]);
    let output = sentinelctl(&[
        "-f",
        "json",
        "classify",
        "--history",
        history.path().to_str().unwrap(),
        "12.0",
    ]);
    assert!(output.status.success());

    let verdict: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(verdict["is_anomaly"], false);
}

#[test]
fn test_classify_short_history_fails() {
    let history = trace_file(&["12.0"; 5]);
    let output = sentinelctl(&[
        "classify",
        "--history",
        history.path().to_str().unwrap(),
        "12.0",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("20"), "Should name the required history: {}", stderr);
}

#[test]
fn test_replay_bad_trace_line() {
    let trace = trace_file(&["12.0", "slow"]);
    let output = sentinelctl(&["replay", trace.path().to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("line 2"), "Should report the bad line: {}", stderr);
}

#[test]
fn test_replay_invalid_contamination() {
    let trace = spike_trace();
    let output = sentinelctl(&[
        "replay",
        "--contamination",
        "1.5",
        trace.path().to_str().unwrap(),
    ]);
    assert!(!output.status.success());
}

/// Test that missing arguments are rejected
#[test]
fn test_classify_requires_history() {
    let output = sentinelctl(&["classify", "12.0"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("--history"));
}
