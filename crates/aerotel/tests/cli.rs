#![cfg(feature = "cli")]

use std::path::PathBuf;
use std::process::{Command, Output};

use serde_json::Value;

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "aerotel-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn aerotel(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_aerotel"))
        .args(args)
        .env_remove("AEROTEL_LOG")
        .output()
        .expect("binary should run")
}

fn json_lines(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

#[test]
fn synth_then_replay_reports_every_frame() {
    let dir = unique_temp_dir("replay");
    let capture = dir.join("capture.bin");
    let capture = capture.to_str().expect("utf-8 temp path");

    let synth = aerotel(&[
        "synth",
        capture,
        "--count",
        "50",
        "--noise",
        "--start",
        "2024-05-01T10:00:00Z",
        "--format",
        "json",
    ]);
    assert!(synth.status.success(), "synth failed: {synth:?}");
    let written = json_lines(&synth);
    assert_eq!(written[0]["frames"], 50);

    let replay = aerotel(&["replay", capture, "--window", "10s", "--format", "json"]);
    assert!(replay.status.success(), "replay failed: {replay:?}");

    let lines = json_lines(&replay);
    assert_eq!(lines.len(), 2);

    let summary = &lines[0];
    assert_eq!(summary["kind"], "summary");
    assert_eq!(summary["reason"], "source_closed");
    assert_eq!(summary["stored"], 50);
    assert_eq!(summary["stats"]["frames_ok"], 50);
    assert_eq!(summary["stats"]["frames_bad_terminator"], 0);
    assert_eq!(summary["stats"]["frames_bad_decode"], 0);

    let window = &lines[1];
    assert_eq!(window["kind"], "window");
    // Latest is 10:00:49; the 10 s window reaches back to 10:00:39 inclusive.
    assert_eq!(window["samples"], 11);
    assert_eq!(window["latest"]["timestamp"], "2024-05-01T10:00:49Z");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn replay_counts_damaged_capture() {
    let dir = unique_temp_dir("damaged");
    let capture = dir.join("capture.bin");

    let synth = aerotel(&[
        "synth",
        capture.to_str().expect("utf-8 temp path"),
        "--count",
        "3",
        "--start",
        "2024-05-01T10:00:00Z",
    ]);
    assert!(synth.status.success(), "synth failed: {synth:?}");

    // Break the second frame's terminator.
    let mut bytes = std::fs::read(&capture).expect("capture should exist");
    assert_eq!(bytes.len(), 3 * 69);
    bytes[2 * 69 - 1] = 0x00;
    std::fs::write(&capture, bytes).expect("capture should be writable");

    let replay = aerotel(&[
        "replay",
        capture.to_str().expect("utf-8 temp path"),
        "--format",
        "json",
    ]);
    assert!(replay.status.success(), "replay failed: {replay:?}");

    let summary = &json_lines(&replay)[0];
    assert_eq!(summary["stats"]["frames_ok"], 2);
    assert_eq!(summary["stats"]["frames_bad_terminator"], 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn replay_missing_capture_is_usage_error() {
    let dir = unique_temp_dir("missing");
    let missing = dir.join("nope.bin");

    let output = aerotel(&["replay", missing.to_str().expect("utf-8 temp path")]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("nope.bin"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn invalid_duration_is_usage_error() {
    let dir = unique_temp_dir("duration");
    let capture = dir.join("capture.bin");

    let output = aerotel(&[
        "synth",
        capture.to_str().expect("utf-8 temp path"),
        "--interval",
        "soon",
    ]);
    assert_eq!(output.status.code(), Some(64));
    assert!(!capture.exists());

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn version_prints_package_version() {
    let output = aerotel(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("aerotel {}", env!("CARGO_PKG_VERSION"))
    );
}
