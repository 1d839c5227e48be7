#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";
const BAD_GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*48\r\n";
const ACK_ACK: &[u8] = &[0xB5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x01, 0x0F, 0x38];
const RTCM_1005: &[u8] = &[0xD3, 0x00, 0x03, 0x3E, 0xD0, 0x00, 0xAA, 0xBB, 0xCC];

fn temp_capture(tag: &str, contents: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "gnsswire-{tag}-{}-{}.bin",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::write(&path, contents).expect("capture should be writable");
    path
}

fn gnsswire(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gnsswire"))
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("gnsswire should run")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

#[test]
fn decode_prints_one_json_line_per_message() {
    let mut capture = Vec::new();
    capture.extend_from_slice(b"\x00\x00");
    capture.extend_from_slice(GGA);
    capture.extend_from_slice(ACK_ACK);
    capture.extend_from_slice(RTCM_1005);
    let path = temp_capture("decode", &capture);

    let output = gnsswire(&["--format", "json", "decode", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["protocol"], "NMEA");
    assert_eq!(lines[0]["name"], "GPGGA");
    assert_eq!(lines[1]["name"], "UBX-ACK-ACK");
    assert_eq!(lines[1]["hex"], "b5620501020006010f38");
    assert_eq!(lines[2]["protocol"], "RTCM3");
    assert_eq!(lines[2]["len"], 9);
}

#[test]
fn decode_reports_bad_frames_and_continues() {
    let mut capture = Vec::new();
    capture.extend_from_slice(BAD_GGA);
    capture.extend_from_slice(ACK_ACK);
    let path = temp_capture("lenient", &capture);

    let output = gnsswire(&["--format", "json", "decode", path.to_str().unwrap()]);
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(json_lines(&output).len(), 1);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("checksum"), "stderr: {stderr}");
}

#[test]
fn strict_decode_exits_60_on_first_bad_frame() {
    let mut capture = Vec::new();
    capture.extend_from_slice(GGA);
    capture.extend_from_slice(BAD_GGA);
    capture.extend_from_slice(ACK_ACK);
    let path = temp_capture("strict", &capture);

    let output = gnsswire(&[
        "--format",
        "json",
        "decode",
        "--strict",
        path.to_str().unwrap(),
    ]);
    let _ = std::fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(60));
    assert_eq!(json_lines(&output).len(), 1);
}

#[test]
fn decode_reads_stdin() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_gnsswire"))
        .args(["--log-level", "error", "--format", "pretty", "decode", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("decode should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(ACK_ACK)
        .expect("stdin should accept the capture");

    let output = child.wait_with_output().expect("decode should finish");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("UBX UBX-ACK-ACK size=10"), "stdout: {stdout}");
}

#[test]
fn decode_missing_file_fails() {
    let output = gnsswire(&["decode", "/nonexistent/gnsswire-capture.bin"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed opening"));
}

#[test]
fn version_prints_package_version() {
    let output = gnsswire(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        format!("gnsswire {}", env!("CARGO_PKG_VERSION"))
    );

    let extended = gnsswire(&["version", "--extended"]);
    assert!(String::from_utf8_lossy(&extended.stdout).contains("protocols: NMEA, UBX, RTCM3"));
}

#[test]
fn invalid_arguments_are_usage_errors() {
    let output = gnsswire(&["request", "127.0.0.1:1", "cfg-nav5"]);
    assert_eq!(output.status.code(), Some(2));

    let output = gnsswire(&["request", "127.0.0.1:1", "--timeout", "soon", "cfg-rate"]);
    assert_eq!(output.status.code(), Some(64));
}
