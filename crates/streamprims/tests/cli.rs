#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "streamprims-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn run_with_stdin(args: &[&str], stdin: &[u8]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_streamprims"))
        .args(["--log-level", "error"])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary should start");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(stdin)
        .expect("stdin should accept input");
    child.wait_with_output().expect("binary should finish")
}

#[test]
fn encode_stdin_to_stdout() {
    let out = run_with_stdin(&["encode"], &[0xE2, 0xE2, 0xE2, 0x41, 0x41, 0x41, 0x41, 0x41]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(out.stdout, vec![0xE2, 0x03, 0xE2, 0xE2, 0x05, 0x41]);
}

#[test]
fn decode_with_custom_signal() {
    let out = run_with_stdin(&["decode", "--signal", "0x00"], &[b'a', 0x00, 0x04, b'b', 0x00, 0xFF]);
    assert!(out.status.success());
    assert_eq!(out.stdout, b"abbbb\x00");
}

#[test]
fn file_roundtrip_reports_json() {
    let dir = unique_temp_dir("roundtrip");
    let plain = dir.join("plain.bin");
    let encoded = dir.join("plain.rle");
    let decoded = dir.join("plain.out");

    let mut data = vec![7u8; 5000];
    data.extend((0..=255u8).cycle().take(3000));
    std::fs::write(&plain, &data).expect("input should be writable");

    let out = run_with_stdin(
        &[
            "--format",
            "json",
            "encode",
            plain.to_str().unwrap(),
            "-o",
            encoded.to_str().unwrap(),
        ],
        &[],
    );
    assert!(out.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("report should be json");
    assert_eq!(report["command"], "encode");
    assert_eq!(report["bytes_in"], 8000);

    let out = run_with_stdin(
        &[
            "decode",
            encoded.to_str().unwrap(),
            "-o",
            decoded.to_str().unwrap(),
        ],
        &[],
    );
    assert!(out.status.success());
    assert_eq!(std::fs::read(&decoded).expect("output should exist"), data);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn truncated_input_exits_data_invalid() {
    let out = run_with_stdin(&["decode"], &[b'o', b'k', 0xE2, 0x09]);
    assert_eq!(out.status.code(), Some(60));
    assert_eq!(out.stdout, b"ok");
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("run value"), "stderr: {stderr}");
}

#[test]
fn missing_input_file_fails() {
    let out = run_with_stdin(&["encode", "/definitely/not/here.bin"], &[]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn pipe_bench_reports_verified_transfer() {
    let out = run_with_stdin(
        &["--format", "json", "pipe-bench", "--capacity", "4096", "--size", "1048576"],
        &[],
    );
    assert!(out.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("report should be json");
    assert_eq!(report["bytes"], 1_048_576);
    assert_eq!(report["verified"], true);
}

#[test]
fn pipe_bench_zero_capacity_is_usage() {
    let out = run_with_stdin(&["pipe-bench", "--capacity", "0"], &[]);
    assert_eq!(out.status.code(), Some(64));
}

#[test]
fn version_json_has_name_and_version() {
    let out = run_with_stdin(&["--format", "json", "version", "--extended"], &[]);
    assert!(out.status.success());
    let info: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("version should be json");
    assert_eq!(info["name"], "streamprims");
    assert_eq!(info["version"], env!("CARGO_PKG_VERSION"));
    assert!(info.get("target").is_some());
}
