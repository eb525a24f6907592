#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn xbeeprims() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_xbeeprims"));
    cmd.env_remove("XBEEPRIMS_API_MODE")
        .env_remove("XBEEPRIMS_VREF_ADC")
        .arg("--log-level")
        .arg("error");
    cmd
}

fn run(args: &[&str]) -> Output {
    xbeeprims()
        .args(args)
        .output()
        .expect("binary should run")
}

fn stdout_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "xbeeprims-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn decode_hex_prints_json_events() {
    let output = run(&[
        "decode",
        "--format",
        "json",
        "--hex",
        "7E 00 07 8B 01 7D 84 00 00 01 71",
    ]);
    assert!(output.status.success(), "{output:?}");

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["event"], "frame");
    assert_eq!(lines[0]["frame_id"], 1);
    assert_eq!(lines[0]["message"]["type"], "zigbee_transmit_status");
    assert_eq!(lines[0]["message"]["remote16"], "7d84");
}

#[test]
fn decode_reports_checksum_mismatch_with_data_invalid() {
    let output = run(&["decode", "--format", "json", "--hex", "7e00028a0600"]);
    assert_eq!(output.status.code(), Some(60));

    let lines = stdout_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "error");
    assert_eq!(lines[1]["message"]["modem_status"], 6);
}

#[test]
fn decode_reads_stdin_in_escaped_mode() {
    let mut child = xbeeprims()
        .args(["decode", "--format", "json", "--count", "1"])
        .env("XBEEPRIMS_API_MODE", "2")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("binary should spawn");

    let wire = hex::decode("7e00078b7d5e2a6a00000062").expect("valid hex");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&wire)
        .expect("stdin should accept bytes");

    let output = child.wait_with_output().expect("binary should exit");
    assert!(output.status.success(), "{output:?}");
    let lines = stdout_lines(&output);
    assert_eq!(lines[0]["frame_id"], 0x7e);
}

#[test]
fn decode_file_with_raw_frames() {
    let path = unique_temp_file("raw");
    std::fs::write(&path, hex::decode("7e00028a066f").expect("valid hex"))
        .expect("temp file should be writable");

    let output = run(&[
        "decode",
        "--format",
        "json",
        "--raw-frames",
        "--file",
        path.to_str().expect("utf-8 path"),
    ]);
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success(), "{output:?}");
    let lines = stdout_lines(&output);
    assert_eq!(lines[0]["event"], "raw");
    assert_eq!(lines[0]["frame"], "7e00028a066f");
}

#[test]
fn decode_missing_file_is_usage_error() {
    let output = run(&["decode", "--file", "/nonexistent/xbeeprims/frames.bin"]);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("failed opening"));
}

#[test]
fn encode_json_prints_frame() {
    let output = run(&[
        "encode",
        "--format",
        "json",
        "--json",
        r#"{"type":"at_command","id":82,"command":"NJ"}"#,
    ]);
    assert!(output.status.success(), "{output:?}");

    let lines = stdout_lines(&output);
    assert_eq!(lines[0]["bytes"], "7e000408524e4a0d");
    assert_eq!(lines[0]["frame_id"], 82);
}

#[test]
fn encode_pretty_uses_frame_id_start() {
    let output = run(&[
        "encode",
        "--format",
        "pretty",
        "--frame-id-start",
        "82",
        "--json",
        r#"[{"type":"at_command","command":"NJ"},{"type":"at_command","command":"NJ"}]"#,
    ]);
    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["7E 00 04 08 52 4E 4A 0D", "7E 00 04 08 53 4E 4A 0C"]);
}

#[test]
fn encode_raw_round_trips_through_decode() {
    let encoded = run(&[
        "encode",
        "--format",
        "raw",
        "--api-mode",
        "2",
        "--json",
        r#"{"type":"zigbee_transmit_request","id":17,"destination64":"0013a200400a0127","data":"5478446174613041"}"#,
    ]);
    assert!(encoded.status.success(), "{encoded:?}");

    let mut child = xbeeprims()
        .args(["decode", "--format", "json", "--api-mode", "2"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("binary should spawn");
    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(&encoded.stdout)
        .expect("stdin should accept bytes");
    let output = child.wait_with_output().expect("binary should exit");

    assert!(output.status.success(), "{output:?}");
    let lines = stdout_lines(&output);
    assert_eq!(lines[0]["message"]["type"], "zigbee_transmit_request");
    assert_eq!(lines[0]["message"]["destination64"], "0013a200400a0127");
    assert_eq!(lines[0]["message"]["data"], "5478446174613041");
}

#[test]
fn encode_decode_only_type_is_data_invalid() {
    let output = run(&[
        "encode",
        "--json",
        r#"{"type":"modem_status","modem_status":0}"#,
    ]);
    assert_eq!(output.status.code(), Some(60));
    assert!(String::from_utf8_lossy(&output.stderr).contains("not supported"));
}

#[test]
fn types_lists_registry() {
    let output = run(&["types", "--format", "json"]);
    assert!(output.status.success(), "{output:?}");

    let rows: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("types output should be a JSON array");
    assert_eq!(rows.len(), 29);
    let at = rows
        .iter()
        .find(|row| row["tag"] == "0x08")
        .expect("AT command should be listed");
    assert_eq!(at["encode"], true);
    assert_eq!(at["decode"], true);
}

#[test]
fn version_prints_name() {
    let output = run(&["version"]);
    assert!(output.status.success(), "{output:?}");
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("xbeeprims "));
}
