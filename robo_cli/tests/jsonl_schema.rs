use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

fn parse_lines(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(stdout)
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).expect("stdout line is JSON"))
        .collect()
}

/// Every publish cycle is one JSON object with the joint-state fields.
#[rstest]
fn arm_jsonl_schema() {
    let dir = tempdir().unwrap();
    let cmds = dir.path().join("commands.jsonl");
    fs::write(&cmds, "[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]\n[0.1, 0.2]\n").unwrap();

    let out = Command::cargo_bin("robo_cli")
        .unwrap()
        .args(["--json", "--log-level", "error", "arm", "--duration-ms", "400", "--publish-hz", "50", "--stats"])
        .arg("--commands")
        .arg(&cmds)
        .output()
        .unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let cycles = parse_lines(&out.stdout);
    assert!(cycles.len() >= 3, "got {} cycles", cycles.len());
    for c in &cycles {
        assert!(c["stamp_ms"].is_u64());
        assert_eq!(c["names"].as_array().unwrap().len(), 7);
        assert_eq!(c["names"][0], "la_1_joint");
        assert_eq!(c["positions"].as_array().unwrap().len(), 7);
        assert!(c["gripper"].is_number());
        assert!(c["degraded"].as_array().unwrap().is_empty());
    }

    // the zero command lands every joint on its offset, so the last cycle reads 0 rad
    let last = cycles.last().unwrap();
    for p in last["positions"].as_array().unwrap() {
        assert!(p.as_f64().unwrap().abs() < 1e-9);
    }

    let stats: serde_json::Value = String::from_utf8_lossy(&out.stderr)
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v.get("commands_applied").is_some())
        .expect("stats line on stderr");
    assert_eq!(stats["commands_applied"], 1);
    assert_eq!(stats["commands_rejected"], 1);
}

/// Structured error output with --json.
#[rstest]
fn error_json_schema() {
    let out = Command::cargo_bin("robo_cli")
        .unwrap()
        .args(["--json", "convert", "--joint", "42", "--ticks", "0"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(3));
    let err: serde_json::Value = String::from_utf8_lossy(&out.stderr)
        .lines()
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
        .find(|v| v.get("reason").is_some())
        .expect("error JSON on stderr");
    assert_eq!(err["reason"], "OutOfRangeJoint");
    assert_eq!(err["details"]["joint"], 42);
    assert_eq!(err["details"]["channels"], 8);
}
