use std::process::Command;

use pretty_assertions::assert_eq;

fn node() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cswap-node"));
    command
        .env("RUST_LOG", "info")
        .arg("--config")
        .arg(concat!(env!("CARGO_MANIFEST_DIR"), "/../configs/cswap-node.toml"));
    command
}

#[test]
fn json_flag_switches_report_and_logs_to_json() {
    let output = node().args(["--json", "--rounds", "2"]).output().unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rounds"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["telemetry"]["counters"]["pool.swap"], 4);

    let stderr = String::from_utf8(output.stderr).unwrap();
    let lines: Vec<&str> = stderr.lines().filter(|line| !line.is_empty()).collect();
    assert!(!lines.is_empty());
    for line in lines {
        let event: serde_json::Value = serde_json::from_str(line).unwrap();
        assert!(event["level"].is_string());
    }
}

#[test]
fn plain_run_prints_a_summary_line() {
    let output = node().output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("2 swaps committed, 0 calls aborted"));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.lines().all(|line| serde_json::from_str::<serde_json::Value>(line).is_err()));
}
