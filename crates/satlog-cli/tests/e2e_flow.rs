//! End-to-end tests driving the `satlog` binary.
//!
//! Tests the full pipeline: log files → analyze → report on disk.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn satlog_binary() -> String {
    env!("CARGO_BIN_EXE_satlog").to_string()
}

/// Runs satlog with a sandboxed HOME so no user config leaks in.
fn satlog(home: &Path, args: &[&str]) -> Output {
    Command::new(satlog_binary())
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("SATLOG_LOG_DIR")
        .env_remove("SATLOG_LOG_PATTERN")
        .env_remove("SATLOG_OUTPUT_PATH")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run satlog")
}

fn write_log(dir: &Path, name: &str, contents: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), contents).unwrap();
}

fn read_report(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).expect("report should exist");
    serde_json::from_str(&content).expect("report should be valid JSON")
}

const UNREAL_LOG: &str = "\
Log file open, 07/27/25 08:00:00
[2025.07.27-08.00.01:000][  0]LogInit: Display: Engine is initialized.
[2025.07.27-09.00.00:000][100]LogNet: NotifyAcceptingConnection accepted from: [192.168.1.20]:50123
[2025.07.27-09.00.02:000][101]LogNet: Join succeeded: Alice
[2025.07.27-09.05.00:000][200]LogNet: Join succeeded: Bob
[2025.07.27-09.10.00:000][250]LogNet: Warning: Network lag detected
[2025.07.27-09.30.02:000][300]Leave: Alice
[2025.07.27-10.00.00:000][400]LogNet: Join succeeded: Bob
[garbled]LogStreaming: Error: Failed to load package
[2025.07.27-11.00.00:000][900]LogExit: Exiting.
";

#[test]
fn test_analyze_writes_report() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    write_log(&logs, "FactoryGame.log", UNREAL_LOG);
    let report_path = temp.path().join("satis_metrics.json");

    let output = satlog(
        temp.path(),
        &[
            "analyze",
            "--dir",
            logs.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "analyze should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Unique players: 2"), "stdout: {stdout}");

    let report = read_report(&report_path);
    let summary = &report["summary"];
    assert_eq!(summary["total_join_events"], 3);
    assert_eq!(summary["total_errors"], 2);
    assert_eq!(summary["total_connections"], 1);
    assert_eq!(summary["unknown_timestamp_events"], 2);

    // Alice: exact 09:00:02 → 09:30:02.
    let alice = &report["players"]["Alice"];
    assert_eq!(alice["total_playtime_seconds"], 1800);
    assert_eq!(alice["session_count"], 1);

    // Bob: missed leave at 10:00, then open until the last event at 11:00.
    let bob_sessions: Vec<_> = report["sessions"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["player"] == "Bob")
        .collect();
    assert_eq!(bob_sessions.len(), 2);
    assert!(bob_sessions.iter().all(|s| s["end_estimated"] == true));
    assert_eq!(report["players"]["Bob"]["total_playtime_seconds"], 55 * 60 + 3600);

    // Uptime from the engine start marker to the exit marker.
    let window = &report["uptime_windows"][0];
    assert_eq!(window["start_time"], "2025-07-27T08:00:01Z");
    assert_eq!(window["end_time"], "2025-07-27T11:00:00Z");

    assert_eq!(report["daily_activity"]["2025-07-27"], 3);
    let newest_error = report["recent_errors"][0]["message"].as_str().unwrap();
    assert!(newest_error.contains("Network lag"), "newest error: {newest_error}");
}

#[test]
fn test_empty_directory_fails_without_report() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    std::fs::create_dir_all(&logs).unwrap();
    let report_path = temp.path().join("satis_metrics.json");

    let output = satlog(
        temp.path(),
        &[
            "analyze",
            "--dir",
            logs.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success(), "analyze should fail with no logs");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no log files matching"), "stderr: {stderr}");
    assert!(!report_path.exists());
}

#[test]
fn test_previous_report_survives_failed_run() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    std::fs::create_dir_all(&logs).unwrap();
    let report_path = temp.path().join("satis_metrics.json");
    std::fs::write(&report_path, "{\"previous\":true}").unwrap();

    let output = satlog(
        temp.path(),
        &[
            "analyze",
            "--dir",
            logs.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
        ],
    );

    assert!(!output.status.success());
    assert_eq!(
        std::fs::read_to_string(&report_path).unwrap(),
        "{\"previous\":true}"
    );
}

#[test]
fn test_rerun_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    write_log(&logs, "FactoryGame.log", UNREAL_LOG);
    write_log(
        &logs,
        "FactoryGame-backup-2025.07.26.log",
        "[2025-07-26 20:00:00] Join: Carol\n[2025-07-26 21:00:00] Leave: Carol\n",
    );

    let mut reports = Vec::new();
    for name in ["first.json", "second.json"] {
        let path = temp.path().join(name);
        let output = satlog(
            temp.path(),
            &[
                "analyze",
                "--dir",
                logs.to_str().unwrap(),
                "--output",
                path.to_str().unwrap(),
            ],
        );
        assert!(output.status.success());

        let mut report = read_report(&path);
        report
            .as_object_mut()
            .unwrap()
            .remove("generated_at")
            .expect("generated_at present");
        reports.push(report);
    }

    assert_eq!(reports[0], reports[1]);
    assert_eq!(reports[0]["summary"]["total_log_files"], 2);
    assert_eq!(reports[0]["logging_gaps"].as_array().unwrap().len(), 1);
}

#[test]
fn test_json_flag_prints_report() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    write_log(
        &logs,
        "FactoryGame.log",
        "[2024-01-01 10:00:00] Join: Alice\n[2024-01-01 10:30:00] Leave: Alice\n",
    );
    let report_path = temp.path().join("out.json");

    let output = satlog(
        temp.path(),
        &[
            "analyze",
            "--dir",
            logs.to_str().unwrap(),
            "--output",
            report_path.to_str().unwrap(),
            "--json",
        ],
    );
    assert!(output.status.success());

    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["sessions"][0]["duration_seconds"], 1800);
    assert_eq!(printed["sessions"][0]["end_estimated"], false);
    assert_eq!(printed, read_report(&report_path));
}

#[test]
fn test_env_config_selects_log_dir_and_output() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("server");
    write_log(
        &logs,
        "FactoryGame.log",
        "[2024-01-01 10:00:00] Join: Alice\n",
    );
    let report_path = temp.path().join("from-env.json");

    let output = Command::new(satlog_binary())
        .env("HOME", temp.path())
        .env_remove("XDG_CONFIG_HOME")
        .env("SATLOG_LOG_DIR", &logs)
        .env("SATLOG_OUTPUT_PATH", &report_path)
        .arg("analyze")
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report = read_report(&report_path);
    assert_eq!(report["summary"]["total_unique_players"], 1);
}

#[test]
fn test_config_file_sets_pattern() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    write_log(&logs, "Server-1.txt", "[2024-01-01 10:00:00] Join: Dana\n");
    let config_path = temp.path().join("satlog.toml");
    std::fs::write(&config_path, "log_pattern = \"Server-*.txt\"\n").unwrap();

    let output = satlog(
        temp.path(),
        &[
            "--config",
            config_path.to_str().unwrap(),
            "players",
            "--dir",
            logs.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Dana"), "stdout: {stdout}");
}

#[test]
fn test_players_json() {
    let temp = TempDir::new().unwrap();
    let logs = temp.path().join("logs");
    write_log(&logs, "FactoryGame.log", UNREAL_LOG);

    let output = satlog(
        temp.path(),
        &["players", "--dir", logs.to_str().unwrap(), "--json"],
    );
    assert!(output.status.success());

    let players: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(players["Bob"]["join_count"], 2);
    assert_eq!(players["Alice"]["join_count"], 1);
}
