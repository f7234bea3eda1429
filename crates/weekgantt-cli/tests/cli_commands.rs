//! Tests for the `weekgantt` subcommands
//!
//! Exit codes:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0    | Success (including documents that needed fallbacks) |
//! | 1    | Unreadable file, invalid JSON, or refused overwrite |

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

fn weekgantt(args: &[&str], file: Option<&Path>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_weekgantt"));
    command.args(args);
    if let Some(file) = file {
        command.arg(file);
    }
    command
        .env_remove("WEEKGANTT_LANG")
        .env_remove("WEEKGANTT_CELL_WIDTH")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn new_sample(path: &Path) {
    let output = weekgantt(
        &["new", "--sample", "--start", "2025-01-06", "--months", "3", "--lang", "en", "--title", "Depot"],
        Some(path),
    );
    assert!(output.status.success(), "new should succeed: {:?}", output);
}

// =============================================================================
// new
// =============================================================================

#[test]
fn new_writes_a_loadable_document() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plan.json");
    new_sample(&file);

    let content = fs::read_to_string(&file).unwrap();
    let value: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(value["version"], "1.2");
    assert_eq!(value["config"]["projectTitle"], "Depot");
    assert_eq!(value["config"]["durationMonths"], 3);
    assert_eq!(value["tasks"].as_array().unwrap().len(), 7);
}

#[test]
fn new_refuses_overwrite() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("existing.json");
    fs::write(&file, "{}").unwrap();

    let output = weekgantt(&["new"], Some(&file));
    assert!(!output.status.success(), "Should refuse to overwrite");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("already exists"), "stderr: {stderr}");
    assert_eq!(fs::read_to_string(&file).unwrap(), "{}");

    let output = weekgantt(&["new", "--force"], Some(&file));
    assert!(output.status.success());
    assert_ne!(fs::read_to_string(&file).unwrap(), "{}");
}

// =============================================================================
// show
// =============================================================================

#[test]
fn show_draws_every_row() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plan.json");
    new_sample(&file);

    let output = weekgantt(&["show", "--today", "2025-01-20"], Some(&file));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("Depot\n"));
    for name in ["Survey", "Design", "Concept design", "Detailed design", "Implementation", "Advance"] {
        assert!(text.contains(name), "missing {name} in:\n{text}");
    }
    assert!(text.contains("|Jan 2025"));
}

#[test]
fn show_json_honours_collapse_options() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plan.json");
    new_sample(&file);

    let output = weekgantt(&["show", "--format", "json", "--today", "2025-01-20"], Some(&file));
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let rows = report["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 7);
    let design = rows.iter().find(|r| r["name"] == "Design").unwrap();
    let design_id = design["id"].as_str().unwrap().to_string();

    let output = weekgantt(
        &[
            "show",
            "--format",
            "json",
            "--collapse-group",
            &design_id,
            "--collapse-month",
            "0",
            "--cell-width",
            "16",
        ],
        Some(&file),
    );
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["rows"].as_array().unwrap().len(), 5);
    assert_eq!(report["cellWidth"], 16);
    assert_eq!(report["months"][0]["collapsed"], true);
    let design = report["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == design_id.as_str())
        .unwrap();
    assert_eq!(design["hiddenSubItems"], 2);
}

#[test]
fn show_missing_file_fails() {
    let dir = tempdir().unwrap();
    let output = weekgantt(&["show"], Some(&dir.path().join("absent.json")));
    assert_eq!(output.status.code(), Some(1));
}

// =============================================================================
// check
// =============================================================================

#[test]
fn check_clean_document() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plan.json");
    new_sample(&file);

    let output = weekgantt(&["check"], Some(&file));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("version 1.2"));
    assert!(text.contains("7 tasks"));
    assert!(text.contains("OK"));
}

#[test]
fn check_reports_fallbacks_without_failing() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("old.json");
    fs::write(
        &file,
        r#"{"config": {"startDate": "soon", "durationMonths": 4}, "tasks": [42, {"id": "t_1"}]}"#,
    )
    .unwrap();

    let output = weekgantt(&["check"], Some(&file));
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("no version tag"));
    assert!(text.contains("invalid config.startDate"));
    assert!(text.contains("tasks[0] is not an object"));
}

#[test]
fn check_invalid_json_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("broken.json");
    fs::write(&file, "{ not json").unwrap();

    let output = weekgantt(&["check"], Some(&file));
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to load"), "stderr: {stderr}");
}

// =============================================================================
// timeline
// =============================================================================

#[test]
fn timeline_json_partitions_weeks() {
    let output = weekgantt(
        &["timeline", "--start", "2025-01-06", "--months", "2", "--lang", "en", "--format", "json"],
        None,
    );
    assert!(output.status.success());
    let timeline: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let months = timeline["months"].as_array().unwrap();
    assert_eq!(months.len(), 2);
    assert_eq!(months[0]["label"], "Jan 2025");
    let weeks = timeline["weeks"].as_array().unwrap();
    let counted: u64 = months.iter().map(|m| m["count"].as_u64().unwrap()).sum();
    assert_eq!(counted, weeks.len() as u64);
    assert_eq!(weeks[0]["date"], "2025-01-06");
}

#[test]
fn timeline_text_uses_vietnamese_labels() {
    let output = weekgantt(&["timeline", "--start", "2025-01-06", "--months", "1"], None);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Thg 1 2025"));
}
