//! Integration tests for the ripple CLI.
//!
//! These tests run the built binary against a small Java project.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use rstest::{fixture, rstest};
use tempfile::TempDir;

fn run_ripple(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ripple"))
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute ripple")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

// ============================================================================
// Test Fixtures
// ============================================================================

/// A project where `Admin` extends `User` and `User` implements `Entity`
#[fixture]
fn project() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    fs::write(
        temp.path().join("User.java"),
        "public class User implements Entity {\n    public String name() {\n        return format(id);\n    }\n}\n",
    )
    .expect("write User.java");
    fs::write(
        temp.path().join("Admin.java"),
        "public class Admin extends User {\n    public void grant() {\n        audit();\n        name();\n    }\n\n    private void audit() {\n    }\n}\n",
    )
    .expect("write Admin.java");
    temp
}

// ============================================================================
// Help Tests
// ============================================================================

#[test]
fn test_cli_help() {
    let output = Command::new(env!("CARGO_BIN_EXE_ripple"))
        .arg("--help")
        .output()
        .expect("Failed to execute ripple");

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Usage:"));
    assert!(text.contains("impact"));
    assert!(text.contains("calls"));
}

// ============================================================================
// Impact Command Tests
// ============================================================================

#[rstest]
fn test_impact_json(project: TempDir) {
    let output = run_ripple(project.path(), &["impact", "User", "--format", "json"]);

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("impact output is JSON");
    assert_eq!(report["changedItems"], serde_json::json!(["User"]));
    assert_eq!(report["upstream"]["User"], serde_json::json!([["User", "Admin"]]));
    assert_eq!(report["downstream"]["User"], serde_json::json!([["User", "Entity"]]));
    assert_eq!(report["totalAffected"], 3);
}

#[rstest]
fn test_impact_markdown(project: TempDir) {
    let output = run_ripple(project.path(), &["impact", "User", "-f", "markdown"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("# Change Impact Report"));
    assert!(text.contains("1. User ← Admin"));
}

#[rstest]
fn test_impact_requires_items(project: TempDir) {
    let output = run_ripple(project.path(), &["impact"]);

    assert!(!output.status.success());
}

// ============================================================================
// Calls Command Tests
// ============================================================================

#[rstest]
fn test_calls_mermaid(project: TempDir) {
    let output = run_ripple(project.path(), &["calls", "Admin.java", "--mermaid"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.starts_with("```mermaid\ngraph TD\n"));
    assert!(text.contains("grant[grant] --> audit[audit]"));
}

#[rstest]
fn test_calls_missing_file_fails(project: TempDir) {
    let output = run_ripple(project.path(), &["calls", "Missing.java"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error"));
}

// ============================================================================
// Diff Command Tests
// ============================================================================

#[rstest]
fn test_diff_json(project: TempDir) {
    let patch = project.path().join("change.patch");
    fs::write(
        &patch,
        "--- a/Admin.java\n+++ b/Admin.java\n@@ -7,2 +7,3 @@\n     private void audit() {\n+        log();\n     }\n",
    )
    .expect("write patch");
    let patch = patch.to_string_lossy().into_owned();

    let output = run_ripple(project.path(), &["diff", &patch, "--format", "json"]);

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("diff output is JSON");
    assert_eq!(value["files"][0]["path"], "Admin.java");
    let items = value["impact"]["changedItems"]
        .as_array()
        .expect("changed items");
    assert!(items.contains(&serde_json::json!("Admin")));
    assert!(items.contains(&serde_json::json!("Admin.audit")));
}

// ============================================================================
// Export Command Tests
// ============================================================================

#[rstest]
fn test_export_writes_json_lines(project: TempDir) {
    let target = project.path().join("graph.jsonl");
    let target_arg = target.to_string_lossy().into_owned();

    let output = run_ripple(project.path(), &["export", &target_arg]);

    assert!(output.status.success());
    let content = fs::read_to_string(&target).expect("export file");
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).expect("each line is JSON"))
        .collect();
    assert!(lines.iter().any(|l| l["type"] == "node" && l["label"] == "Class" && l["name"] == "Admin"));
    assert!(lines.iter().any(|l| l["type"] == "edge" && l["label"] == "EXTENDS"));
}
