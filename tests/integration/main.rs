//! Integration tests for Treeline
//!
//! These drive the CLI end to end: a unit summary goes in, a graph
//! file comes out.

use std::process::Command;

/// Test that the CLI can be invoked
#[test]
fn test_cli_invocation() {
    let output = Command::new("cargo")
        .args(["run", "--", "--help"])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("treeline"));
    assert!(stdout.contains("Per-unit dependency graphs"));
}

/// Test that `build` turns a summary into a graph file plus dot output
#[test]
fn test_build_command() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("U.summary.json");
    let output_path = dir.path().join("U.deps.json");

    let summary = serde_json::json!({
        "name": "U",
        "interface_fingerprint": "H1",
        "declarations": {
            "decls": [
                {"kind": "Function", "name": "f", "access": "Public"}
            ],
            "top_level": [0]
        },
        "references": {
            "top_level": {"g": false}
        },
        "external_dependencies": ["libX"]
    });
    std::fs::write(&summary_path, summary.to_string()).unwrap();

    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "build",
            summary_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
            "--dot",
        ])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let graph: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(graph["unit"], "U");
    // Whole-unit pair, f's pair, and the two use targets.
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 6);
    assert!(dir.path().join("U.deps.dot").exists());
}

/// Test that a summary flagged with a compilation error degrades to
/// the whole-unit pair
#[test]
fn test_build_command_with_compilation_error() {
    let dir = tempfile::tempdir().unwrap();
    let summary_path = dir.path().join("U.summary.json");
    let output_path = dir.path().join("U.deps.json");

    let summary = serde_json::json!({
        "name": "U",
        "interface_fingerprint": "H1",
        "had_compilation_error": true,
        "declarations": {
            "decls": [
                {"kind": "Function", "name": "f", "access": "Public"}
            ],
            "top_level": [0]
        }
    });
    std::fs::write(&summary_path, summary.to_string()).unwrap();

    let output = Command::new("cargo")
        .args([
            "run",
            "--",
            "build",
            summary_path.to_str().unwrap(),
            "-o",
            output_path.to_str().unwrap(),
        ])
        .current_dir(".")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let graph: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert_eq!(graph["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(graph["arcs"].as_array().unwrap().len(), 0);
}
