//! CLI parsing tests for the bdiosplit command
//!
//! Tests that verify CLI argument parsing works correctly.

use assert_cmd::Command;
use predicates::prelude::*;

/// Get a Command for the bdiosplit binary
#[allow(deprecated)]
fn bdiosplit() -> Command {
    Command::cargo_bin("bdiosplit").expect("Failed to find bdiosplit binary")
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_shows_all_commands() {
    bdiosplit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("scan-json"));
}

#[test]
fn test_version_flag() {
    bdiosplit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("bdiosplit"));
}

// ============================================================================
// Global Options Tests
// ============================================================================

#[test]
fn test_global_options_in_help() {
    bdiosplit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--config"))
        .stdout(predicate::str::contains("--verbose"))
        .stdout(predicate::str::contains("--quiet"));
}

#[test]
fn test_unknown_command_fails() {
    bdiosplit()
        .arg("merge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// ============================================================================
// Split Command Tests
// ============================================================================

#[test]
fn test_split_help() {
    bdiosplit()
        .args(["split", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--input-dir"))
        .stdout(predicate::str::contains("--output-dir"))
        .stdout(predicate::str::contains("--max-file-entries"))
        .stdout(predicate::str::contains("--max-chunk-nodes"))
        .stdout(predicate::str::contains("--first-window-nodes"))
        .stdout(predicate::str::contains("--strategy"))
        .stdout(predicate::str::contains("--project-name"))
        .stdout(predicate::str::contains("--project-version"))
        .stdout(predicate::str::contains("--parallel"));
}

#[test]
fn test_split_requires_directories() {
    bdiosplit()
        .arg("split")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--input-dir"));
}

#[test]
fn test_split_rejects_unknown_strategy() {
    bdiosplit()
        .args(["split", "--in", "a", "--out", "b", "--strategy", "bytes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown strategy"));
}

#[test]
fn test_split_rejects_non_numeric_limit() {
    bdiosplit()
        .args(["split", "--in", "a", "--out", "b", "--max-chunk-nodes", "many"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

// ============================================================================
// Other Command Tests
// ============================================================================

#[test]
fn test_inspect_help() {
    bdiosplit()
        .args(["inspect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--plan"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_check_requires_output_dir() {
    bdiosplit()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OUTPUT_DIR"));
}

#[test]
fn test_scan_json_help() {
    bdiosplit()
        .args(["scan-json", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--step"))
        .stdout(predicate::str::contains("200000"));
}
