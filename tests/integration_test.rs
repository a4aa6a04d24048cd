//! Integration tests for the stream engine CLI.
//!
//! These tests run the actual binary and verify output against expected CSV files.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

/// Get path to test data file
fn test_data_path(filename: &str) -> String {
    format!("tests/data/{}", filename)
}

/// Run the binary with the given input file and return stdout
fn run_engine(input_file: &str) -> String {
    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    let assert = cmd.arg(input_file).assert().success();
    String::from_utf8(assert.get_output().stdout.clone()).unwrap()
}

/// Normalize CSV for comparison (trim whitespace, drop blank lines)
fn normalize_csv(csv: &str) -> Vec<String> {
    csv.lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

fn assert_matches_expected(sample: &str, expected: &str) {
    let output = run_engine(&test_data_path(sample));
    let expected = fs::read_to_string(test_data_path(expected)).unwrap();
    assert_eq!(normalize_csv(&output), normalize_csv(&expected));
}

#[test]
fn test_sample_a_pause_resume_withdraw() {
    assert_matches_expected("sample_a.csv", "expected_a.csv");
}

#[test]
fn test_sample_b_rejected_operations() {
    assert_matches_expected("sample_b_rejections.csv", "expected_b.csv");
}

#[test]
fn test_sample_c_whitespace_and_case() {
    assert_matches_expected("sample_c_whitespace.csv", "expected_c.csv");
}

#[test]
fn test_sample_d_edge_cases() {
    assert_matches_expected("sample_d_edge_cases.csv", "expected_d.csv");
}

#[test]
fn test_events_file_written() {
    let dir = tempdir().unwrap();
    let events_path = dir.path().join("events.csv");

    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    cmd.arg(test_data_path("sample_a.csv"))
        .arg(&events_path)
        .assert()
        .success();

    let events = fs::read_to_string(&events_path).unwrap();
    let expected = fs::read_to_string(test_data_path("expected_a_events.csv")).unwrap();
    assert_eq!(normalize_csv(&events), normalize_csv(&expected));
}

#[test]
fn test_missing_argument() {
    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file argument"));
}

#[test]
fn test_nonexistent_file() {
    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    cmd.arg("nonexistent_file.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("I/O error"));
}

#[test]
fn test_header_only_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    fs::write(
        &input,
        "op,time,caller,stream,counterparty,amount,duration,description\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    cmd.arg(&input).assert().success().stdout(
        predicate::str::contains(
            "stream,payer,payee,total,withdrawn,withdrawable,start,end,rate,status,progress",
        )
        .and(predicate::str::contains("0xa11ce").not()),
    );
}

#[test]
fn test_rejections_are_logged_not_fatal() {
    let mut cmd = Command::cargo_bin("stream-engine").unwrap();
    cmd.env("RUST_LOG", "warn")
        .arg(test_data_path("sample_b_rejections.csv"))
        .assert()
        .success()
        .stderr(predicate::str::contains("not authorized"));
}
