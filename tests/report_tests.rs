//! Emissions report tests

mod common;

use common::{create_test_package, create_test_person, greenboard_in, setup_test_ledger, stdout_of};
use predicates::prelude::*;
use tempfile::TempDir;

/// Two students in different majors and one staff member with shipped packages
fn setup_campus() -> TempDir {
    let tmp = setup_test_ledger();
    create_test_person(&tmp, "100000001", &["--student", "--first", "Ada", "--dept", "Mathematics"]);
    create_test_person(&tmp, "100000002", &["--student", "--first", "Alan", "--dept", "Computer Science"]);
    create_test_person(&tmp, "100000003", &["--first", "Grace", "--dept", "Computer Science"]);

    // 250 km × 0.52 = 130 kg
    create_test_package(
        &tmp,
        &["-t", "P1", "-c", "UPS", "-s", "UPS Ground", "-d", "250", "-r", "100000001", "--shipped", "2024-01-15"],
    );
    // 200 km × 0.75 = 150 kg
    create_test_package(
        &tmp,
        &["-t", "P2", "-s", "Other", "-d", "200", "-r", "100000002", "--shipped", "2024-01-31 23:59"],
    );
    // 100 km × 0.75 = 75 kg
    create_test_package(
        &tmp,
        &["-t", "P3", "-d", "100", "-r", "100000003", "--shipped", "2024-02-01"],
    );
    tmp
}

fn total_of(tmp: &TempDir, args: &[&str]) -> f64 {
    let mut full = args.to_vec();
    full.extend(["--format", "json"]);
    let out = stdout_of(tmp, &full);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    value["total_emissions_kg"].as_f64().unwrap()
}

#[test]
fn test_report_person_total() {
    let tmp = setup_campus();
    assert!((total_of(&tmp, &["report", "person", "100000001"]) - 130.0).abs() < 1e-9);

    greenboard_in(&tmp)
        .args(["report", "person", "100000001"])
        .assert()
        .success()
        .stdout(predicate::str::contains("130.00 kg CO2e"));
}

#[test]
fn test_report_unknown_person_fails() {
    let tmp = setup_campus();
    greenboard_in(&tmp)
        .args(["report", "person", "999999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_report_department_includes_staff() {
    let tmp = setup_campus();
    let total = total_of(&tmp, &["report", "department", "Computer Science"]);
    assert!((total - 225.0).abs() < 1e-9);

    let none = total_of(&tmp, &["report", "department", "Philosophy"]);
    assert_eq!(none, 0.0);
}

#[test]
fn test_report_range_is_inclusive() {
    let tmp = setup_campus();
    let january = total_of(&tmp, &["report", "range", "2024-01-01", "2024-01-31"]);
    assert!((january - 280.0).abs() < 1e-9);

    let one_day = total_of(&tmp, &["report", "range", "2024-02-01", "2024-02-01"]);
    assert!((one_day - 75.0).abs() < 1e-9);
}

#[test]
fn test_report_range_rejects_reversed_dates() {
    let tmp = setup_campus();
    greenboard_in(&tmp)
        .args(["report", "range", "2024-02-01", "2024-01-01"])
        .assert()
        .failure();
}

#[test]
fn test_student_leaderboard_ranks_students_only() {
    let tmp = setup_campus();
    let out = stdout_of(&tmp, &["report", "students", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["person_id"], "100000002");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["person_id"], "100000001");

    let out = stdout_of(&tmp, &["report", "students", "--major", "Mathematics", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value.as_array().unwrap().len(), 1);
}

#[test]
fn test_major_leaderboard() {
    let tmp = setup_campus();
    let out = stdout_of(&tmp, &["report", "majors"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "RANK\tMAJOR\tKG CO2E");
    assert_eq!(lines[1], "1\tComputer Science\t150.00");
    assert_eq!(lines[2], "2\tMathematics\t130.00");
}

#[test]
fn test_timeline_by_month() {
    let tmp = setup_campus();
    let out = stdout_of(&tmp, &["report", "timeline", "--format", "csv"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("2024-01-01,2,2,280.00"));
    assert!(lines[2].starts_with("2024-02-01,1,1,75.00"));
}

#[test]
fn test_timeline_students_and_range() {
    let tmp = setup_campus();
    let out = stdout_of(
        &tmp,
        &["report", "timeline", "--students", "-i", "day", "--from", "2024-01-31", "--format", "csv"],
    );
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("2024-01-31,1,1,150.00"));
}

#[test]
fn test_timeline_empty_range() {
    let tmp = setup_campus();
    greenboard_in(&tmp)
        .args(["report", "timeline", "--from", "2030-01-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No shipped packages"));
}

#[test]
fn test_status_summary() {
    let tmp = setup_campus();
    greenboard_in(&tmp)
        .args(["txn", "add", "1", "stored"])
        .assert()
        .success();
    greenboard_in(&tmp)
        .args(["txn", "add", "2", "delivered"])
        .assert()
        .success();

    let out = stdout_of(&tmp, &["report", "status"]);
    assert!(out.contains("unprocessed\t1"));
    assert!(out.contains("stored\t1"));
    assert!(out.contains("routed\t0"));
    assert!(out.contains("delivered\t1"));
}
