//! CLI and basic command tests

mod common;

use common::{
    create_test_package, create_test_person, greenboard, greenboard_in, setup_test_ledger,
    stdout_of,
};
use predicates::prelude::*;
use tempfile::TempDir;

// ============================================================================
// CLI Basic Tests
// ============================================================================

#[test]
fn test_help_displays() {
    greenboard()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("carbon accounting"));
}

#[test]
fn test_version_displays() {
    greenboard()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("greenboard"));
}

#[test]
fn test_unknown_command_fails() {
    greenboard()
        .arg("unknown-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_completions_bash() {
    greenboard()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greenboard"));
}

// ============================================================================
// Init Command Tests
// ============================================================================

#[test]
fn test_init_creates_ledger_and_config() {
    let tmp = TempDir::new().unwrap();

    greenboard_in(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized"));

    assert!(tmp.path().join(".greenboard/config.yaml").exists());
    assert!(tmp.path().join(".greenboard/greenboard.db").exists());
}

#[test]
fn test_init_twice_reports_existing_ledger() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_init_with_db_flag() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("custom/mail.db");

    greenboard_in(&tmp)
        .args(["init", "--db"])
        .arg(&db)
        .assert()
        .success();
    assert!(db.exists());

    greenboard_in(&tmp)
        .args(["carrier", "list", "--db"])
        .arg(&db)
        .assert()
        .success()
        .stdout(predicate::str::contains("Other"));
}

#[test]
fn test_commands_require_init() {
    let tmp = TempDir::new().unwrap();
    greenboard_in(&tmp)
        .args(["carrier", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("greenboard init"));
}

// ============================================================================
// Carrier and Factor Tests
// ============================================================================

#[test]
fn test_carrier_list_includes_fixtures() {
    let tmp = setup_test_ledger();
    let out = stdout_of(&tmp, &["carrier", "list"]);
    assert!(out.starts_with("ID\tNAME"));
    assert!(out.contains("1\tOther"));
    assert!(out.contains("UPS"));
    assert!(out.contains("FedEx"));
}

#[test]
fn test_carrier_duplicate_name_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["carrier", "new", "ups"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_carrier_rename_and_delete() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["carrier", "new", "OnTrac"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created carrier"));

    greenboard_in(&tmp)
        .args(["carrier", "rename", "OnTrac", "LaserShip"])
        .assert()
        .success();

    greenboard_in(&tmp)
        .args(["carrier", "delete", "LaserShip"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted carrier"));

    let out = stdout_of(&tmp, &["carrier", "list"]);
    assert!(!out.contains("LaserShip"));
    assert!(!out.contains("OnTrac"));
}

#[test]
fn test_sentinel_carrier_cannot_be_deleted() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["carrier", "delete", "1"])
        .assert()
        .failure();
}

#[test]
fn test_carrier_in_use_cannot_be_deleted() {
    let tmp = setup_test_ledger();
    create_test_package(&tmp, &["-t", "1Z999", "-c", "UPS", "-d", "10"]);
    greenboard_in(&tmp)
        .args(["carrier", "delete", "UPS"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still referenced"));
}

#[test]
fn test_factor_set_and_show() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["factor", "set", "Drone", "0.05"])
        .assert()
        .success();

    greenboard_in(&tmp)
        .args(["factor", "show", "drone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0.05"));
}

#[test]
fn test_factor_show_unknown_falls_back() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["factor", "show", "Carrier Pigeon"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Other"))
        .stdout(predicate::str::contains("fallback"));
}

#[test]
fn test_factor_negative_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["factor", "set", "Drone", "--", "-1"])
        .assert()
        .failure();
}

// ============================================================================
// Person Tests
// ============================================================================

#[test]
fn test_person_new_and_show_json() {
    let tmp = setup_test_ledger();
    create_test_person(
        &tmp,
        "123456789",
        &["--first", "Ada", "--last", "Lovelace", "--student", "--dept", "Mathematics"],
    );

    let out = stdout_of(&tmp, &["person", "show", "123456789", "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["wpi_id"], "123456789");
    assert_eq!(value["is_student"], true);
    assert_eq!(value["first_name"], "Ada");
}

#[test]
fn test_person_malformed_id_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["person", "new", "12345"])
        .assert()
        .failure();
}

#[test]
fn test_person_list_count_filters() {
    let tmp = setup_test_ledger();
    create_test_person(&tmp, "100000001", &["--student"]);
    create_test_person(&tmp, "100000002", &["--worker"]);
    create_test_person(&tmp, "100000003", &["--student", "--worker"]);

    let all = stdout_of(&tmp, &["person", "list", "--count"]);
    assert_eq!(all.trim(), "3");
    let students = stdout_of(&tmp, &["person", "list", "--students", "--count"]);
    assert_eq!(students.trim(), "2");
    let workers = stdout_of(&tmp, &["person", "list", "--workers", "--count"]);
    assert_eq!(workers.trim(), "2");
}

#[test]
fn test_person_unknown_supervisor_rejected() {
    let tmp = setup_test_ledger();
    create_test_person(&tmp, "100000001", &[]);
    greenboard_in(&tmp)
        .args(["person", "supervisor", "100000001", "999999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

// ============================================================================
// Package and Transaction Tests
// ============================================================================

#[test]
fn test_package_emissions_from_factor() {
    let tmp = setup_test_ledger();
    let id = create_test_package(&tmp, &["-t", "1Z001", "-c", "UPS", "-s", "UPS Ground", "-d", "250"]);
    assert_eq!(id, "1");

    let out = stdout_of(&tmp, &["package", "show", &id, "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let kg = value["total_emissions_kg"].as_f64().unwrap();
    assert!((kg - 130.0).abs() < 1e-9);
    assert_eq!(value["status"], "unprocessed");
}

#[test]
fn test_package_show_reports_transport_mode() {
    let tmp = setup_test_ledger();
    let id = create_test_package(&tmp, &["-t", "1Z001", "-c", "UPS", "-s", "UPS Ground", "-d", "250"]);

    greenboard_in(&tmp)
        .args(["package", "show", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: truck (typically 0.127 kg CO2e/t-km)"));

    let out = stdout_of(&tmp, &["package", "show", &id, "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["emissions"]["transport_mode"], "truck");
    assert_eq!(value["emissions"]["mode_reference_factor"], 0.127);
}

#[test]
fn test_package_unknown_service_uses_other() {
    let tmp = setup_test_ledger();
    let id = create_test_package(&tmp, &["-t", "X1", "-s", "Teleport", "-d", "200"]);

    let out = stdout_of(&tmp, &["package", "show", &id, "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["service_type"], "Other");
    assert!((value["total_emissions_kg"].as_f64().unwrap() - 150.0).abs() < 1e-9);
}

#[test]
fn test_package_unknown_recipient_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["package", "new", "-t", "1Z001", "-r", "999999999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_package_negative_distance_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["package", "new", "-t", "1Z001", "--distance=-3"])
        .assert()
        .failure();
}

#[test]
fn test_transactions_drive_status() {
    let tmp = setup_test_ledger();
    create_test_person(&tmp, "900000009", &["--worker"]);
    let id = create_test_package(&tmp, &["-t", "1Z001", "-c", "UPS", "-d", "10"]);

    assert_eq!(stdout_of(&tmp, &["package", "status", &id]).trim(), "unprocessed");

    greenboard_in(&tmp)
        .args(["txn", "add", &id, "stored", "--date", "2024-03-01 09:00", "--locker", "A12"])
        .args(["-w", "900000009"])
        .assert()
        .success()
        .stdout(predicate::str::contains("now stored"));

    greenboard_in(&tmp)
        .args(["txn", "add", &id, "delivered", "--date", "2024-03-02 15:00"])
        .assert()
        .success();

    // An out-of-order event with an earlier timestamp does not change the status
    greenboard_in(&tmp)
        .args(["txn", "add", &id, "routed", "--date", "2024-03-01 12:00"])
        .assert()
        .success();

    assert_eq!(stdout_of(&tmp, &["package", "status", &id]).trim(), "delivered");

    let history = stdout_of(&tmp, &["txn", "list", &id]);
    let kinds: Vec<&str> = history
        .lines()
        .skip(1)
        .filter_map(|l| l.split('\t').nth(2))
        .collect();
    assert_eq!(kinds, vec!["stored", "routed", "delivered"]);
}

#[test]
fn test_txn_unknown_package_rejected() {
    let tmp = setup_test_ledger();
    greenboard_in(&tmp)
        .args(["txn", "add", "42", "stored"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_txn_bad_type_rejected() {
    let tmp = setup_test_ledger();
    let id = create_test_package(&tmp, &["-t", "1Z001"]);
    greenboard_in(&tmp)
        .args(["txn", "add", &id, "lost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("stored/routed/delivered"));
}

#[test]
fn test_package_with_history_cannot_be_deleted() {
    let tmp = setup_test_ledger();
    let id = create_test_package(&tmp, &["-t", "1Z001"]);
    greenboard_in(&tmp)
        .args(["txn", "add", &id, "stored"])
        .assert()
        .success();

    greenboard_in(&tmp)
        .args(["package", "delete", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still referenced"));

    greenboard_in(&tmp)
        .args(["txn", "delete", "1"])
        .assert()
        .success();

    greenboard_in(&tmp)
        .args(["package", "delete", &id])
        .assert()
        .success();
}

#[test]
fn test_deleting_recipient_keeps_package() {
    let tmp = setup_test_ledger();
    create_test_person(&tmp, "123456789", &["--student"]);
    let id = create_test_package(&tmp, &["-t", "1Z001", "-r", "123456789", "-d", "10"]);

    greenboard_in(&tmp)
        .args(["person", "delete", "123456789"])
        .assert()
        .success();

    let out = stdout_of(&tmp, &["package", "show", &id, "--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert!(value.get("recipient_id").is_none());
}

#[test]
fn test_package_search_by_carrier_and_tracking() {
    let tmp = setup_test_ledger();
    create_test_package(&tmp, &["-t", "1Z001", "-c", "UPS", "-d", "10"]);
    create_test_package(&tmp, &["-t", "9400111", "-c", "USPS", "-d", "10"]);

    let out = stdout_of(&tmp, &["package", "search", "-c", "ups"]);
    assert!(out.contains("1Z001"));
    assert!(!out.contains("9400111"));

    let out = stdout_of(&tmp, &["package", "search", "-t", "9400"]);
    assert!(out.contains("9400111"));
    assert!(!out.contains("1Z001"));
}

#[test]
fn test_package_list_csv_paging() {
    let tmp = setup_test_ledger();
    for tracking in ["A1", "A2", "A3"] {
        create_test_package(&tmp, &["-t", tracking]);
    }

    let out = stdout_of(&tmp, &["package", "list", "--per-page", "2", "--format", "csv"]);
    assert_eq!(out.lines().count(), 3);
    assert!(out.starts_with("ID,TRACKING"));

    let out = stdout_of(&tmp, &["package", "list", "--per-page", "2", "-p", "3"]);
    assert!(out.contains("No packages on page 3"));
}

#[test]
fn test_package_list_huge_page_number() {
    let tmp = setup_test_ledger();
    create_test_package(&tmp, &["-t", "A1"]);
    greenboard_in(&tmp)
        .args(["package", "list", "--page", "18446744073709551615"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No packages on page"));
}
