//! Shared test helpers for integration tests
//!
//! Every helper runs the binary inside a temporary working directory so the
//! default `.greenboard/greenboard.db` ledger lands there.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use tempfile::TempDir;

/// Helper to get a greenboard command with no ambient database override
pub fn greenboard() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("greenboard"));
    cmd.env_remove("GREENBOARD_DB").env_remove("RUST_LOG");
    cmd
}

/// Helper to get a greenboard command running inside a test ledger directory
pub fn greenboard_in(tmp: &TempDir) -> Command {
    let mut cmd = greenboard();
    cmd.current_dir(tmp.path());
    cmd
}

/// Helper to create a ledger with the standard carriers and factors
pub fn setup_test_ledger() -> TempDir {
    let tmp = TempDir::new().unwrap();
    greenboard_in(&tmp)
        .args(["init", "--fixtures"])
        .assert()
        .success();
    tmp
}

/// Helper to create a person; extra flags such as `--student` are appended
pub fn create_test_person(tmp: &TempDir, id: &str, extra: &[&str]) {
    greenboard_in(tmp)
        .args(["person", "new", id])
        .args(extra)
        .assert()
        .success();
}

/// Helper to create a package and return its ID
pub fn create_test_package(tmp: &TempDir, args: &[&str]) -> String {
    let output = greenboard_in(tmp)
        .args(["package", "new"])
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "package new failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    // Output format: "✓ Created package 7 (130.00 kg CO2e via UPS Ground)"
    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .split_whitespace()
        .skip_while(|w| *w != "package")
        .nth(1)
        .unwrap_or_default()
        .to_string()
}

/// Helper to run a command and capture stdout
pub fn stdout_of(tmp: &TempDir, args: &[&str]) -> String {
    let output = greenboard_in(tmp).args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}
