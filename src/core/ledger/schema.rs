//! SQLite schema, default rows and optional fixtures
//!
//! Column names are a stable contract with the dashboard and import tooling.
//! The `ON DELETE` clauses mirror the policy table in `policy.rs`; the engine
//! applies that table itself and the clauses only act as a backstop.

use rusqlite::{params, Connection};

use super::error::{LedgerError, LedgerResult};
use crate::entities::OTHER;

/// Schema version stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS carriers (
    carrier_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    carrier_name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS emission_factors (
    service_type    TEXT PRIMARY KEY COLLATE NOCASE,
    emission_factor REAL NOT NULL CHECK (emission_factor >= 0)
);

CREATE TABLE IF NOT EXISTS persons (
    wpi_id             TEXT PRIMARY KEY CHECK (length(wpi_id) = 9),
    first_name         TEXT,
    last_name          TEXT,
    is_student         INTEGER NOT NULL DEFAULT 0,
    is_mailroom_worker INTEGER NOT NULL DEFAULT 0,
    box_number         TEXT,
    class_year         INTEGER,
    supervisor_id      TEXT REFERENCES persons(wpi_id) ON DELETE SET NULL
);

CREATE TABLE IF NOT EXISTS departments (
    person_id       TEXT NOT NULL REFERENCES persons(wpi_id) ON DELETE CASCADE,
    department_name TEXT NOT NULL COLLATE NOCASE,
    PRIMARY KEY (person_id, department_name)
);

CREATE TABLE IF NOT EXISTS packages (
    package_id         INTEGER PRIMARY KEY AUTOINCREMENT,
    carrier_id         INTEGER REFERENCES carriers(carrier_id) ON DELETE RESTRICT,
    recipient_id       TEXT REFERENCES persons(wpi_id) ON DELETE SET NULL,
    tracking_number    TEXT NOT NULL,
    service_type       TEXT REFERENCES emission_factors(service_type) ON DELETE SET NULL,
    date_shipped       TEXT,
    total_emissions_kg REAL NOT NULL,
    distance_traveled  REAL NOT NULL CHECK (distance_traveled >= 0)
);

CREATE TABLE IF NOT EXISTS transactions (
    transaction_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    date             TEXT NOT NULL,
    transaction_type TEXT NOT NULL CHECK (transaction_type IN ('delivered', 'stored', 'routed')),
    locker           TEXT,
    location         TEXT,
    package_id       INTEGER NOT NULL REFERENCES packages(package_id) ON DELETE RESTRICT,
    worker_id        TEXT REFERENCES persons(wpi_id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_persons_supervisor ON persons(supervisor_id);
CREATE INDEX IF NOT EXISTS idx_packages_carrier ON packages(carrier_id);
CREATE INDEX IF NOT EXISTS idx_packages_recipient ON packages(recipient_id);
CREATE INDEX IF NOT EXISTS idx_packages_service ON packages(service_type);
CREATE INDEX IF NOT EXISTS idx_packages_tracking ON packages(tracking_number);
CREATE INDEX IF NOT EXISTS idx_packages_shipped ON packages(date_shipped);
CREATE INDEX IF NOT EXISTS idx_transactions_package ON transactions(package_id, date);
CREATE INDEX IF NOT EXISTS idx_transactions_worker ON transactions(worker_id);
"#;

/// Carriers added by `greenboard init --fixtures`, in insertion order
pub const FIXTURE_CARRIERS: &[&str] = &["UPS", "FedEx", "USPS", "DHL", "Amazon"];

/// Emission factors added by `greenboard init --fixtures`
pub const FIXTURE_FACTORS: &[(&str, f64)] = &[
    ("UPS Ground", 0.52),
    ("UPS Next Day Air", 0.82),
    ("UPS 2nd Day Air", 0.75),
    ("FedEx Ground", 0.127),
    ("FedEx Home Delivery", 0.127),
    ("FedEx Priority Overnight", 0.90),
    ("FedEx International Priority", 0.75),
    ("USPS Priority Mail", 0.75),
    ("USPS Ground Advantage", 0.127),
    ("DHL Express Worldwide", 0.75),
    ("Amazon Ground", 0.307),
];

/// Create tables if needed and check the schema version
pub(crate) fn create(conn: &Connection) -> LedgerResult<()> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
    if version > SCHEMA_VERSION {
        return Err(LedgerError::validation(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    conn.execute_batch(SCHEMA)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Seed the sentinel "Other" carrier and emission factor
///
/// Existing rows are left alone, so an operator-tuned "Other" factor survives
/// reopening the database.
pub(crate) fn seed_defaults(conn: &Connection, other_factor: f64) -> LedgerResult<()> {
    conn.execute(
        "INSERT OR IGNORE INTO carriers (carrier_name) VALUES (?1)",
        params![OTHER],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO emission_factors (service_type, emission_factor) VALUES (?1, ?2)",
        params![OTHER, other_factor],
    )?;
    Ok(())
}

/// Insert the fixture carriers and factors, skipping ones that already exist
pub(crate) fn seed_fixtures(conn: &Connection) -> LedgerResult<usize> {
    let mut inserted = 0;
    for name in FIXTURE_CARRIERS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO carriers (carrier_name) VALUES (?1)",
            params![name],
        )?;
    }
    for (label, factor) in FIXTURE_FACTORS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO emission_factors (service_type, emission_factor) VALUES (?1, ?2)",
            params![label, factor],
        )?;
    }
    Ok(inserted)
}
