//! Ledger - the persistent store for carriers, persons, packages and their events
//!
//! The ledger is a SQLite database. Every mutation runs as one `BEGIN
//! IMMEDIATE` transaction, so concurrent writers on the same file serialize
//! and no caller ever observes a partially applied cascade. Several `Ledger`
//! handles may be opened on one file from different threads or processes.
//!
//! Operations are grouped by concern:
//! - `carriers.rs` / `factors.rs` - reference registries
//! - `persons.rs` - person directory and department affiliations
//! - `packages.rs` - package ledger and emissions snapshots
//! - `transactions.rs` - lifecycle event log and inferred status
//! - `reports.rs` - emissions aggregations, leaderboards and timelines
//! - `import.rs` - bulk CSV ingestion

mod carriers;
mod error;
mod factors;
mod import;
mod packages;
mod persons;
pub mod policy;
mod reports;
pub mod schema;
mod serialize;
mod transactions;


use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use serde::Serialize;

use crate::core::config::{Config, DEFAULT_OTHER_FACTOR};

pub use error::{LedgerError, LedgerResult};
pub use import::ImportSummary;
pub use packages::Page;
pub use policy::{DeleteOutcome, ForeignKey, OnDelete, PolicyEffect, FOREIGN_KEYS};
pub use reports::{
    DateRange, Interval, MajorStanding, StatusCount, StudentStanding, TimelinePoint,
    TimelineScope,
};

/// Options used when opening a ledger
#[derive(Debug, Clone)]
pub struct LedgerOptions {
    /// How long a writer waits for another writer's lock
    pub busy_timeout: Duration,

    /// Factor seeded for the "Other" service type in a new database
    pub default_factor: f64,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(5000),
            default_factor: DEFAULT_OTHER_FACTOR,
        }
    }
}

impl From<&Config> for LedgerOptions {
    fn from(config: &Config) -> Self {
        Self {
            busy_timeout: Duration::from_millis(config.busy_timeout_ms),
            default_factor: config.default_factor,
        }
    }
}

/// Row counts per table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub carriers: usize,
    pub emission_factors: usize,
    pub persons: usize,
    pub departments: usize,
    pub packages: usize,
    pub transactions: usize,
}

/// Handle on a ledger database
pub struct Ledger {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Ledger {
    /// Open (creating if needed) the ledger at `path`
    pub fn open(path: &Path, options: &LedgerOptions) -> LedgerResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.busy_timeout(options.busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        let ledger = Self::init(conn, Some(path.to_path_buf()), options)?;
        tracing::debug!(path = %path.display(), "opened ledger");
        Ok(ledger)
    }

    /// Open an existing ledger without creating it
    pub fn open_existing(path: &Path, options: &LedgerOptions) -> LedgerResult<Self> {
        if !path.exists() {
            return Err(LedgerError::validation(format!(
                "no ledger at {}; run 'greenboard init' first",
                path.display()
            )));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::init(conn, Some(path.to_path_buf()), options)
    }

    /// Open a ledger using the effective configuration
    pub fn from_config(config: &Config) -> LedgerResult<Self> {
        Self::open_existing(&config.database, &LedgerOptions::from(config))
    }

    /// Open a private in-memory ledger (tests and dry runs)
    pub fn open_in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None, &LedgerOptions::default())
    }

    fn init(conn: Connection, path: Option<PathBuf>, options: &LedgerOptions) -> LedgerResult<Self> {
        conn.pragma_update(None, "foreign_keys", true)?;
        conn.busy_timeout(options.busy_timeout)?;

        let mut ledger = Self { conn, path };
        let tx = ledger.write()?;
        schema::create(&tx)?;
        schema::seed_defaults(&tx, options.default_factor)?;
        tx.commit()?;
        Ok(ledger)
    }

    /// Database path, `None` for in-memory ledgers
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Start a write transaction holding the database write lock
    fn write(&mut self) -> LedgerResult<rusqlite::Transaction<'_>> {
        Ok(self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?)
    }

    /// Add the fixture carriers and emission factors; returns rows inserted
    pub fn seed_fixtures(&mut self) -> LedgerResult<usize> {
        let tx = self.write()?;
        let inserted = schema::seed_fixtures(&tx)?;
        tx.commit()?;
        tracing::info!(inserted, "seeded fixtures");
        Ok(inserted)
    }

    /// Row counts for every table
    pub fn statistics(&self) -> LedgerResult<LedgerStats> {
        let count = |table: &str| -> LedgerResult<usize> {
            Ok(self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?)
        };
        Ok(LedgerStats {
            carriers: count("carriers")?,
            emission_factors: count("emission_factors")?,
            persons: count("persons")?,
            departments: count("departments")?,
            packages: count("packages")?,
            transactions: count("transactions")?,
        })
    }
}
