//! Greenboard: mailroom package ledger with per-package carbon accounting
//!
//! Carriers, emission factors, persons, packages and their lifecycle events
//! live in one SQLite ledger that enforces referential integrity through an
//! explicit cascade policy. Emissions are snapshotted when a package is
//! recorded and aggregated per person, department and date range.

pub mod cli;
pub mod core;
pub mod entities;
