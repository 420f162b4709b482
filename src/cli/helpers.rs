//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use chrono::{NaiveDate, NaiveDateTime};
use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::dates;
use crate::core::identity::{CarrierId, PersonId};
use crate::core::ledger::Ledger;

/// Effective configuration with the `--db` flag applied
pub fn config(global: &GlobalOpts) -> Config {
    let mut config = Config::load();
    if let Some(db) = &global.db {
        config.database = db.clone();
    }
    config
}

/// Open the configured ledger; it must already exist
pub fn open_ledger(global: &GlobalOpts) -> Result<Ledger> {
    let config = config(global);
    tracing::debug!(database = %config.database.display(), "opening ledger");
    Ok(Ledger::from_config(&config)?)
}

/// Resolve a carrier given as numeric ID or name
pub fn resolve_carrier(ledger: &Ledger, input: &str) -> Result<CarrierId> {
    if let Ok(id) = input.trim().parse::<CarrierId>() {
        return Ok(ledger.get_carrier(id)?.carrier_id);
    }
    ledger
        .find_carrier_by_name(input)?
        .map(|c| c.carrier_id)
        .ok_or_else(|| miette::miette!("No carrier found matching '{}'", input))
}

/// clap value parser for person IDs
pub fn parse_person_id(s: &str) -> Result<PersonId, String> {
    PersonId::parse(s).map_err(|e| e.to_string())
}

/// clap value parser for dates
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    dates::parse_date(s)
}

/// clap value parser for timestamps
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    dates::parse_timestamp(s)
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Display an optional value, "-" when absent
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Format an emissions figure in kg
pub fn format_kg(kg: f64) -> String {
    format!("{:.2}", kg)
}

/// Format a timestamp without seconds when they are zero
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    if ts.format("%S").to_string() == "00" {
        ts.format("%Y-%m-%d %H:%M").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
