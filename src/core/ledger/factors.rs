//! Emission factor registry

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{LedgerError, LedgerResult};
use super::policy::{self, DeleteOutcome};
use super::Ledger;
use crate::entities::emission_factor::MAX_LABEL_LEN;
use crate::entities::{EmissionFactor, OTHER};

fn from_row(row: &Row<'_>) -> rusqlite::Result<EmissionFactor> {
    Ok(EmissionFactor {
        service_type: row.get(0)?,
        emission_factor: row.get(1)?,
    })
}

fn validate_label(label: &str) -> LedgerResult<String> {
    let label = label.trim();
    if label.is_empty() {
        return Err(LedgerError::validation("service type must not be empty"));
    }
    if label.chars().count() > MAX_LABEL_LEN {
        return Err(LedgerError::validation(format!(
            "service type '{}' is longer than {} characters",
            label, MAX_LABEL_LEN
        )));
    }
    Ok(label.to_string())
}

fn validate_factor(factor: f64) -> LedgerResult<f64> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(LedgerError::validation(format!(
            "emission factor must be a non-negative number, got {}",
            factor
        )));
    }
    Ok(factor)
}

pub(crate) fn lookup(conn: &Connection, service_type: &str) -> LedgerResult<Option<EmissionFactor>> {
    Ok(conn
        .query_row(
            "SELECT service_type, emission_factor FROM emission_factors WHERE service_type = ?1",
            params![service_type.trim()],
            from_row,
        )
        .optional()?)
}

/// Resolve the factor applied to a package
///
/// Absent or unknown service types fall back to the "Other" factor. The
/// returned row carries the stored label, which is what packages reference.
pub(crate) fn resolve(conn: &Connection, service_type: Option<&str>) -> LedgerResult<EmissionFactor> {
    if let Some(label) = service_type.map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(factor) = lookup(conn, label)? {
            return Ok(factor);
        }
        tracing::warn!(service_type = label, "unknown service type, using '{}' factor", OTHER);
    }
    lookup(conn, OTHER)?.ok_or_else(|| LedgerError::not_found::<EmissionFactor>(OTHER))
}

impl Ledger {
    /// Create or update the factor for a service type
    ///
    /// Packages already recorded keep their emissions snapshot.
    pub fn set_factor(&mut self, service_type: &str, factor: f64) -> LedgerResult<()> {
        let label = validate_label(service_type)?;
        let factor = validate_factor(factor)?;
        let tx = self.write()?;
        let updated = tx.execute(
            "UPDATE emission_factors SET emission_factor = ?2 WHERE service_type = ?1",
            params![label, factor],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO emission_factors (service_type, emission_factor) VALUES (?1, ?2)",
                params![label, factor],
            )?;
        }
        tx.commit()?;
        tracing::info!(service_type = %label, factor, created = updated == 0, "set emission factor");
        Ok(())
    }

    /// Factor for a service type, if one is on file
    pub fn lookup_factor(&self, service_type: &str) -> LedgerResult<Option<f64>> {
        Ok(lookup(&self.conn, service_type)?.map(|f| f.emission_factor))
    }

    pub fn get_factor(&self, service_type: &str) -> LedgerResult<EmissionFactor> {
        lookup(&self.conn, service_type)?
            .ok_or_else(|| LedgerError::not_found::<EmissionFactor>(service_type.trim()))
    }

    /// Factor a new package with this service type would receive
    pub fn resolve_factor(&self, service_type: Option<&str>) -> LedgerResult<EmissionFactor> {
        resolve(&self.conn, service_type)
    }

    /// Remove a factor; packages referencing it keep their emissions but lose the reference
    pub fn delete_factor(&mut self, service_type: &str) -> LedgerResult<DeleteOutcome> {
        let tx = self.write()?;
        let factor = lookup(&tx, service_type)?
            .ok_or_else(|| LedgerError::not_found::<EmissionFactor>(service_type.trim()))?;
        if factor.service_type.eq_ignore_ascii_case(OTHER) {
            return Err(LedgerError::validation(format!(
                "the '{}' emission factor cannot be deleted",
                OTHER
            )));
        }
        let outcome = policy::delete_with_policy::<EmissionFactor>(
            &tx,
            &factor.service_type,
            &factor.service_type,
        )?;
        tx.commit()?;
        tracing::info!(service_type = %factor.service_type, "deleted emission factor");
        Ok(outcome)
    }

    pub fn list_factors(&self) -> LedgerResult<Vec<EmissionFactor>> {
        let mut stmt = self.conn.prepare(
            "SELECT service_type, emission_factor FROM emission_factors ORDER BY service_type",
        )?;
        let rows = stmt.query_map([], from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
