//! Carrier registry

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{LedgerError, LedgerResult};
use super::policy::{self, DeleteOutcome};
use super::Ledger;
use crate::core::identity::CarrierId;
use crate::entities::carrier::MAX_NAME_LEN;
use crate::entities::{Carrier, OTHER};

const COLUMNS: &str = "carrier_id, carrier_name";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Carrier> {
    Ok(Carrier {
        carrier_id: row.get(0)?,
        carrier_name: row.get(1)?,
    })
}

fn validate_name(name: &str) -> LedgerResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("carrier name must not be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(LedgerError::validation(format!(
            "carrier name '{}' is longer than {} characters",
            name, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

pub(crate) fn fetch(conn: &Connection, id: CarrierId) -> LedgerResult<Carrier> {
    conn.query_row(
        &format!("SELECT {} FROM carriers WHERE carrier_id = ?1", COLUMNS),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found::<Carrier>(id))
}

pub(crate) fn by_name(conn: &Connection, name: &str) -> LedgerResult<Option<Carrier>> {
    Ok(conn
        .query_row(
            &format!("SELECT {} FROM carriers WHERE carrier_name = ?1", COLUMNS),
            params![name.trim()],
            from_row,
        )
        .optional()?)
}

pub(crate) fn insert(conn: &Connection, name: &str) -> LedgerResult<CarrierId> {
    let name = validate_name(name)?;
    if let Some(existing) = by_name(conn, &name)? {
        return Err(LedgerError::validation(format!(
            "carrier '{}' already exists (id {})",
            existing.carrier_name, existing.carrier_id
        )));
    }
    conn.execute(
        "INSERT INTO carriers (carrier_name) VALUES (?1)",
        params![name],
    )?;
    Ok(CarrierId(conn.last_insert_rowid()))
}

/// ID of the seeded "Other" carrier
pub(crate) fn sentinel_id(conn: &Connection) -> LedgerResult<CarrierId> {
    by_name(conn, OTHER)?
        .map(|c| c.carrier_id)
        .ok_or_else(|| LedgerError::not_found::<Carrier>(OTHER))
}

impl Ledger {
    /// Register a carrier
    pub fn create_carrier(&mut self, name: &str) -> LedgerResult<CarrierId> {
        let tx = self.write()?;
        let id = insert(&tx, name)?;
        tx.commit()?;
        tracing::info!(carrier_id = %id, name = name.trim(), "created carrier");
        Ok(id)
    }

    /// Rename a carrier; the "Other" sentinel keeps its name
    pub fn rename_carrier(&mut self, id: CarrierId, name: &str) -> LedgerResult<()> {
        let tx = self.write()?;
        let carrier = fetch(&tx, id)?;
        if carrier.is_sentinel() {
            return Err(LedgerError::validation(format!(
                "the '{}' carrier cannot be renamed",
                OTHER
            )));
        }
        let name = validate_name(name)?;
        if let Some(existing) = by_name(&tx, &name)? {
            if existing.carrier_id != id {
                return Err(LedgerError::validation(format!(
                    "carrier '{}' already exists (id {})",
                    existing.carrier_name, existing.carrier_id
                )));
            }
        }
        tx.execute(
            "UPDATE carriers SET carrier_name = ?1 WHERE carrier_id = ?2",
            params![name, id],
        )?;
        tx.commit()?;
        tracing::info!(carrier_id = %id, from = %carrier.carrier_name, to = %name, "renamed carrier");
        Ok(())
    }

    /// Delete a carrier no package references
    pub fn delete_carrier(&mut self, id: CarrierId) -> LedgerResult<DeleteOutcome> {
        let tx = self.write()?;
        let carrier = fetch(&tx, id)?;
        if carrier.is_sentinel() {
            return Err(LedgerError::validation(format!(
                "the '{}' carrier cannot be deleted",
                OTHER
            )));
        }
        let outcome = policy::delete_with_policy::<Carrier>(&tx, &id, &id.to_string())?;
        tx.commit()?;
        tracing::info!(carrier_id = %id, name = %carrier.carrier_name, "deleted carrier");
        Ok(outcome)
    }

    pub fn get_carrier(&self, id: CarrierId) -> LedgerResult<Carrier> {
        fetch(&self.conn, id)
    }

    /// Case-insensitive lookup by name
    pub fn find_carrier_by_name(&self, name: &str) -> LedgerResult<Option<Carrier>> {
        by_name(&self.conn, name)
    }

    /// The "Other" carrier used for packages with an unknown carrier
    pub fn other_carrier(&self) -> LedgerResult<Carrier> {
        let id = sentinel_id(&self.conn)?;
        fetch(&self.conn, id)
    }

    pub fn list_carriers(&self) -> LedgerResult<Vec<Carrier>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM carriers ORDER BY carrier_id",
            COLUMNS
        ))?;
        let rows = stmt.query_map([], from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
