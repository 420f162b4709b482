//! Cascade policy table and the delete routine that applies it
//!
//! Every foreign key in the schema has exactly one row here. Deletes go
//! through [`delete_with_policy`], which checks restrict rows first, then
//! cascades and nullifies dependents, then removes the parent, all on the
//! caller's open transaction.

use rusqlite::{params, Connection, ToSql};
use serde::Serialize;

use super::error::{LedgerError, LedgerResult};
use crate::core::entity::Entity;

/// What happens to dependent rows when their parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Dependent rows are deleted with the parent
    Cascade,
    /// The referencing column is set to NULL
    SetNull,
    /// The delete fails while dependents exist
    Restrict,
}

impl OnDelete {
    /// Spelling used by SQLite in `PRAGMA foreign_key_list`
    pub fn sql(&self) -> &'static str {
        match self {
            OnDelete::Cascade => "CASCADE",
            OnDelete::SetNull => "SET NULL",
            OnDelete::Restrict => "RESTRICT",
        }
    }
}

/// One foreign key and its delete policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForeignKey {
    pub child_table: &'static str,
    pub child_column: &'static str,
    pub parent_table: &'static str,
    pub parent_column: &'static str,
    pub on_delete: OnDelete,
}

const fn fk(
    child_table: &'static str,
    child_column: &'static str,
    parent_table: &'static str,
    parent_column: &'static str,
    on_delete: OnDelete,
) -> ForeignKey {
    ForeignKey {
        child_table,
        child_column,
        parent_table,
        parent_column,
        on_delete,
    }
}

/// All foreign keys of the ledger schema
pub const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("departments", "person_id", "persons", "wpi_id", OnDelete::Cascade),
    fk("persons", "supervisor_id", "persons", "wpi_id", OnDelete::SetNull),
    fk("packages", "carrier_id", "carriers", "carrier_id", OnDelete::Restrict),
    fk("packages", "recipient_id", "persons", "wpi_id", OnDelete::SetNull),
    fk("packages", "service_type", "emission_factors", "service_type", OnDelete::SetNull),
    fk("transactions", "package_id", "packages", "package_id", OnDelete::Restrict),
    fk("transactions", "worker_id", "persons", "wpi_id", OnDelete::SetNull),
];

/// Foreign keys pointing at `parent_table`
pub fn referencing(parent_table: &str) -> impl Iterator<Item = &'static ForeignKey> + '_ {
    FOREIGN_KEYS
        .iter()
        .filter(move |fk| fk.parent_table == parent_table)
}

/// Rows touched by one foreign key during a delete
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyEffect {
    pub relation: String,
    pub on_delete: OnDelete,
    pub rows: usize,
}

/// Summary of a completed delete
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub effects: Vec<PolicyEffect>,
}

impl DeleteOutcome {
    /// Rows affected under a given policy across all relations
    pub fn rows(&self, on_delete: OnDelete) -> usize {
        self.effects
            .iter()
            .filter(|e| e.on_delete == on_delete)
            .map(|e| e.rows)
            .sum()
    }

    /// Rows affected for one `table.column` relation
    pub fn rows_for(&self, relation: &str) -> usize {
        self.effects
            .iter()
            .filter(|e| e.relation == relation)
            .map(|e| e.rows)
            .sum()
    }
}

/// Delete one row of entity `E`, applying the policy of every referencing key
///
/// `key` must be the stored value of the primary key so that nullify and
/// cascade statements match dependents exactly.
pub(crate) fn delete_with_policy<E: Entity>(
    conn: &Connection,
    key: &dyn ToSql,
    key_display: &str,
) -> LedgerResult<DeleteOutcome> {
    let exists = conn
        .prepare_cached(&format!(
            "SELECT 1 FROM {} WHERE {} = ?1",
            E::TABLE,
            E::KEY_COLUMN
        ))?
        .exists(params![key])?;
    if !exists {
        return Err(LedgerError::not_found::<E>(key_display));
    }

    let keys: Vec<&ForeignKey> = referencing(E::TABLE).collect();

    for fk in keys.iter().filter(|fk| fk.on_delete == OnDelete::Restrict) {
        let count: usize = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE {} = ?1",
                fk.child_table, fk.child_column
            ),
            params![key],
            |row| row.get(0),
        )?;
        if count > 0 {
            return Err(LedgerError::ReferentialIntegrity {
                entity: E::KIND,
                id: key_display.to_string(),
                dependent: fk.child_table,
                count,
            });
        }
    }

    let mut outcome = DeleteOutcome::default();
    for fk in keys.iter().filter(|fk| fk.on_delete != OnDelete::Restrict) {
        let sql = match fk.on_delete {
            OnDelete::Cascade => format!(
                "DELETE FROM {} WHERE {} = ?1",
                fk.child_table, fk.child_column
            ),
            OnDelete::SetNull => format!(
                "UPDATE {} SET {col} = NULL WHERE {col} = ?1",
                fk.child_table,
                col = fk.child_column
            ),
            OnDelete::Restrict => unreachable!("restrict keys were checked above"),
        };
        let rows = conn.execute(&sql, params![key])?;
        if rows > 0 {
            outcome.effects.push(PolicyEffect {
                relation: format!("{}.{}", fk.child_table, fk.child_column),
                on_delete: fk.on_delete,
                rows,
            });
        }
    }

    conn.execute(
        &format!("DELETE FROM {} WHERE {} = ?1", E::TABLE, E::KEY_COLUMN),
        params![key],
    )?;

    tracing::debug!(
        entity = E::KIND,
        id = key_display,
        cascaded = outcome.rows(OnDelete::Cascade),
        nullified = outcome.rows(OnDelete::SetNull),
        "applied delete policy"
    );

    Ok(outcome)
}
