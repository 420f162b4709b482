//! Lifecycle event log

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{LedgerError, LedgerResult};
use super::policy::{self, DeleteOutcome};
use super::reports::StatusCount;
use super::{packages, persons, Ledger};
use crate::core::identity::{PackageId, TransactionId};
use crate::entities::transaction::{current_status, MAX_LABEL_LEN};
use crate::entities::{NewTransaction, Package, PackageStatus, Transaction, TransactionType};

const COLUMNS: &str =
    "transaction_id, date, transaction_type, locker, location, package_id, worker_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        transaction_id: row.get(0)?,
        date: row.get(1)?,
        transaction_type: row.get(2)?,
        locker: row.get(3)?,
        location: row.get(4)?,
        package_id: row.get(5)?,
        worker_id: row.get(6)?,
    })
}

fn label(field: &str, value: Option<&str>) -> LedgerResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > MAX_LABEL_LEN {
        return Err(LedgerError::validation(format!(
            "{} '{}' is longer than {} characters",
            field, value, MAX_LABEL_LEN
        )));
    }
    Ok(Some(value.to_string()))
}

pub(crate) fn insert(conn: &Connection, new: &NewTransaction) -> LedgerResult<TransactionId> {
    if !packages::exists(conn, new.package_id)? {
        return Err(LedgerError::not_found::<Package>(new.package_id));
    }
    if let Some(worker) = &new.worker_id {
        persons::require(conn, worker)?;
    }
    let locker = label("locker", new.locker.as_deref())?;
    let location = label("location", new.location.as_deref())?;

    conn.execute(
        "INSERT INTO transactions (date, transaction_type, locker, location, package_id, worker_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            new.date,
            new.transaction_type,
            locker,
            location,
            new.package_id,
            new.worker_id,
        ],
    )?;
    Ok(TransactionId(conn.last_insert_rowid()))
}

fn history(conn: &Connection, package: PackageId) -> LedgerResult<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(&format!(
        "SELECT {} FROM transactions WHERE package_id = ?1 ORDER BY date, transaction_id",
        COLUMNS
    ))?;
    let rows = stmt.query_map(params![package], from_row)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl Ledger {
    /// Append a lifecycle event
    ///
    /// Any sequence of event types is accepted, including events dated before
    /// ones already on file.
    pub fn append_transaction(&mut self, new: NewTransaction) -> LedgerResult<TransactionId> {
        let tx = self.write()?;
        let id = insert(&tx, &new)?;
        tx.commit()?;
        tracing::info!(
            transaction_id = %id,
            package_id = %new.package_id,
            kind = %new.transaction_type,
            "appended transaction"
        );
        Ok(id)
    }

    /// Events of a package in chronological order
    pub fn transactions_for(&self, package: PackageId) -> LedgerResult<Vec<Transaction>> {
        if !packages::exists(&self.conn, package)? {
            return Err(LedgerError::not_found::<Package>(package));
        }
        history(&self.conn, package)
    }

    pub fn get_transaction(&self, id: TransactionId) -> LedgerResult<Transaction> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM transactions WHERE transaction_id = ?1", COLUMNS),
                params![id],
                from_row,
            )
            .optional()?
            .ok_or_else(|| LedgerError::not_found::<Transaction>(id))
    }

    /// Current status of a package, `Unprocessed` when it has no events
    pub fn package_status(&self, package: PackageId) -> LedgerResult<PackageStatus> {
        Ok(current_status(&self.transactions_for(package)?))
    }

    /// Number of packages in each status, every status listed
    pub fn status_summary(&self) -> LedgerResult<Vec<StatusCount>> {
        let mut stmt = self.conn.prepare(
            "SELECT (SELECT t.transaction_type FROM transactions t \
                     WHERE t.package_id = p.package_id \
                     ORDER BY t.date DESC, t.transaction_id DESC LIMIT 1) AS status, \
                    COUNT(*) \
             FROM packages p GROUP BY status",
        )?;
        let rows = stmt.query_map([], |row| {
            let kind: Option<TransactionType> = row.get(0)?;
            let count: usize = row.get(1)?;
            Ok((kind.map(PackageStatus::from).unwrap_or_default(), count))
        })?;
        let counted = rows.collect::<Result<Vec<_>, _>>()?;

        Ok(PackageStatus::ALL
            .iter()
            .map(|status| StatusCount {
                status: *status,
                packages: counted
                    .iter()
                    .filter(|(s, _)| s == status)
                    .map(|(_, n)| n)
                    .sum(),
            })
            .collect())
    }

    /// Remove one event, for correcting data-entry mistakes
    pub fn delete_transaction(&mut self, id: TransactionId) -> LedgerResult<DeleteOutcome> {
        let tx = self.write()?;
        let outcome = policy::delete_with_policy::<Transaction>(&tx, &id, &id.to_string())?;
        tx.commit()?;
        tracing::info!(transaction_id = %id, "deleted transaction");
        Ok(outcome)
    }
}
