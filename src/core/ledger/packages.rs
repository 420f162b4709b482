//! Package ledger
//!
//! Emissions are computed once, in the transaction that records the package,
//! from the factor resolved at that moment. Reads never recompute them.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, ToSql};

use super::error::{LedgerError, LedgerResult};
use super::policy::{self, DeleteOutcome};
use super::{carriers, factors, persons, Ledger};
use crate::core::emissions::{compute_emissions, EmissionsBreakdown};
use crate::core::identity::{CarrierId, PackageId, PersonId};
use crate::entities::package::MAX_TRACKING_LEN;
use crate::entities::{NewPackage, Package, PackageSearch};

/// Default number of rows returned by a search
const DEFAULT_SEARCH_LIMIT: usize = 20;

pub(crate) const COLUMNS: &str = "package_id, carrier_id, recipient_id, tracking_number, \
                                  service_type, date_shipped, total_emissions_kg, distance_traveled";

pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Package> {
    Ok(Package {
        package_id: row.get(0)?,
        carrier_id: row.get(1)?,
        recipient_id: row.get(2)?,
        tracking_number: row.get(3)?,
        service_type: row.get(4)?,
        date_shipped: row.get(5)?,
        total_emissions_kg: row.get(6)?,
        distance_traveled: row.get(7)?,
    })
}

/// One page of a listing, numbered from 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    pub fn new(number: usize, size: usize) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Row limit as bound in SQL
    fn limit(&self) -> i64 {
        i64::try_from(self.size).unwrap_or(i64::MAX)
    }

    /// Rows skipped before this page, saturating for absurd page numbers
    fn offset(&self) -> i64 {
        let offset = (self.number - 1).saturating_mul(self.size);
        i64::try_from(offset).unwrap_or(i64::MAX)
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::new(1, 20)
    }
}

/// `LIKE` pattern matching `term` anywhere, with `%`, `_` and `\` taken literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::from("%");
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Midnight at the start of `date`
pub(crate) fn start_of(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Midnight after `date`, for inclusive end-date filters
pub(crate) fn end_of(date: NaiveDate) -> NaiveDateTime {
    start_of(date.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX))
}

fn validate_tracking(tracking: &str) -> LedgerResult<String> {
    let tracking = tracking.trim();
    if tracking.is_empty() {
        return Err(LedgerError::validation("tracking number must not be empty"));
    }
    if tracking.chars().count() > MAX_TRACKING_LEN {
        return Err(LedgerError::validation(format!(
            "tracking number is longer than {} characters",
            MAX_TRACKING_LEN
        )));
    }
    Ok(tracking.to_string())
}

fn validate_distance(distance: f64) -> LedgerResult<f64> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(LedgerError::validation(format!(
            "distance traveled must be a non-negative number, got {}",
            distance
        )));
    }
    Ok(distance)
}

pub(crate) fn exists(conn: &Connection, id: PackageId) -> LedgerResult<bool> {
    Ok(conn
        .prepare_cached("SELECT 1 FROM packages WHERE package_id = ?1")?
        .exists(params![id])?)
}

pub(crate) fn fetch(conn: &Connection, id: PackageId) -> LedgerResult<Package> {
    conn.query_row(
        &format!("SELECT {} FROM packages WHERE package_id = ?1", COLUMNS),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found::<Package>(id))
}

/// Resolve a carrier reference; `None` means the "Other" carrier
fn resolve_carrier(conn: &Connection, carrier: Option<CarrierId>) -> LedgerResult<CarrierId> {
    match carrier {
        Some(id) => Ok(carriers::fetch(conn, id)?.carrier_id),
        None => carriers::sentinel_id(conn),
    }
}

pub(crate) fn insert(conn: &Connection, new: &NewPackage) -> LedgerResult<PackageId> {
    let tracking = validate_tracking(&new.tracking_number)?;
    let distance = validate_distance(new.distance_traveled)?;
    let carrier_id = resolve_carrier(conn, new.carrier_id)?;
    if let Some(recipient) = &new.recipient_id {
        persons::require(conn, recipient)?;
    }
    let factor = factors::resolve(conn, new.service_type.as_deref())?;
    let emissions = compute_emissions(distance, factor.emission_factor);

    conn.execute(
        "INSERT INTO packages (carrier_id, recipient_id, tracking_number, service_type, \
         date_shipped, total_emissions_kg, distance_traveled) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            carrier_id,
            new.recipient_id,
            tracking,
            factor.service_type,
            new.date_shipped,
            emissions,
            distance,
        ],
    )?;
    Ok(PackageId(conn.last_insert_rowid()))
}

impl Ledger {
    /// Record a package and snapshot its emissions
    pub fn create_package(&mut self, new: NewPackage) -> LedgerResult<PackageId> {
        let tx = self.write()?;
        let id = insert(&tx, &new)?;
        tx.commit()?;
        tracing::info!(package_id = %id, tracking = %new.tracking_number.trim(), "created package");
        Ok(id)
    }

    pub fn get_package(&self, id: PackageId) -> LedgerResult<Package> {
        fetch(&self.conn, id)
    }

    /// Packages with this exact tracking number (several carriers may reuse one)
    pub fn find_by_tracking(&self, tracking: &str) -> LedgerResult<Vec<Package>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM packages WHERE tracking_number = ?1 ORDER BY package_id",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![tracking.trim()], from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_packages(&self, page: Page) -> LedgerResult<Vec<Package>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM packages ORDER BY package_id LIMIT ?1 OFFSET ?2",
            COLUMNS
        ))?;
        let rows = stmt.query_map(params![page.limit(), page.offset()], from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Filtered search, most recently shipped first
    pub fn search_packages(&self, search: &PackageSearch) -> LedgerResult<Vec<Package>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn ToSql>> = Vec::new();

        let mut push = |condition: &str, value: Box<dyn ToSql>| {
            values.push(value);
            conditions.push(condition.replace('?', &format!("?{}", values.len())));
        };

        if let Some(tracking) = &search.tracking_number {
            push("pk.tracking_number LIKE ? ESCAPE '\\'", Box::new(contains_pattern(tracking)));
        }
        if let Some(min) = search.min_emissions {
            push("pk.total_emissions_kg >= ?", Box::new(min));
        }
        if let Some(max) = search.max_emissions {
            push("pk.total_emissions_kg <= ?", Box::new(max));
        }
        if let Some(carrier) = &search.carrier {
            push("c.carrier_name LIKE ? ESCAPE '\\'", Box::new(contains_pattern(carrier)));
        }
        if let Some(service) = &search.service_type {
            push("pk.service_type LIKE ? ESCAPE '\\'", Box::new(contains_pattern(service)));
        }
        if let Some(from) = search.shipped_from {
            push("pk.date_shipped >= ?", Box::new(start_of(from)));
        }
        if let Some(to) = search.shipped_to {
            push("pk.date_shipped < ?", Box::new(end_of(to)));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        let limit = search.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1);
        let columns = COLUMNS
            .split(',')
            .map(|c| format!("pk.{}", c.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT {} FROM packages pk LEFT JOIN carriers c ON c.carrier_id = pk.carrier_id \
             {} ORDER BY pk.date_shipped DESC, pk.package_id DESC LIMIT {}",
            columns, where_clause, limit
        );
        tracing::debug!(%sql, "package search");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Change or clear the recipient of a package
    pub fn set_recipient(
        &mut self,
        id: PackageId,
        recipient: Option<&PersonId>,
    ) -> LedgerResult<()> {
        let tx = self.write()?;
        if !exists(&tx, id)? {
            return Err(LedgerError::not_found::<Package>(id));
        }
        if let Some(recipient) = recipient {
            persons::require(&tx, recipient)?;
        }
        tx.execute(
            "UPDATE packages SET recipient_id = ?2 WHERE package_id = ?1",
            params![id, recipient],
        )?;
        tx.commit()?;
        tracing::info!(package_id = %id, "set recipient");
        Ok(())
    }

    /// Change the carrier of a package; `None` files it under "Other"
    pub fn set_carrier(&mut self, id: PackageId, carrier: Option<CarrierId>) -> LedgerResult<()> {
        let tx = self.write()?;
        if !exists(&tx, id)? {
            return Err(LedgerError::not_found::<Package>(id));
        }
        let carrier_id = resolve_carrier(&tx, carrier)?;
        tx.execute(
            "UPDATE packages SET carrier_id = ?2 WHERE package_id = ?1",
            params![id, carrier_id],
        )?;
        tx.commit()?;
        tracing::info!(package_id = %id, carrier_id = %carrier_id, "set carrier");
        Ok(())
    }

    /// Delete a package that has no transactions
    pub fn delete_package(&mut self, id: PackageId) -> LedgerResult<DeleteOutcome> {
        let tx = self.write()?;
        let outcome = policy::delete_with_policy::<Package>(&tx, &id, &id.to_string())?;
        tx.commit()?;
        tracing::info!(package_id = %id, "deleted package");
        Ok(outcome)
    }

    /// Stored emissions of a package next to what today's factor would give
    pub fn emissions_breakdown(&self, id: PackageId) -> LedgerResult<EmissionsBreakdown> {
        let package = fetch(&self.conn, id)?;
        let current_factor = match &package.service_type {
            Some(label) => factors::lookup(&self.conn, label)?.map(|f| f.emission_factor),
            None => None,
        };
        Ok(EmissionsBreakdown::new(
            package.service_type,
            package.distance_traveled,
            package.total_emissions_kg,
            current_factor,
        ))
    }
}
