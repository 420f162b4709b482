//! Bulk import of mailroom CSV reports
//!
//! One row describes a package and up to three lifecycle events. The whole
//! file is applied in a single write transaction; the first bad row aborts
//! the import and nothing is kept.

use std::collections::HashMap;
use std::io;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::error::{LedgerError, LedgerResult};
use super::{carriers, packages, persons, transactions, Ledger};
use crate::core::dates::parse_timestamp;
use crate::core::identity::{CarrierId, PersonId};
use crate::entities::{NewPackage, NewPerson, NewTransaction, TransactionType};

/// Counts of what an import created
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub rows: usize,
    pub packages: usize,
    pub transactions: usize,
    pub carriers_created: usize,
    pub persons_created: usize,
}

/// One row of a mailroom report
#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "Item", default)]
    carrier: Option<String>,
    #[serde(rename = "Tracking Number", default)]
    tracking_number: Option<String>,
    #[serde(rename = "Service Type", default)]
    service_type: Option<String>,
    #[serde(rename = "Date Shipped", default)]
    date_shipped: Option<String>,
    #[serde(rename = "Distance", default)]
    distance: Option<f64>,

    #[serde(rename = "Delivered To", default)]
    delivered_to: Option<String>,
    #[serde(rename = "Routed To", default)]
    routed_to: Option<String>,
    #[serde(rename = "Stored To", default)]
    stored_to: Option<String>,

    #[serde(rename = "Date Stored", default)]
    date_stored: Option<String>,
    #[serde(rename = "Stored By", default)]
    stored_by: Option<String>,
    #[serde(rename = "stored Location1", default)]
    stored_location: Option<String>,
    #[serde(rename = "Locker Bank Name", default)]
    locker_bank: Option<String>,
    #[serde(rename = "Locker Number", default)]
    locker_number: Option<String>,

    #[serde(rename = "Date Routed", default)]
    date_routed: Option<String>,
    #[serde(rename = "Routed By", default)]
    routed_by: Option<String>,
    #[serde(rename = "Routed Location1", default)]
    routed_location: Option<String>,

    #[serde(rename = "Date Delivered", default)]
    date_delivered: Option<String>,
    #[serde(rename = "Delivered By", default)]
    delivered_by: Option<String>,
    #[serde(rename = "Delivered Location1", default)]
    delivered_location: Option<String>,
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ReportRow {
    fn recipient(&self) -> Option<&str> {
        present(&self.delivered_to)
            .or_else(|| present(&self.routed_to))
            .or_else(|| present(&self.stored_to))
    }

    /// "Bank Number" label of the locker, if either part is given
    fn locker(&self) -> Option<String> {
        let parts: Vec<&str> = [present(&self.locker_bank), present(&self.locker_number)]
            .into_iter()
            .flatten()
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Caches of rows created or looked up during one import
struct Importer<'a> {
    conn: &'a Connection,
    carriers: HashMap<String, CarrierId>,
    summary: ImportSummary,
}

impl<'a> Importer<'a> {
    fn new(conn: &'a Connection) -> Self {
        Self {
            conn,
            carriers: HashMap::new(),
            summary: ImportSummary::default(),
        }
    }

    fn carrier(&mut self, name: Option<&str>) -> LedgerResult<Option<CarrierId>> {
        let Some(name) = name else {
            return Ok(None);
        };
        let key = name.to_lowercase();
        if let Some(id) = self.carriers.get(&key) {
            return Ok(Some(*id));
        }
        let id = match carriers::by_name(self.conn, name)? {
            Some(existing) => existing.carrier_id,
            None => {
                self.summary.carriers_created += 1;
                carriers::insert(self.conn, name)?
            }
        };
        self.carriers.insert(key, id);
        Ok(Some(id))
    }

    /// Resolve a person column, creating a placeholder for unknown IDs
    fn person(&mut self, value: Option<&str>, worker: bool) -> LedgerResult<Option<PersonId>> {
        let Some(value) = value else {
            return Ok(None);
        };
        let id = PersonId::parse(value)?;
        if !persons::exists(self.conn, &id)? {
            let placeholder = NewPerson {
                is_mailroom_worker: worker,
                ..NewPerson::default()
            };
            persons::insert(self.conn, &id, &placeholder)?;
            self.summary.persons_created += 1;
            tracing::debug!(person_id = %id, worker, "created placeholder person");
        } else if worker {
            let flagged = self.conn.execute(
                "UPDATE persons SET is_mailroom_worker = 1 \
                 WHERE wpi_id = ?1 AND is_mailroom_worker = 0",
                params![id],
            )?;
            if flagged > 0 {
                tracing::debug!(person_id = %id, "flagged person as mailroom worker");
            }
        }
        Ok(Some(id))
    }

    fn timestamp(value: Option<&str>) -> LedgerResult<Option<NaiveDateTime>> {
        value
            .map(|v| parse_timestamp(v).map_err(LedgerError::Validation))
            .transpose()
    }

    fn row(&mut self, row: &ReportRow) -> LedgerResult<()> {
        let tracking = present(&row.tracking_number)
            .ok_or_else(|| LedgerError::validation("missing 'Tracking Number'"))?;
        let carrier_id = self.carrier(present(&row.carrier))?;
        let recipient_id = self.person(row.recipient(), false)?;

        let package_id = packages::insert(
            self.conn,
            &NewPackage {
                carrier_id,
                recipient_id,
                tracking_number: tracking.to_string(),
                service_type: present(&row.service_type).map(str::to_string),
                date_shipped: Self::timestamp(present(&row.date_shipped))?,
                distance_traveled: row.distance.unwrap_or(0.0),
            },
        )?;
        self.summary.packages += 1;

        let events = [
            (
                TransactionType::Stored,
                &row.date_stored,
                &row.stored_by,
                &row.stored_location,
                row.locker(),
            ),
            (
                TransactionType::Routed,
                &row.date_routed,
                &row.routed_by,
                &row.routed_location,
                None,
            ),
            (
                TransactionType::Delivered,
                &row.date_delivered,
                &row.delivered_by,
                &row.delivered_location,
                row.locker(),
            ),
        ];
        for (kind, date, worker, location, locker) in events {
            let Some(date) = Self::timestamp(present(date))? else {
                continue;
            };
            let worker_id = self.person(present(worker), true)?;
            transactions::insert(
                self.conn,
                &NewTransaction {
                    package_id,
                    transaction_type: kind,
                    date,
                    locker,
                    location: present(location).map(str::to_string),
                    worker_id,
                },
            )?;
            self.summary.transactions += 1;
        }
        Ok(())
    }
}

impl Ledger {
    /// Import a mailroom CSV report atomically
    ///
    /// Carriers are created on first sight. Unknown person IDs become
    /// placeholder persons; those in "By" columns are flagged as mailroom
    /// workers. Errors carry the 1-based file line of the failing row.
    pub fn import_report<R: io::Read>(&mut self, reader: R) -> LedgerResult<ImportSummary> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let tx = self.write()?;
        let mut importer = Importer::new(&tx);
        for (index, record) in csv_reader.deserialize::<ReportRow>().enumerate() {
            let line = index + 2;
            let wrap = |source: LedgerError| LedgerError::Import {
                line,
                source: Box::new(source),
            };
            let row = record.map_err(|e| wrap(e.into()))?;
            importer.row(&row).map_err(wrap)?;
            importer.summary.rows += 1;
        }
        let summary = importer.summary;
        tx.commit()?;

        tracing::info!(
            rows = summary.rows,
            packages = summary.packages,
            transactions = summary.transactions,
            carriers_created = summary.carriers_created,
            persons_created = summary.persons_created,
            "imported report"
        );
        Ok(summary)
    }
}
