//! Emissions aggregations, leaderboards and timelines
//!
//! Everything here is a pure read over stored snapshots; nothing is persisted.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use rusqlite::{params, params_from_iter, types::Value};
use serde::Serialize;

use super::error::{LedgerError, LedgerResult};
use super::packages::{end_of, start_of};
use super::{persons, Ledger};
use crate::core::identity::PersonId;
use crate::entities::person::display_name;
use crate::entities::PackageStatus;

/// Packages currently in one status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: PackageStatus,
    pub packages: usize,
}

/// A student's place on the leaderboard
///
/// A student affiliated with several departments appears once per department.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentStanding {
    pub rank: usize,
    pub person_id: PersonId,
    pub name: String,
    pub department: Option<String>,
    pub emissions_kg: f64,
}

/// A department's place on the leaderboard; `None` collects unaffiliated students
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MajorStanding {
    pub rank: usize,
    pub department: Option<String>,
    pub emissions_kg: f64,
}

/// Optional inclusive bounds on ship dates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> LedgerResult<Self> {
        if let (Some(start), Some(end)) = (start, end) {
            check_order(start, end)?;
        }
        Ok(Self { start, end })
    }
}

fn check_order(start: NaiveDate, end: NaiveDate) -> LedgerResult<()> {
    if end < start {
        return Err(LedgerError::validation(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }
    Ok(())
}

/// Bucket size of a timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    /// Weeks start on Monday
    Week,
    #[default]
    Month,
    Year,
}

impl Interval {
    /// First day of the bucket containing `date`
    pub fn truncate(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Interval::Day => date,
            Interval::Week => date
                .checked_sub_days(Days::new(date.weekday().num_days_from_monday() as u64))
                .unwrap_or(date),
            Interval::Month => date.with_day(1).unwrap_or(date),
            Interval::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Interval::Day => write!(f, "day"),
            Interval::Week => write!(f, "week"),
            Interval::Month => write!(f, "month"),
            Interval::Year => write!(f, "year"),
        }
    }
}

impl std::str::FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "daily" => Ok(Interval::Day),
            "week" | "weekly" => Ok(Interval::Week),
            "month" | "monthly" => Ok(Interval::Month),
            "year" | "yearly" => Ok(Interval::Year),
            _ => Err(format!(
                "Unknown interval: '{}'. Use day/week/month/year",
                s
            )),
        }
    }
}

/// Whose packages a timeline covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineScope {
    /// Every shipped package, optionally only those addressed to students
    All { students_only: bool },
    /// Packages addressed to one person
    Person(PersonId),
    /// Packages addressed to students of one department
    Department(String),
}

/// One bucket of a timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub period: NaiveDate,
    pub package_count: usize,
    pub unique_recipients: usize,
    pub total_emissions_kg: f64,
    pub avg_emissions_kg: f64,
    pub total_distance: f64,
}

#[derive(Default)]
struct Bucket {
    packages: usize,
    recipients: BTreeSet<String>,
    emissions: f64,
    distance: f64,
}


impl Ledger {
    /// Total emissions of packages addressed to a person
    pub fn total_emissions_by_person(&self, id: &PersonId) -> LedgerResult<f64> {
        persons::require(&self.conn, id)?;
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(total_emissions_kg), 0.0) FROM packages WHERE recipient_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        tracing::debug!(person_id = %id, total, "emissions by person");
        Ok(total)
    }

    /// Total emissions of packages addressed to members of a department
    pub fn total_emissions_by_department(&self, department: &str) -> LedgerResult<f64> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(pk.total_emissions_kg), 0.0) \
             FROM packages pk JOIN departments d ON d.person_id = pk.recipient_id \
             WHERE d.department_name = ?1",
            params![department.trim()],
            |row| row.get(0),
        )?;
        tracing::debug!(department = department.trim(), total, "emissions by department");
        Ok(total)
    }

    /// Total emissions of packages shipped between two dates, both inclusive
    pub fn total_emissions_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LedgerResult<f64> {
        check_order(start, end)?;
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(total_emissions_kg), 0.0) FROM packages \
             WHERE date_shipped >= ?1 AND date_shipped < ?2",
            params![start_of(start), end_of(end)],
            |row| row.get(0),
        )?;
        tracing::debug!(%start, %end, total, "emissions by date range");
        Ok(total)
    }

    /// Students ranked by emissions, highest first, optionally for one department
    pub fn student_leaderboard(&self, department: Option<&str>) -> LedgerResult<Vec<StudentStanding>> {
        let filter = if department.is_some() {
            "AND d.department_name = ?1"
        } else {
            ""
        };
        let sql = format!(
            "SELECT p.wpi_id, p.first_name, p.last_name, d.department_name, \
                    COALESCE(SUM(pk.total_emissions_kg), 0.0) AS total \
             FROM persons p \
             LEFT JOIN departments d ON d.person_id = p.wpi_id \
             LEFT JOIN packages pk ON pk.recipient_id = p.wpi_id \
             WHERE p.is_student = 1 {} \
             GROUP BY p.wpi_id, d.department_name \
             ORDER BY total DESC, p.wpi_id",
            filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let args: Vec<String> = department.map(|d| d.trim().to_string()).into_iter().collect();
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            let id: PersonId = row.get(0)?;
            let first: Option<String> = row.get(1)?;
            let last: Option<String> = row.get(2)?;
            let name = display_name(&id, first.as_deref(), last.as_deref());
            Ok((id, name, row.get::<_, Option<String>>(3)?, row.get::<_, f64>(4)?))
        })?;

        let mut standings = Vec::new();
        for (index, row) in rows.enumerate() {
            let (person_id, name, department, emissions_kg) = row?;
            standings.push(StudentStanding {
                rank: index + 1,
                person_id,
                name,
                department,
                emissions_kg,
            });
        }
        Ok(standings)
    }

    /// Departments ranked by the emissions of their students
    pub fn major_leaderboard(&self) -> LedgerResult<Vec<MajorStanding>> {
        let mut stmt = self.conn.prepare(
            "SELECT d.department_name, COALESCE(SUM(pk.total_emissions_kg), 0.0) AS total \
             FROM persons p \
             LEFT JOIN departments d ON d.person_id = p.wpi_id \
             LEFT JOIN packages pk ON pk.recipient_id = p.wpi_id \
             WHERE p.is_student = 1 \
             GROUP BY d.department_name \
             ORDER BY total DESC, d.department_name",
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut standings = Vec::new();
        for (index, row) in rows.enumerate() {
            let (department, emissions_kg) = row?;
            standings.push(MajorStanding {
                rank: index + 1,
                department,
                emissions_kg,
            });
        }
        Ok(standings)
    }

    /// Emissions of shipped packages bucketed by ship date
    ///
    /// Packages without a ship date are left out. Empty buckets are not
    /// emitted; an unknown person or department yields an empty timeline.
    pub fn timeline(
        &self,
        scope: &TimelineScope,
        interval: Interval,
        range: DateRange,
    ) -> LedgerResult<Vec<TimelinePoint>> {
        let mut joins = String::new();
        let mut conditions = vec!["pk.date_shipped IS NOT NULL".to_string()];
        let mut values: Vec<Value> = Vec::new();

        match scope {
            TimelineScope::All { students_only } => {
                if *students_only {
                    joins.push_str(" JOIN persons p ON p.wpi_id = pk.recipient_id");
                    conditions.push("p.is_student = 1".to_string());
                }
            }
            TimelineScope::Person(id) => {
                values.push(Value::Text(id.to_string()));
                conditions.push(format!("pk.recipient_id = ?{}", values.len()));
            }
            TimelineScope::Department(name) => {
                joins.push_str(
                    " JOIN persons p ON p.wpi_id = pk.recipient_id \
                      JOIN departments d ON d.person_id = p.wpi_id",
                );
                conditions.push("p.is_student = 1".to_string());
                values.push(Value::Text(name.trim().to_string()));
                conditions.push(format!("d.department_name = ?{}", values.len()));
            }
        }
        if let Some(start) = range.start {
            values.push(Value::Text(start_of(start).format("%F %T").to_string()));
            conditions.push(format!("pk.date_shipped >= ?{}", values.len()));
        }
        if let Some(end) = range.end {
            values.push(Value::Text(end_of(end).format("%F %T").to_string()));
            conditions.push(format!("pk.date_shipped < ?{}", values.len()));
        }

        let sql = format!(
            "SELECT pk.date_shipped, pk.recipient_id, pk.total_emissions_kg, pk.distance_traveled \
             FROM packages pk{} WHERE {}",
            joins,
            conditions.join(" AND ")
        );
        tracing::debug!(%sql, %interval, "timeline");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| {
            Ok((
                row.get::<_, NaiveDateTime>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
        for row in rows {
            let (shipped, recipient, emissions, distance) = row?;
            let bucket = buckets.entry(interval.truncate(shipped.date())).or_default();
            bucket.packages += 1;
            bucket.emissions += emissions;
            bucket.distance += distance;
            if let Some(recipient) = recipient {
                bucket.recipients.insert(recipient);
            }
        }

        Ok(buckets
            .into_iter()
            .map(|(period, bucket)| TimelinePoint {
                period,
                package_count: bucket.packages,
                unique_recipients: bucket.recipients.len(),
                total_emissions_kg: bucket.emissions,
                avg_emissions_kg: bucket.emissions / bucket.packages as f64,
                total_distance: bucket.distance,
            })
            .collect())
    }
}
