//! Person directory and department affiliations

use rusqlite::{params, Connection, OptionalExtension, Row};

use super::error::{LedgerError, LedgerResult};
use super::policy::{self, DeleteOutcome};
use super::Ledger;
use crate::core::identity::PersonId;
use crate::entities::person::{MAX_BOX_LEN, MAX_DEPARTMENT_LEN, MAX_NAME_LEN};
use crate::entities::{NewPerson, Person, PersonFilter};

const COLUMNS: &str = "wpi_id, first_name, last_name, is_student, is_mailroom_worker, \
                       box_number, class_year, supervisor_id";

fn from_row(row: &Row<'_>) -> rusqlite::Result<Person> {
    Ok(Person {
        wpi_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        is_student: row.get(3)?,
        is_mailroom_worker: row.get(4)?,
        box_number: row.get(5)?,
        class_year: row.get(6)?,
        supervisor_id: row.get(7)?,
    })
}

/// Trim an optional text field, treating blank as absent, and enforce a length limit
fn optional_text(field: &str, value: Option<&str>, max: usize) -> LedgerResult<Option<String>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > max {
        return Err(LedgerError::validation(format!(
            "{} '{}' is longer than {} characters",
            field, value, max
        )));
    }
    Ok(Some(value.to_string()))
}

fn validate_department(name: &str) -> LedgerResult<String> {
    optional_text("department name", Some(name), MAX_DEPARTMENT_LEN)?
        .ok_or_else(|| LedgerError::validation("department name must not be empty"))
}

pub(crate) fn exists(conn: &Connection, id: &PersonId) -> LedgerResult<bool> {
    Ok(conn
        .prepare_cached("SELECT 1 FROM persons WHERE wpi_id = ?1")?
        .exists(params![id])?)
}

pub(crate) fn require(conn: &Connection, id: &PersonId) -> LedgerResult<()> {
    if exists(conn, id)? {
        Ok(())
    } else {
        Err(LedgerError::not_found::<Person>(id))
    }
}

pub(crate) fn fetch(conn: &Connection, id: &PersonId) -> LedgerResult<Person> {
    conn.query_row(
        &format!("SELECT {} FROM persons WHERE wpi_id = ?1", COLUMNS),
        params![id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| LedgerError::not_found::<Person>(id))
}

pub(crate) fn insert(conn: &Connection, id: &PersonId, attrs: &NewPerson) -> LedgerResult<()> {
    if exists(conn, id)? {
        return Err(LedgerError::validation(format!("person '{}' already exists", id)));
    }
    let first_name = optional_text("first name", attrs.first_name.as_deref(), MAX_NAME_LEN)?;
    let last_name = optional_text("last name", attrs.last_name.as_deref(), MAX_NAME_LEN)?;
    let box_number = optional_text("box number", attrs.box_number.as_deref(), MAX_BOX_LEN)?;
    if let Some(year) = attrs.class_year {
        if year < 1 {
            return Err(LedgerError::validation(format!(
                "class year must be positive, got {}",
                year
            )));
        }
    }
    if let Some(supervisor) = &attrs.supervisor_id {
        if supervisor != id {
            require(conn, supervisor)?;
        }
    }

    conn.execute(
        &format!(
            "INSERT INTO persons ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            COLUMNS
        ),
        params![
            id,
            first_name,
            last_name,
            attrs.is_student,
            attrs.is_mailroom_worker,
            box_number,
            attrs.class_year,
            attrs.supervisor_id,
        ],
    )?;
    Ok(())
}

fn query_persons(conn: &Connection, where_clause: &str, param: Option<&PersonId>) -> LedgerResult<Vec<Person>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM persons {} ORDER BY wpi_id",
        COLUMNS, where_clause
    ))?;
    let rows = match param {
        Some(id) => stmt.query_map(params![id], from_row)?,
        None => stmt.query_map([], from_row)?,
    };
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

impl Ledger {
    /// Add a person to the directory
    pub fn create_person(&mut self, id: &PersonId, attrs: NewPerson) -> LedgerResult<()> {
        let tx = self.write()?;
        insert(&tx, id, &attrs)?;
        tx.commit()?;
        tracing::info!(person_id = %id, student = attrs.is_student, worker = attrs.is_mailroom_worker, "created person");
        Ok(())
    }

    pub fn get_person(&self, id: &PersonId) -> LedgerResult<Person> {
        fetch(&self.conn, id)
    }

    pub fn list_persons(&self, filter: PersonFilter) -> LedgerResult<Vec<Person>> {
        let mut conditions = Vec::new();
        if filter.students_only {
            conditions.push("is_student = 1");
        }
        if filter.workers_only {
            conditions.push("is_mailroom_worker = 1");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        query_persons(&self.conn, &where_clause, None)
    }

    /// Set or clear a person's supervisor
    ///
    /// Supervision is advisory; cycles are not checked.
    pub fn set_supervisor(
        &mut self,
        id: &PersonId,
        supervisor: Option<&PersonId>,
    ) -> LedgerResult<()> {
        let tx = self.write()?;
        require(&tx, id)?;
        if let Some(supervisor) = supervisor {
            require(&tx, supervisor)?;
        }
        tx.execute(
            "UPDATE persons SET supervisor_id = ?2 WHERE wpi_id = ?1",
            params![id, supervisor],
        )?;
        tx.commit()?;
        tracing::info!(
            person_id = %id,
            supervisor = supervisor.map(|s| s.to_string()).unwrap_or_default(),
            "set supervisor"
        );
        Ok(())
    }

    /// Persons whose supervisor is `id`
    pub fn direct_reports(&self, id: &PersonId) -> LedgerResult<Vec<Person>> {
        require(&self.conn, id)?;
        query_persons(&self.conn, "WHERE supervisor_id = ?1", Some(id))
    }

    /// Affiliate a person with a department or major
    pub fn add_department(&mut self, id: &PersonId, name: &str) -> LedgerResult<()> {
        let name = validate_department(name)?;
        let tx = self.write()?;
        require(&tx, id)?;
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO departments (person_id, department_name) VALUES (?1, ?2)",
            params![id, name],
        )?;
        if inserted == 0 {
            return Err(LedgerError::validation(format!(
                "person '{}' is already affiliated with '{}'",
                id, name
            )));
        }
        tx.commit()?;
        tracing::info!(person_id = %id, department = %name, "added department");
        Ok(())
    }

    pub fn remove_department(&mut self, id: &PersonId, name: &str) -> LedgerResult<()> {
        let name = validate_department(name)?;
        let tx = self.write()?;
        require(&tx, id)?;
        let removed = tx.execute(
            "DELETE FROM departments WHERE person_id = ?1 AND department_name = ?2",
            params![id, name],
        )?;
        if removed == 0 {
            return Err(LedgerError::NotFound {
                entity: "department affiliation",
                id: format!("{}/{}", id, name),
            });
        }
        tx.commit()?;
        tracing::info!(person_id = %id, department = %name, "removed department");
        Ok(())
    }

    /// Department names of one person, alphabetically
    pub fn departments_of(&self, id: &PersonId) -> LedgerResult<Vec<String>> {
        require(&self.conn, id)?;
        let mut stmt = self.conn.prepare(
            "SELECT department_name FROM departments WHERE person_id = ?1 ORDER BY department_name",
        )?;
        let rows = stmt.query_map(params![id], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Every distinct department name in the directory
    pub fn list_departments(&self) -> LedgerResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT department_name FROM departments ORDER BY department_name")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        Ok(rows.collect::<Result<Vec<String>, _>>()?)
    }

    /// Remove a person
    ///
    /// Direct reports lose their supervisor, affiliations are deleted, and
    /// packages and transactions keep existing without the person reference.
    pub fn remove_person(&mut self, id: &PersonId) -> LedgerResult<DeleteOutcome> {
        let tx = self.write()?;
        let outcome = policy::delete_with_policy::<Person>(&tx, id, id.as_str())?;
        tx.commit()?;
        tracing::info!(person_id = %id, "removed person");
        Ok(outcome)
    }
}
