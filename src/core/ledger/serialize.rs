//! SQLite serialization for typed identifiers and enums
//!
//! Implements ToSql and FromSql for the ID newtypes and TransactionType
//! to enable typed storage and retrieval from SQLite.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::core::identity::{CarrierId, PackageId, PersonId, TransactionId};
use crate::entities::TransactionType;

fn invalid_data(message: String) -> FromSqlError {
    FromSqlError::Other(Box::new(std::io::Error::new(
        std::io::ErrorKind::InvalidData,
        message,
    )))
}

// =========================================================================
// Numeric IDs - ToSql/FromSql
// =========================================================================

macro_rules! sql_numeric_id {
    ($name:ident) => {
        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.0))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value.as_i64().map($name)
            }
        }
    };
}

sql_numeric_id!(CarrierId);
sql_numeric_id!(PackageId);
sql_numeric_id!(TransactionId);

// =========================================================================
// PersonId - ToSql/FromSql
// =========================================================================

impl ToSql for PersonId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for PersonId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        PersonId::parse(s).map_err(|e| invalid_data(e.to_string()))
    }
}

// =========================================================================
// TransactionType - ToSql/FromSql
// =========================================================================

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse().map_err(invalid_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_transaction_type_storage() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE test (kind TEXT)", []).unwrap();

        for kind in TransactionType::ALL {
            conn.execute("DELETE FROM test", []).unwrap();
            conn.execute("INSERT INTO test VALUES (?1)", [&kind]).unwrap();

            let raw: String = conn
                .query_row("SELECT kind FROM test", [], |row| row.get(0))
                .unwrap();
            assert_eq!(raw, kind.as_str());

            let retrieved: TransactionType = conn
                .query_row("SELECT kind FROM test", [], |row| row.get(0))
                .unwrap();
            assert_eq!(kind, retrieved);
        }
    }

    #[test]
    fn test_unknown_transaction_type_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        let result: rusqlite::Result<TransactionType> =
            conn.query_row("SELECT 'misplaced'", [], |row| row.get(0));
        assert!(result.is_err());
    }

    #[test]
    fn test_person_id_storage() {
        let conn = Connection::open_in_memory().unwrap();
        let id = PersonId::parse("900000001").unwrap();
        let back: PersonId = conn
            .query_row("SELECT ?1", [&id], |row| row.get(0))
            .unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_numeric_id_storage() {
        let conn = Connection::open_in_memory().unwrap();
        let back: PackageId = conn
            .query_row("SELECT ?1", [&PackageId(12)], |row| row.get(0))
            .unwrap();
        assert_eq!(back, PackageId(12));
    }
}
