//! Ledger error taxonomy

use std::fmt::Display;

use miette::Diagnostic;
use thiserror::Error;

use crate::core::entity::Entity;
use crate::core::identity::IdParseError;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors reported by ledger operations
///
/// None of these are transient: the caller decides how to recover.
#[derive(Debug, Error, Diagnostic)]
pub enum LedgerError {
    #[error("{entity} '{id}' not found")]
    #[diagnostic(code(greenboard::not_found))]
    NotFound { entity: &'static str, id: String },

    #[error("cannot delete {entity} '{id}': still referenced by {count} row(s) in {dependent}")]
    #[diagnostic(
        code(greenboard::referential_integrity),
        help("remove or reassign the dependent {dependent} rows first")
    )]
    ReferentialIntegrity {
        entity: &'static str,
        id: String,
        dependent: &'static str,
        count: usize,
    },

    #[error("invalid input: {0}")]
    #[diagnostic(code(greenboard::validation))]
    Validation(String),

    #[error("import failed at line {line}: {source}")]
    #[diagnostic(
        code(greenboard::import),
        help("nothing was imported; fix the row and run the import again")
    )]
    Import {
        line: usize,
        #[source]
        source: Box<LedgerError>,
    },

    #[error("CSV error: {0}")]
    #[diagnostic(code(greenboard::csv))]
    Csv(#[from] csv::Error),

    #[error("database error: {0}")]
    #[diagnostic(code(greenboard::database))]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    #[diagnostic(code(greenboard::io))]
    Io(#[from] std::io::Error),
}

impl LedgerError {
    /// Missing row of entity type `E`
    pub fn not_found<E: Entity>(id: impl Display) -> Self {
        LedgerError::NotFound {
            entity: E::KIND,
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound { .. })
    }

    pub fn is_referential_integrity(&self) -> bool {
        matches!(self, LedgerError::ReferentialIntegrity { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, LedgerError::Validation(_))
    }
}

impl From<IdParseError> for LedgerError {
    fn from(err: IdParseError) -> Self {
        LedgerError::Validation(err.to_string())
    }
}
