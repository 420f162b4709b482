//! Typed identifiers for ledger rows
//!
//! Carriers, packages and transactions are keyed by store-assigned integers.
//! Persons are keyed by their nine-digit campus ID, which is the natural key
//! printed on ID cards and mailbox labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a campus person ID
pub const PERSON_ID_LEN: usize = 9;

/// Error returned when an identifier string cannot be parsed
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdParseError {
    #[error("person ID must be exactly {PERSON_ID_LEN} digits, got '{0}'")]
    MalformedPersonId(String),

    #[error("invalid numeric ID '{0}'")]
    MalformedNumericId(String),
}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map($name)
                    .map_err(|_| IdParseError::MalformedNumericId(s.to_string()))
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                $name(value)
            }
        }
    };
}

numeric_id!(
    /// Store-assigned carrier identifier
    CarrierId
);
numeric_id!(
    /// Store-assigned package identifier
    PackageId
);
numeric_id!(
    /// Store-assigned transaction identifier
    TransactionId
);

/// Nine-digit campus ID identifying a person
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonId(String);

impl PersonId {
    /// Parse and validate a person ID
    pub fn parse(s: &str) -> Result<Self, IdParseError> {
        let trimmed = s.trim();
        if trimmed.len() == PERSON_ID_LEN && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            Ok(PersonId(trimmed.to_string()))
        } else {
            Err(IdParseError::MalformedPersonId(s.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PersonId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PersonId::parse(s)
    }
}

impl TryFrom<String> for PersonId {
    type Error = IdParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PersonId::parse(&value)
    }
}

impl From<PersonId> for String {
    fn from(id: PersonId) -> Self {
        id.0
    }
}
