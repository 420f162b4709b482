//! Entity trait - common interface for all ledger row types

use serde::{de::DeserializeOwned, Serialize};

/// Common trait for all rows persisted in the ledger
pub trait Entity: Serialize + DeserializeOwned {
    /// Human-readable kind used in diagnostics (e.g., "package")
    const KIND: &'static str;

    /// Table the entity is stored in
    const TABLE: &'static str;

    /// Primary key column of that table
    const KEY_COLUMN: &'static str;
}
