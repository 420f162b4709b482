//! Transaction entity type - timestamped lifecycle events on a package
//!
//! The log is a fact table of what happened in the mailroom. Any sequence of
//! event types is accepted; the current status of a package is simply the type
//! of its latest event.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{PackageId, PersonId, TransactionId};

/// Maximum length of locker and location labels
pub const MAX_LABEL_LEN: usize = 20;

/// Kind of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Stored,
    Routed,
    Delivered,
}

impl TransactionType {
    pub const ALL: [TransactionType; 3] = [
        TransactionType::Stored,
        TransactionType::Routed,
        TransactionType::Delivered,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Stored => "stored",
            TransactionType::Routed => "routed",
            TransactionType::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stored" => Ok(TransactionType::Stored),
            "routed" => Ok(TransactionType::Routed),
            "delivered" => Ok(TransactionType::Delivered),
            _ => Err(format!(
                "Unknown transaction type: '{}'. Use stored/routed/delivered",
                s
            )),
        }
    }
}

/// Current status of a package, inferred from its latest transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum PackageStatus {
    #[default]
    Unprocessed,
    Stored,
    Routed,
    Delivered,
}

impl PackageStatus {
    pub const ALL: [PackageStatus; 4] = [
        PackageStatus::Unprocessed,
        PackageStatus::Stored,
        PackageStatus::Routed,
        PackageStatus::Delivered,
    ];
}

impl From<TransactionType> for PackageStatus {
    fn from(kind: TransactionType) -> Self {
        match kind {
            TransactionType::Stored => PackageStatus::Stored,
            TransactionType::Routed => PackageStatus::Routed,
            TransactionType::Delivered => PackageStatus::Delivered,
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageStatus::Unprocessed => write!(f, "unprocessed"),
            PackageStatus::Stored => write!(f, "stored"),
            PackageStatus::Routed => write!(f, "routed"),
            PackageStatus::Delivered => write!(f, "delivered"),
        }
    }
}

/// A recorded lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub date: NaiveDateTime,
    pub transaction_type: TransactionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locker: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub package_id: PackageId,

    /// Worker who handled the event; `None` for automated events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<PersonId>,
}

impl Entity for Transaction {
    const KIND: &'static str = "transaction";
    const TABLE: &'static str = "transactions";
    const KEY_COLUMN: &'static str = "transaction_id";
}

/// Input for appending a lifecycle event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub package_id: PackageId,
    pub transaction_type: TransactionType,
    pub date: NaiveDateTime,
    pub locker: Option<String>,
    pub location: Option<String>,
    pub worker_id: Option<PersonId>,
}

/// Status of a package given its transactions
///
/// The latest event by timestamp wins; events with equal timestamps are
/// ordered by transaction ID so the later-inserted one wins.
pub fn current_status(transactions: &[Transaction]) -> PackageStatus {
    transactions
        .iter()
        .max_by_key(|t| (t.date, t.transaction_id))
        .map(|t| PackageStatus::from(t.transaction_type))
        .unwrap_or_default()
}
