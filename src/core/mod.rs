//! Core module - fundamental types and the ledger store

pub mod config;
pub mod dates;
pub mod emissions;
pub mod entity;
pub mod identity;
pub mod ledger;

pub use config::Config;
pub use emissions::{EmissionsBreakdown, EnvironmentalImpact, TransportMode};
pub use entity::Entity;
pub use identity::{CarrierId, IdParseError, PackageId, PersonId, TransactionId};
pub use ledger::{Ledger, LedgerError, LedgerOptions, LedgerResult, LedgerStats};
