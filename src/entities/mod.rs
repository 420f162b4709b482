//! Entity types stored in the ledger

pub mod carrier;
pub mod emission_factor;
pub mod package;
pub mod person;
pub mod transaction;

pub use carrier::Carrier;
pub use emission_factor::EmissionFactor;
pub use package::{NewPackage, Package, PackageSearch};
pub use person::{NewPerson, Person, PersonFilter};
pub use transaction::{NewTransaction, PackageStatus, Transaction, TransactionType};

/// Name of the sentinel carrier and emission factor used when the real one is unknown
pub const OTHER: &str = "Other";
