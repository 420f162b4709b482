//! Carrier entity type - shipping companies that bring packages to the mailroom

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::CarrierId;

/// Maximum length of a carrier name
pub const MAX_NAME_LEN: usize = 20;

/// A shipping company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    pub carrier_id: CarrierId,
    pub carrier_name: String,
}

impl Carrier {
    /// Whether this is the seeded "Other" carrier
    pub fn is_sentinel(&self) -> bool {
        self.carrier_name == super::OTHER
    }
}

impl Entity for Carrier {
    const KIND: &'static str = "carrier";
    const TABLE: &'static str = "carriers";
    const KEY_COLUMN: &'static str = "carrier_id";
}
