//! Emission factor entity type - kg CO2e per distance unit for a service type

use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;

/// Maximum length of a service type label
pub const MAX_LABEL_LEN: usize = 50;

/// Emission factor for one carrier service type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
    /// Service type label (e.g., "UPS Ground")
    pub service_type: String,

    /// kg CO2e emitted per distance unit
    pub emission_factor: f64,
}

impl Entity for EmissionFactor {
    const KIND: &'static str = "emission factor";
    const TABLE: &'static str = "emission_factors";
    const KEY_COLUMN: &'static str = "service_type";
}
