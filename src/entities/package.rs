//! Package entity type - one row per physical package received

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{CarrierId, PackageId, PersonId};

/// Maximum length of a tracking number
pub const MAX_TRACKING_LEN: usize = 255;

/// A package and its emissions snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    pub package_id: PackageId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier_id: Option<CarrierId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<PersonId>,

    /// Opaque carrier tracking number, not unique across carriers
    pub tracking_number: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_shipped: Option<NaiveDateTime>,

    /// Emissions computed when the package was recorded
    pub total_emissions_kg: f64,

    pub distance_traveled: f64,
}

impl Entity for Package {
    const KIND: &'static str = "package";
    const TABLE: &'static str = "packages";
    const KEY_COLUMN: &'static str = "package_id";
}

/// Input for recording a new package
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPackage {
    /// Carrier; `None` files the package under the "Other" carrier
    pub carrier_id: Option<CarrierId>,
    pub recipient_id: Option<PersonId>,
    pub tracking_number: String,
    /// Service type label; absent or unknown labels use the "Other" factor
    pub service_type: Option<String>,
    pub date_shipped: Option<NaiveDateTime>,
    pub distance_traveled: f64,
}

/// Filters for package search; unset fields match everything
#[derive(Debug, Clone, Default)]
pub struct PackageSearch {
    /// Case-insensitive substring of the tracking number
    pub tracking_number: Option<String>,
    pub min_emissions: Option<f64>,
    pub max_emissions: Option<f64>,
    /// Case-insensitive substring of the carrier name
    pub carrier: Option<String>,
    /// Case-insensitive substring of the service type
    pub service_type: Option<String>,
    /// Inclusive first ship date
    pub shipped_from: Option<NaiveDate>,
    /// Inclusive last ship date
    pub shipped_to: Option<NaiveDate>,
    pub limit: Option<usize>,
}
