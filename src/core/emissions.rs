//! Emissions arithmetic and reference figures
//!
//! Package emissions are `distance × factor`, computed once when a package is
//! recorded. Everything else here derives presentation figures from that
//! snapshot: transport mode, environmental equivalents and drift against the
//! factor currently on file.

use serde::{Deserialize, Serialize};

/// kg CO2e absorbed by one mature tree in a year
pub const TREE_ABSORPTION_KG_PER_YEAR: f64 = 21.0;

/// kg CO2e emitted by an average passenger car per mile
pub const CAR_KG_PER_MILE: f64 = 0.404;

/// Kilometres to miles
pub const KM_TO_MILES: f64 = 0.621371;

/// Tolerance when comparing a stored snapshot with a recomputed value
const DRIFT_TOLERANCE: f64 = 0.01;

/// Emissions for a distance under a given factor
pub fn compute_emissions(distance: f64, factor: f64) -> f64 {
    distance * factor
}

/// Broad transport mode inferred from a service type label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    Truck,
    AirShortHaul,
    AirLongHaul,
    Ocean,
    Rail,
    Unknown,
}

impl TransportMode {
    /// Classify a service label such as "UPS Ground" or "FedEx International Priority"
    pub fn classify(service_type: Option<&str>) -> Self {
        let Some(label) = service_type else {
            return TransportMode::Unknown;
        };
        let label = label.to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| label.contains(w));

        if has(&["ground", "home"]) {
            TransportMode::Truck
        } else if has(&["air", "express", "overnight", "next day"]) {
            if label.contains("international") {
                TransportMode::AirLongHaul
            } else {
                TransportMode::AirShortHaul
            }
        } else if label.contains("ocean") {
            TransportMode::Ocean
        } else if label.contains("rail") {
            TransportMode::Rail
        } else {
            TransportMode::Unknown
        }
    }

    /// Reference factor in kg CO2e per tonne-km for the mode
    pub fn reference_factor(&self) -> Option<f64> {
        match self {
            TransportMode::Truck => Some(0.127),
            TransportMode::AirShortHaul => Some(0.82),
            TransportMode::AirLongHaul => Some(0.69),
            TransportMode::Ocean => Some(0.010),
            TransportMode::Rail => Some(0.022),
            TransportMode::Unknown => None,
        }
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportMode::Truck => write!(f, "truck"),
            TransportMode::AirShortHaul => write!(f, "air_shorthaul"),
            TransportMode::AirLongHaul => write!(f, "air_longhaul"),
            TransportMode::Ocean => write!(f, "ocean"),
            TransportMode::Rail => write!(f, "rail"),
            TransportMode::Unknown => write!(f, "unknown"),
        }
    }
}

/// Everyday equivalents of an emissions figure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalImpact {
    /// Trees needed for a year to absorb the emissions
    pub trees_to_offset: f64,
    /// Miles an average car drives to emit the same amount
    pub car_miles_equivalent: f64,
}

impl EnvironmentalImpact {
    pub fn of(emissions_kg: f64) -> Self {
        Self {
            trees_to_offset: emissions_kg / TREE_ABSORPTION_KG_PER_YEAR,
            car_miles_equivalent: emissions_kg / CAR_KG_PER_MILE,
        }
    }
}

/// How a package's stored emissions relate to the factor on file today
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsBreakdown {
    pub service_type: Option<String>,
    pub distance_km: f64,
    pub distance_miles: f64,
    pub stored_emissions_kg: f64,
    /// Factor currently on file for the service type, if any
    pub current_factor: Option<f64>,
    /// Emissions the package would get if recorded today
    pub recomputed_emissions_kg: Option<f64>,
    /// True when the factor changed since the snapshot was taken
    pub drifted: bool,
    pub transport_mode: TransportMode,
    /// Typical kg CO2e per tonne-km for the transport mode
    pub mode_reference_factor: Option<f64>,
    pub impact: EnvironmentalImpact,
}

impl EmissionsBreakdown {
    pub fn new(
        service_type: Option<String>,
        distance_km: f64,
        stored_emissions_kg: f64,
        current_factor: Option<f64>,
    ) -> Self {
        let recomputed = current_factor.map(|f| compute_emissions(distance_km, f));
        let drifted = recomputed
            .map(|r| (r - stored_emissions_kg).abs() >= DRIFT_TOLERANCE)
            .unwrap_or(false);
        let transport_mode = TransportMode::classify(service_type.as_deref());
        Self {
            service_type,
            distance_km,
            distance_miles: distance_km * KM_TO_MILES,
            stored_emissions_kg,
            current_factor,
            recomputed_emissions_kg: recomputed,
            drifted,
            transport_mode,
            mode_reference_factor: transport_mode.reference_factor(),
            impact: EnvironmentalImpact::of(stored_emissions_kg),
        }
    }
}
