//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Evacuation status of a moving point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvacueeStatus {
    /// Still travelling towards the shelter.
    #[default]
    EnRoute,
    /// Reached the end of its path.
    Safe,
}

impl EvacueeStatus {
    /// Status implied by path progress: SAFE iff progress >= 1.
    pub fn from_progress(progress: f64) -> Self {
        if progress >= 1.0 {
            EvacueeStatus::Safe
        } else {
            EvacueeStatus::EnRoute
        }
    }
}

/// Airframe type, used to pick the marker glyph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AircraftType {
    #[default]
    Plane,
    Helicopter,
}

/// Mission status of an aircraft. Only the dispatch controller changes it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MissionStatus {
    /// Parked; progress never advances.
    #[default]
    Standby,
    /// Flying its configured patrol leg.
    Patrolling,
    /// Dispatched towards a target.
    EnRoute,
    /// Flying back to its home base after a drop.
    Returning,
}

impl MissionStatus {
    /// Whether the aircraft can accept a new dispatch in this status.
    pub fn is_idle(self) -> bool {
        matches!(self, MissionStatus::Standby | MissionStatus::Patrolling)
    }
}

/// Household profile used to personalise guidance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HouseholdProfile {
    #[default]
    Parent,
    Elderly,
    PetOwner,
    MobilityImpaired,
}

impl HouseholdProfile {
    pub const ALL: [HouseholdProfile; 4] = [
        HouseholdProfile::Parent,
        HouseholdProfile::Elderly,
        HouseholdProfile::PetOwner,
        HouseholdProfile::MobilityImpaired,
    ];

    /// Human-readable label, also used in prompts.
    pub fn label(self) -> &'static str {
        match self {
            HouseholdProfile::Parent => "Parent with young children",
            HouseholdProfile::Elderly => "Elderly resident",
            HouseholdProfile::PetOwner => "Pet owner",
            HouseholdProfile::MobilityImpaired => "Resident with limited mobility",
        }
    }

    /// Parse a CLI-style name (`parent`, `elderly`, `pet-owner`, `mobility-impaired`).
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "parent" => Some(HouseholdProfile::Parent),
            "elderly" => Some(HouseholdProfile::Elderly),
            "pet-owner" | "petowner" => Some(HouseholdProfile::PetOwner),
            "mobility-impaired" | "mobilityimpaired" => Some(HouseholdProfile::MobilityImpaired),
            _ => None,
        }
    }
}

/// Self-terminating radial reveal effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RevealKind {
    /// Payload drop at the target.
    Drop,
    /// Pulse at the aircraft when a dispatch is acknowledged.
    Acknowledgement,
}

/// Geometry kinds the rendering surface can draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Polygon,
    Circle,
    Polyline,
}
