//! Operator commands sent to a running session.
//!
//! Commands are queued and processed at the next `advance` boundary.

use serde::{Deserialize, Serialize};

use crate::types::{AircraftId, GeoPoint};

/// All possible operator actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OperatorCommand {
    /// Send an aircraft to a target. `None` targets the current drop zone.
    DispatchAircraft {
        aircraft_id: AircraftId,
        target: Option<GeoPoint>,
    },
    /// Replace the evacuee population atomically. `None` keeps the scenario seed.
    ResetScenario { seed: Option<u64> },
}
