//! Events emitted by the simulation for UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::RevealKind;
use crate::types::{AircraftId, GeoPoint};

/// Something observable happened during an `advance`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A dispatch was accepted; the aircraft is en route.
    DispatchAccepted {
        aircraft_id: AircraftId,
        target: GeoPoint,
        eta_ms: f64,
    },
    /// A dispatch request was refused.
    DispatchRejected {
        aircraft_id: AircraftId,
        reason: String,
    },
    /// A reveal effect started.
    RevealStarted { kind: RevealKind, at: GeoPoint },
    /// The aircraft delivered its payload at the target.
    PayloadDropped {
        aircraft_id: AircraftId,
        target: GeoPoint,
    },
    /// The visible target marker was removed.
    TargetCleared,
    /// The aircraft turned back towards its home base.
    ReturnLegIssued {
        aircraft_id: AircraftId,
        home: GeoPoint,
    },
    /// A new drop zone was computed (or none could be).
    DropZoneUpdated { zone: Option<GeoPoint> },
    /// The evacuee population was replaced.
    ScenarioReset { seed: u64 },
}
