//! Session snapshot: the visible simulation state after each `advance`.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{AircraftId, EntityId, FrameClock, GeoBounds, GeoPoint, PopulationSample, SessionTicket};

/// Complete session state handed to the embedding application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub clock: FrameClock,
    /// False once the session has been torn down.
    pub live: bool,
    pub evacuees: Vec<EvacueeView>,
    pub aircraft: Vec<AircraftView>,
    pub triage: TriageCounts,
    /// Current target marker, if any.
    pub drop_zone: Option<GeoPoint>,
    pub events: Vec<SimEvent>,
}

/// A simulated evacuee point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvacueeView {
    pub id: EntityId,
    pub position: GeoPoint,
    pub status: EvacueeStatus,
    pub progress: f64,
    pub is_primary: bool,
}

/// A fleet aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftView {
    pub id: AircraftId,
    pub kind: AircraftType,
    pub mission_status: MissionStatus,
    pub position: GeoPoint,
    pub progress: f64,
    /// Heading of the current leg (degrees, 0 = North).
    pub heading_deg: f64,
}

/// Evacuation counters for the triage overlay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageCounts {
    pub en_route: u32,
    pub safe: u32,
}

/// Everything an asynchronous drop-zone computation needs, decoupled from
/// the live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropZoneRequest {
    pub ticket: SessionTicket,
    pub epicenter: GeoPoint,
    /// Region the eligible population is looked up in.
    pub bounds: GeoBounds,
    /// The session's own en-route population, used if the lookup fails.
    pub fallback_population: Vec<PopulationSample>,
}
