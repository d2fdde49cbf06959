//! ECS components for hecs entities.
//!
//! Components are plain data structs. The current position of an entity is
//! stored as a bare `GeoPoint` component next to these.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{AircraftId, EntityId, GeoPoint};

/// An evacuee point moving towards the shelter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Evacuee {
    pub id: EntityId,
    pub status: EvacueeStatus,
    /// The single user-tracked point; follows the full safe route.
    pub is_primary: bool,
}

/// A fleet aircraft.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: AircraftId,
    pub kind: AircraftType,
    pub mission_status: MissionStatus,
}

/// Path-following state shared by evacuees and aircraft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFollower {
    /// Ordered waypoints, never empty.
    pub path: Vec<GeoPoint>,
    /// Normalised traversal fraction in [0, 1].
    pub progress: f64,
    /// Progress units per nominal frame, >= 0.
    pub speed: f64,
}

impl PathFollower {
    pub fn new(path: Vec<GeoPoint>, speed: f64) -> Self {
        Self {
            path,
            progress: 0.0,
            speed: speed.max(0.0),
        }
    }

    /// A path that is already fully traversed and never moves again.
    pub fn parked(at: GeoPoint) -> Self {
        Self {
            path: vec![at],
            progress: 1.0,
            speed: 0.0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 1.0
    }

    /// Replace the path and restart traversal from its first waypoint.
    pub fn reassign(&mut self, path: Vec<GeoPoint>, speed: f64) {
        self.path = path;
        self.progress = 0.0;
        self.speed = speed.max(0.0);
    }
}
