//! Fundamental geographic and simulation types.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of a simulated evacuee point.
pub type EntityId = u32;

/// Stable identifier of an aircraft in the fleet.
pub type AircraftId = u32;

/// A geographic point in degrees (WGS84 latitude/longitude).
///
/// Distances between points are planar (flat-earth) in degree units, which is
/// accurate enough at the few-kilometre scale of a single incident map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Planar vector view (x = lng, y = lat).
    pub fn to_vec(self) -> DVec2 {
        DVec2::new(self.lng, self.lat)
    }

    pub fn from_vec(v: DVec2) -> Self {
        Self { lat: v.y, lng: v.x }
    }

    /// Planar distance in degrees: `sqrt(dlat^2 + dlng^2)`.
    pub fn planar_distance_to(&self, other: &GeoPoint) -> f64 {
        self.to_vec().distance(other.to_vec())
    }

    /// Linear interpolation towards `other`; `t` is not clamped.
    pub fn lerp(&self, other: &GeoPoint, t: f64) -> GeoPoint {
        GeoPoint::from_vec(self.to_vec().lerp(other.to_vec(), t))
    }

    /// Initial great-circle heading to `other` in degrees
    /// (0 = North, clockwise, range [-180, 180]).
    pub fn heading_to(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_lambda = (other.lng - self.lng).to_radians();
        let y = d_lambda.sin() * phi2.cos();
        let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
        y.atan2(x).to_degrees()
    }
}

/// Axis-aligned lat/lng bounding region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub west: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn contains(&self, p: &GeoPoint) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }

    /// Map unit-square coordinates `(u, v)` into the region.
    /// `u` runs south to north, `v` west to east.
    pub fn sample(&self, u: f64, v: f64) -> GeoPoint {
        GeoPoint::new(
            self.south + u * (self.north - self.south),
            self.west + v * (self.east - self.west),
        )
    }

    pub fn is_valid(&self) -> bool {
        self.north > self.south && self.east > self.west
    }
}

/// One member of a drop-zone population snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopulationSample {
    pub id: EntityId,
    pub position: GeoPoint,
}

/// Liveness ticket handed out with every asynchronous request a session makes.
///
/// A result carrying a ticket from an earlier generation (the session was
/// reset or torn down in between) is dropped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionTicket {
    pub generation: u64,
}

/// Wall-clock bookkeeping for a running session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FrameClock {
    /// Number of frame-loop runs so far.
    pub frame: u64,
    /// Milliseconds since the session started.
    pub elapsed_ms: f64,
}

impl FrameClock {
    /// Record one frame-loop run at `elapsed_ms` since session start.
    pub fn advance(&mut self, elapsed_ms: f64) {
        self.frame += 1;
        self.elapsed_ms = elapsed_ms;
    }
}
