//! Static scenario configuration, injected into a session at construction.
//!
//! Everything here is immutable once a session starts. Defaults reproduce the
//! Malibu wildfire scenario; a JSON file may override any subset of fields.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::enums::{AircraftType, MissionStatus};
use crate::types::{AircraftId, GeoBounds, GeoPoint};

/// Errors raised while loading or validating a scenario file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read scenario file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("scenario file is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Static definition of one fleet aircraft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftConfig {
    pub id: AircraftId,
    pub kind: AircraftType,
    pub initial_status: MissionStatus,
    /// Patrol leg; the first waypoint is the aircraft's home base.
    pub path: Vec<GeoPoint>,
    pub speed: f64,
}

/// Parameters of the predicted fire-spread boundary polygon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionBoundaryConfig {
    pub center: GeoPoint,
    pub vertices: u32,
    /// Radius in degrees of latitude.
    pub radius_deg: f64,
    /// Longitudinal stretch applied to the radius.
    pub lng_stretch: f64,
    /// Maximum relative inward jitter per vertex.
    pub irregularity: f64,
}

impl Default for PredictionBoundaryConfig {
    fn default() -> Self {
        Self {
            center: GeoPoint::new(34.045, -118.680),
            vertices: 8,
            radius_deg: 0.015,
            lng_stretch: 1.5,
            irregularity: 0.005,
        }
    }
}

/// The complete static scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    /// RNG seed for population sampling and cosmetic jitter.
    pub seed: u64,
    pub map_center: GeoPoint,
    pub shelter: GeoPoint,
    /// Start of the primary point; also the first waypoint of `safe_route`.
    pub primary_start: GeoPoint,
    /// Multi-segment route followed by the primary point.
    pub safe_route: Vec<GeoPoint>,
    /// Region en-route evacuees are sampled from.
    pub evacuation_zone: GeoBounds,
    /// Risk epicenter used for drop-zone selection.
    pub fire_center: GeoPoint,
    pub flame_locations: Vec<GeoPoint>,
    pub prediction: PredictionBoundaryConfig,
    pub code_red_zone: Vec<GeoPoint>,
    pub heat_advisory: Vec<GeoPoint>,
    pub fleet: Vec<AircraftConfig>,
    /// The aircraft operators can dispatch.
    pub commandable_aircraft: AircraftId,
    /// En-route evacuees including the primary point.
    pub en_route_count: u32,
    pub safe_count: u32,
    /// Points the viewport is fitted to at session start.
    pub fit_points: Vec<GeoPoint>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        let primary_start = GeoPoint::new(34.0395, -118.7205);
        let shelter = GeoPoint::new(34.0250, -118.6985);
        let home_base = GeoPoint::new(34.0100, -118.6600);
        let fire_center = GeoPoint::new(34.045, -118.680);

        Self {
            seed: 42,
            map_center: GeoPoint::new(34.0356, -118.6920),
            shelter,
            primary_start,
            safe_route: vec![
                primary_start,
                GeoPoint::new(34.0362, -118.7160),
                GeoPoint::new(34.0318, -118.7108),
                GeoPoint::new(34.0290, -118.7041),
                shelter,
            ],
            evacuation_zone: GeoBounds {
                north: 34.045,
                south: 34.020,
                west: -118.725,
                east: -118.690,
            },
            fire_center,
            flame_locations: vec![
                // West front
                GeoPoint::new(34.0265, -118.7470),
                GeoPoint::new(34.0300, -118.7560),
                GeoPoint::new(34.0220, -118.7380),
                // East front
                GeoPoint::new(34.0440, -118.6760),
                GeoPoint::new(34.0470, -118.6840),
                GeoPoint::new(34.0420, -118.6700),
            ],
            prediction: PredictionBoundaryConfig::default(),
            code_red_zone: vec![
                GeoPoint::new(34.032, -118.725),
                GeoPoint::new(34.038, -118.720),
                GeoPoint::new(34.035, -118.710),
                GeoPoint::new(34.028, -118.715),
            ],
            heat_advisory: vec![
                GeoPoint::new(34.00, -118.80),
                GeoPoint::new(34.08, -118.80),
                GeoPoint::new(34.08, -118.60),
                GeoPoint::new(34.00, -118.60),
            ],
            fleet: vec![
                AircraftConfig {
                    id: 101,
                    kind: AircraftType::Plane,
                    initial_status: MissionStatus::Standby,
                    path: vec![home_base],
                    speed: 0.0,
                },
                AircraftConfig {
                    id: 102,
                    kind: AircraftType::Helicopter,
                    initial_status: MissionStatus::Patrolling,
                    path: vec![
                        GeoPoint::new(34.0150, -118.7300),
                        GeoPoint::new(34.0500, -118.7000),
                    ],
                    speed: 0.0008,
                },
                AircraftConfig {
                    id: 103,
                    kind: AircraftType::Plane,
                    initial_status: MissionStatus::Patrolling,
                    path: vec![
                        GeoPoint::new(34.0600, -118.7600),
                        GeoPoint::new(34.0050, -118.6500),
                    ],
                    speed: 0.0005,
                },
            ],
            commandable_aircraft: 101,
            en_route_count: EN_ROUTE_POPULATION,
            safe_count: SAFE_POPULATION,
            fit_points: vec![primary_start, shelter, fire_center],
        }
    }
}

impl ScenarioConfig {
    /// Load and validate a scenario from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Parse and validate a scenario from JSON text.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: ScenarioConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check structural invariants the simulation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.safe_route.len() < 2 {
            return Err(ConfigError::Invalid(
                "safe_route needs at least two waypoints".into(),
            ));
        }
        if !self.evacuation_zone.is_valid() {
            return Err(ConfigError::Invalid(
                "evacuation_zone must have north > south and east > west".into(),
            ));
        }
        if self.en_route_count == 0 {
            return Err(ConfigError::Invalid(
                "en_route_count must include the primary point".into(),
            ));
        }
        if self.prediction.vertices < 3 {
            return Err(ConfigError::Invalid(
                "prediction boundary needs at least three vertices".into(),
            ));
        }

        let mut ids = HashSet::new();
        for aircraft in &self.fleet {
            if aircraft.path.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "aircraft {} has an empty path",
                    aircraft.id
                )));
            }
            if aircraft.speed < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "aircraft {} has a negative speed",
                    aircraft.id
                )));
            }
            if !ids.insert(aircraft.id) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate aircraft id {}",
                    aircraft.id
                )));
            }
        }
        if !ids.contains(&self.commandable_aircraft) {
            return Err(ConfigError::Invalid(format!(
                "commandable aircraft {} is not in the fleet",
                self.commandable_aircraft
            )));
        }
        Ok(())
    }

    pub fn aircraft(&self, id: AircraftId) -> Option<&AircraftConfig> {
        self.fleet.iter().find(|a| a.id == id)
    }
}

/// Timing of one self-terminating reveal effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealSpec {
    pub duration_ms: f64,
    pub max_radius_m: f64,
    /// Fill opacity at t = 0, decays linearly to 0.
    pub fill_opacity: f64,
    /// Stroke opacity at t = 0, decays linearly to 0.
    pub stroke_opacity: f64,
    pub stroke_color: &'static str,
    pub fill_color: &'static str,
    pub z_order: i32,
}

/// Cosmetic effect tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectsConfig {
    pub flicker_interval_ms: f64,
    pub prediction_period_ms: f64,
    pub safe_zone_period_ms: f64,
    pub drop: RevealSpec,
    pub acknowledgement: RevealSpec,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            flicker_interval_ms: FLICKER_INTERVAL_MS,
            prediction_period_ms: PREDICTION_PULSE_PERIOD_MS,
            safe_zone_period_ms: SAFE_ZONE_PULSE_PERIOD_MS,
            drop: RevealSpec {
                duration_ms: DROP_REVEAL_DURATION_MS,
                max_radius_m: DROP_REVEAL_MAX_RADIUS_M,
                fill_opacity: DROP_REVEAL_FILL,
                stroke_opacity: DROP_REVEAL_STROKE,
                stroke_color: "#3B82F6",
                fill_color: "#60A5FA",
                z_order: Z_REVEAL_DROP,
            },
            acknowledgement: RevealSpec {
                duration_ms: ACK_REVEAL_DURATION_MS,
                max_radius_m: ACK_REVEAL_MAX_RADIUS_M,
                fill_opacity: ACK_REVEAL_FILL,
                stroke_opacity: ACK_REVEAL_STROKE,
                stroke_color: "#06B6D4",
                fill_color: "#22D3EE",
                z_order: Z_REVEAL_ACK,
            },
        }
    }
}

/// Dispatch timing and speeds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchConfig {
    /// Ground speed towards the target, degrees per nominal frame.
    pub dispatch_speed: f64,
    /// Progress units per nominal frame on the way home.
    pub return_speed: f64,
    pub return_grace_ms: f64,
    pub frame_ms: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            dispatch_speed: DISPATCH_SPEED,
            return_speed: RETURN_SPEED,
            return_grace_ms: RETURN_GRACE_MS,
            frame_ms: NOMINAL_FRAME_MS,
        }
    }
}
