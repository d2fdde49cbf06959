//! Simulation constants and tuning parameters.

/// Nominal rendering cadence (Hz). Entity speeds are expressed per nominal frame.
pub const NOMINAL_FRAME_RATE: u32 = 60;

/// Milliseconds per nominal frame.
pub const NOMINAL_FRAME_MS: f64 = 1000.0 / NOMINAL_FRAME_RATE as f64;

/// Upper bound on the frame advance applied after a stall, in nominal frames.
pub const MAX_FRAME_ADVANCE: f64 = 4.0;

// --- Population ---

/// Evacuees still en route at scenario start, including the primary point.
pub const EN_ROUTE_POPULATION: u32 = 57;

/// Evacuees already inside the shelter perimeter at scenario start.
pub const SAFE_POPULATION: u32 = 573;

/// Speed of the primary (user-tracked) point along the safe route.
pub const PRIMARY_SPEED: f64 = 0.000_04;

/// Base speed of other en-route evacuees.
pub const EVACUEE_BASE_SPEED: f64 = 0.000_035;

/// Random extra speed added on top of the base speed (uniform, exclusive).
pub const EVACUEE_SPEED_JITTER: f64 = 0.000_02;

/// Scatter of already-safe evacuees around the shelter (degrees, full width).
pub const SAFE_SCATTER_DEG: f64 = 0.005;

// --- Flame flicker ---

/// Minimum wall-clock interval between flame icon changes.
pub const FLICKER_INTERVAL_MS: f64 = 120.0;

/// Number of flame glyph variants.
pub const FLICKER_VARIANTS: u8 = 3;

/// Smallest flame size (px).
pub const FLICKER_BASE_SIZE_PX: f64 = 46.0;

/// Random extra flame size (px, uniform, exclusive).
pub const FLICKER_SIZE_JITTER_PX: f64 = 8.0;

/// Flame size used before the first flicker update.
pub const FLAME_INITIAL_SIZE_PX: f64 = 50.0;

// --- Pulses ---

/// Period of the prediction-boundary opacity pulse.
pub const PREDICTION_PULSE_PERIOD_MS: f64 = 2000.0;
pub const PREDICTION_OPACITY_MIN: f64 = 0.2;
pub const PREDICTION_OPACITY_MAX: f64 = 0.5;

/// Period of the safe-zone radius pulse.
pub const SAFE_ZONE_PULSE_PERIOD_MS: f64 = 2500.0;
pub const SAFE_ZONE_RADIUS_MIN_M: f64 = 250.0;
pub const SAFE_ZONE_RADIUS_MAX_M: f64 = 350.0;

/// Safe-zone fill opacity at the minimum radius.
pub const SAFE_ZONE_FILL_MAX: f64 = 0.25;

// --- Reveals ---

pub const DROP_REVEAL_DURATION_MS: f64 = 2500.0;
pub const DROP_REVEAL_MAX_RADIUS_M: f64 = 300.0;
pub const DROP_REVEAL_FILL: f64 = 0.5;
pub const DROP_REVEAL_STROKE: f64 = 0.8;

pub const ACK_REVEAL_DURATION_MS: f64 = 1500.0;
pub const ACK_REVEAL_MAX_RADIUS_M: f64 = 400.0;
pub const ACK_REVEAL_FILL: f64 = 0.6;
pub const ACK_REVEAL_STROKE: f64 = 0.9;

// --- Dispatch ---

/// Dispatch ground speed in degrees per nominal frame.
pub const DISPATCH_SPEED: f64 = 0.0025;

/// Return-leg speed in progress units per nominal frame.
pub const RETURN_SPEED: f64 = 0.001;

/// Delay between the drop and the start of the return leg.
pub const RETURN_GRACE_MS: f64 = 500.0;

// --- Drop zone ---

/// Smallest cluster the drop-zone heuristic averages over.
pub const MIN_CLUSTER_SIZE: usize = 5;

/// Fraction of the population nearest the epicenter that forms the cluster.
pub const CLUSTER_FRACTION: f64 = 0.2;

// --- Map layers ---

pub const Z_EVACUEE: i32 = 0;
pub const Z_SAFE_ZONE: i32 = -1;
pub const Z_FLAME: i32 = 100;
pub const Z_SHELTER: i32 = 150;
pub const Z_REVEAL_DROP: i32 = 180;
pub const Z_REVEAL_ACK: i32 = 185;
pub const Z_DROP_ZONE: i32 = 190;
pub const Z_AIRCRAFT: i32 = 200;

/// Viewport padding used when fitting the scenario (px).
pub const VIEWPORT_PADDING_PX: u32 = 70;
