//! Periodic pulses: prediction-boundary opacity and safe-zone radius.
//!
//! Both map elapsed time through a half-sine envelope:
//! `phase = (t mod period) / period`, `envelope = sin(phase * PI)` in [0, 1].

use std::f64::consts::PI;

use firewiser_core::constants::*;

/// Half-sine envelope of `elapsed_ms` over `period_ms`.
pub fn envelope(elapsed_ms: f64, period_ms: f64) -> f64 {
    if period_ms <= 0.0 {
        return 0.0;
    }
    let phase = elapsed_ms.rem_euclid(period_ms) / period_ms;
    (phase * PI).sin()
}

/// Prediction-boundary fill opacity in [0.2, 0.5].
pub fn prediction_opacity(elapsed_ms: f64, period_ms: f64) -> f64 {
    PREDICTION_OPACITY_MIN
        + envelope(elapsed_ms, period_ms) * (PREDICTION_OPACITY_MAX - PREDICTION_OPACITY_MIN)
}

/// Safe-zone circle radius in metres, in [250, 350].
pub fn safe_zone_radius(elapsed_ms: f64, period_ms: f64) -> f64 {
    SAFE_ZONE_RADIUS_MIN_M
        + envelope(elapsed_ms, period_ms) * (SAFE_ZONE_RADIUS_MAX_M - SAFE_ZONE_RADIUS_MIN_M)
}

/// Safe-zone fill fades as the circle grows: 0.25 at the minimum radius, 0 at the maximum.
pub fn safe_zone_fill(radius_m: f64) -> f64 {
    let span = SAFE_ZONE_RADIUS_MAX_M - SAFE_ZONE_RADIUS_MIN_M;
    (1.0 - (radius_m - SAFE_ZONE_RADIUS_MIN_M) / span) * SAFE_ZONE_FILL_MAX
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTiming {
    pub started_ms: f64,
    pub prediction_period_ms: f64,
    pub safe_zone_period_ms: f64,
}

/// Values to apply on one pulse frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseFrame {
    pub prediction_opacity: f64,
    pub safe_zone_radius_m: f64,
    pub safe_zone_fill: f64,
}

impl PulseTiming {
    pub fn frame(&self, now_ms: f64) -> PulseFrame {
        let elapsed = (now_ms - self.started_ms).max(0.0);
        let radius = safe_zone_radius(elapsed, self.safe_zone_period_ms);
        PulseFrame {
            prediction_opacity: prediction_opacity(elapsed, self.prediction_period_ms),
            safe_zone_radius_m: radius,
            safe_zone_fill: safe_zone_fill(radius),
        }
    }
}
