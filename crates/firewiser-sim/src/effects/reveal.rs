//! Bounded radial reveals (payload drop, dispatch acknowledgement).
//!
//! A reveal grows a circle with a cubic ease-out while its opacity decays
//! linearly, and reports `Finished` once its duration has elapsed.

use firewiser_core::config::RevealSpec;
use firewiser_core::enums::RevealKind;
use firewiser_core::types::GeoPoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealAnimation {
    pub kind: RevealKind,
    pub center: GeoPoint,
    pub spec: RevealSpec,
    pub started_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealFrame {
    Draw {
        radius_m: f64,
        fill_opacity: f64,
        stroke_opacity: f64,
    },
    Finished,
}

/// Cubic ease-out: `1 - (1 - p)^3`.
pub fn ease_out_cubic(progress: f64) -> f64 {
    1.0 - (1.0 - progress).powi(3)
}

impl RevealAnimation {
    pub fn new(kind: RevealKind, center: GeoPoint, spec: RevealSpec, started_ms: f64) -> Self {
        Self {
            kind,
            center,
            spec,
            started_ms,
        }
    }

    pub fn frame(&self, now_ms: f64) -> RevealFrame {
        let elapsed = (now_ms - self.started_ms).max(0.0);
        if elapsed > self.spec.duration_ms || self.spec.duration_ms <= 0.0 {
            return RevealFrame::Finished;
        }
        let progress = elapsed / self.spec.duration_ms;
        let fade = 1.0 - progress;
        RevealFrame::Draw {
            radius_m: ease_out_cubic(progress) * self.spec.max_radius_m,
            fill_opacity: self.spec.fill_opacity * fade,
            stroke_opacity: self.spec.stroke_opacity * fade,
        }
    }
}
