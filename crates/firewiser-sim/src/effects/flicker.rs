//! Flame flicker: a new glyph variant and jittered size every interval.
//!
//! The interval is measured on wall-clock time, never in frames, so the
//! flicker rate does not depend on the rendering cadence.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use firewiser_core::constants::*;
use firewiser_core::render::IconDescriptor;

#[derive(Debug, Clone)]
pub struct FlameFlicker {
    interval_ms: f64,
    last_update_ms: f64,
    icon: IconDescriptor,
}

impl FlameFlicker {
    pub fn new(interval_ms: f64, started_ms: f64) -> Self {
        Self {
            interval_ms,
            last_update_ms: started_ms,
            icon: IconDescriptor::Flame {
                variant: 0,
                size_px: FLAME_INITIAL_SIZE_PX,
            },
        }
    }

    /// Icon every flame currently shows.
    pub fn icon(&self) -> IconDescriptor {
        self.icon
    }

    /// Pick a new icon once more than `interval_ms` has passed since the
    /// last change. Returns the icon to apply to every flame, if any.
    pub fn step(&mut self, now_ms: f64, rng: &mut ChaCha8Rng) -> Option<IconDescriptor> {
        if now_ms - self.last_update_ms <= self.interval_ms {
            return None;
        }
        self.last_update_ms = now_ms;
        self.icon = IconDescriptor::Flame {
            variant: rng.gen_range(0..FLICKER_VARIANTS),
            size_px: FLICKER_BASE_SIZE_PX + rng.gen::<f64>() * FLICKER_SIZE_JITTER_PX,
        };
        Some(self.icon)
    }
}
