//! Cosmetic animations driven by the scheduler on wall-clock time.
//!
//! Each effect is plain state plus a `step(now)` that says what should change
//! on the surface. The session applies that change through its reconcilers.

pub mod flicker;
pub mod pulse;
pub mod reveal;

pub use flicker::FlameFlicker;
pub use pulse::{PulseFrame, PulseTiming};
pub use reveal::{RevealAnimation, RevealFrame};
