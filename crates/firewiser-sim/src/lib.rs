//! Real-time simulation and render-synchronisation engine for FIREWISER.
//!
//! Owns the hecs entity world, advances evacuees and aircraft along their
//! paths, keeps an external rendering surface in step with that state, runs
//! the cosmetic animations, picks drop zones and drives aircraft missions.

pub mod dispatch;
pub mod dropzone;
pub mod effects;
pub mod path;
pub mod reconcile;
pub mod scenery;
pub mod scheduler;
pub mod session;
pub mod store;
pub mod surface;
pub mod systems;

pub use firewiser_core as core;
pub use session::{MapSession, SessionConfig};
pub use surface::JournalSurface;

#[cfg(test)]
mod tests;
