//! Systems that operate on the entity world.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components.

pub mod movement;
pub mod snapshot;
