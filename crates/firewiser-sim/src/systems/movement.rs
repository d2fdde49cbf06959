//! Path-following system.
//!
//! Advances `progress` along each entity's path and resolves its position
//! through the path interpolator: progress = min(1, progress + speed * advance).

use hecs::World;

use firewiser_core::components::{Aircraft, Evacuee, PathFollower};
use firewiser_core::enums::{EvacueeStatus, MissionStatus};
use firewiser_core::types::GeoPoint;

use crate::path;

/// Run path following for every entity with PathFollower + GeoPoint.
///
/// Entities at progress 1 are left untouched, as are STANDBY aircraft.
/// Aircraft mission status is never derived here.
pub fn run(world: &mut World, advance: f64) {
    let advance = advance.max(0.0);
    for (_entity, (follower, position, evacuee, aircraft)) in world.query_mut::<(
        &mut PathFollower,
        &mut GeoPoint,
        Option<&mut Evacuee>,
        Option<&Aircraft>,
    )>() {
        if follower.is_complete() {
            continue;
        }
        if aircraft.is_some_and(|a| a.mission_status == MissionStatus::Standby) {
            continue;
        }

        follower.progress = (follower.progress + follower.speed * advance).min(1.0);
        if let Some(at) = path::position(&follower.path, follower.progress) {
            *position = at;
        }
        if let Some(evacuee) = evacuee {
            evacuee.status = EvacueeStatus::from_progress(follower.progress);
        }
    }
}
