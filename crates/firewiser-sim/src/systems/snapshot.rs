//! Snapshot system: read-only views of the entity world.

use hecs::{Entity, World};

use firewiser_core::components::{Aircraft, Evacuee, PathFollower};
use firewiser_core::state::{AircraftView, EvacueeView};
use firewiser_core::types::GeoPoint;

use crate::path;

/// Evacuee views in the order of `entities`.
pub fn evacuee_views(world: &World, entities: &[Entity]) -> Vec<EvacueeView> {
    entities
        .iter()
        .filter_map(|&entity| {
            let mut query = world
                .query_one::<(&Evacuee, &PathFollower, &GeoPoint)>(entity)
                .ok()?;
            let view = query.get().map(|(evacuee, follower, at)| EvacueeView {
                id: evacuee.id,
                position: *at,
                status: evacuee.status,
                progress: follower.progress,
                is_primary: evacuee.is_primary,
            });
            view
        })
        .collect()
}

/// Aircraft views in the order of `entities`.
pub fn aircraft_views(world: &World, entities: &[Entity]) -> Vec<AircraftView> {
    entities
        .iter()
        .filter_map(|&entity| {
            let mut query = world
                .query_one::<(&Aircraft, &PathFollower, &GeoPoint)>(entity)
                .ok()?;
            let view = query
                .get()
                .map(|(aircraft, follower, at)| aircraft_view(aircraft, follower, at));
            view
        })
        .collect()
}

pub fn aircraft_view(aircraft: &Aircraft, follower: &PathFollower, at: &GeoPoint) -> AircraftView {
    AircraftView {
        id: aircraft.id,
        kind: aircraft.kind,
        mission_status: aircraft.mission_status,
        position: *at,
        progress: follower.progress,
        heading_deg: path::leg_heading(&follower.path),
    }
}
