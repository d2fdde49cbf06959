//! EntityStore: authoritative per-tick state of every moving entity.
//!
//! Owns a hecs `World` holding evacuees and fleet aircraft. Evacuees carry
//! `(Evacuee, PathFollower, GeoPoint)`, aircraft `(Aircraft, PathFollower,
//! GeoPoint)`. Spawn order is remembered so views never reorder entities.

use hecs::{Entity, World};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use firewiser_core::components::{Aircraft, Evacuee, PathFollower};
use firewiser_core::config::{AircraftConfig, ScenarioConfig};
use firewiser_core::constants::*;
use firewiser_core::enums::{EvacueeStatus, MissionStatus};
use firewiser_core::state::{AircraftView, EvacueeView, TriageCounts};
use firewiser_core::types::{AircraftId, GeoPoint, PopulationSample};

use crate::path;
use crate::systems;

/// Id of the user-tracked evacuee.
pub const PRIMARY_EVACUEE_ID: u32 = 0;

#[derive(Default)]
pub struct EntityStore {
    world: World,
    evacuees: Vec<Entity>,
    aircraft: Vec<(AircraftId, Entity)>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole evacuee population.
    ///
    /// Id 0 is the primary point on the safe route. Ids `1..en_route_count`
    /// start inside the evacuation zone and head straight for the shelter.
    /// The remaining `safe_count` points are already parked around it.
    pub fn populate(&mut self, config: &ScenarioConfig, rng: &mut ChaCha8Rng) {
        for entity in self.evacuees.drain(..) {
            let _ = self.world.despawn(entity);
        }

        let primary = PathFollower::new(config.safe_route.clone(), PRIMARY_SPEED);
        let start = path::position(&primary.path, 0.0).unwrap_or(config.primary_start);
        self.spawn_evacuee(PRIMARY_EVACUEE_ID, true, primary, start);

        for id in 1..config.en_route_count {
            let start = config
                .evacuation_zone
                .sample(rng.gen::<f64>(), rng.gen::<f64>());
            let speed = EVACUEE_BASE_SPEED + rng.gen::<f64>() * EVACUEE_SPEED_JITTER;
            let follower = PathFollower::new(vec![start, config.shelter], speed);
            self.spawn_evacuee(id, false, follower, start);
        }

        for i in 0..config.safe_count {
            let at = GeoPoint::new(
                config.shelter.lat + (rng.gen::<f64>() - 0.5) * SAFE_SCATTER_DEG,
                config.shelter.lng + (rng.gen::<f64>() - 0.5) * SAFE_SCATTER_DEG,
            );
            self.spawn_evacuee(config.en_route_count + i, false, PathFollower::parked(at), at);
        }

        log::debug!(
            "populated {} evacuees ({} en route)",
            self.evacuees.len(),
            config.en_route_count
        );
    }

    fn spawn_evacuee(&mut self, id: u32, is_primary: bool, follower: PathFollower, at: GeoPoint) {
        let evacuee = Evacuee {
            id,
            status: EvacueeStatus::from_progress(follower.progress),
            is_primary,
        };
        let entity = self.world.spawn((evacuee, follower, at));
        self.evacuees.push(entity);
    }

    /// Spawn the fleet. Each aircraft starts at the first waypoint of its path.
    pub fn spawn_fleet(&mut self, fleet: &[AircraftConfig]) {
        for config in fleet {
            let follower = PathFollower::new(config.path.clone(), config.speed);
            let at = path::position(&follower.path, 0.0).unwrap_or_default();
            let aircraft = Aircraft {
                id: config.id,
                kind: config.kind,
                mission_status: config.initial_status,
            };
            let entity = self.world.spawn((aircraft, follower, at));
            self.aircraft.push((config.id, entity));
        }
    }

    /// Despawn everything.
    pub fn clear(&mut self) {
        self.world.clear();
        self.evacuees.clear();
        self.aircraft.clear();
    }

    /// Advance every non-terminal entity by `advance` nominal frames.
    pub fn tick(&mut self, advance: f64) {
        systems::movement::run(&mut self.world, advance);
    }

    /// Give an aircraft a new path from progress 0 and set its mission status.
    /// Returns false for an unknown aircraft or an empty path.
    pub fn assign_path(
        &mut self,
        id: AircraftId,
        new_path: Vec<GeoPoint>,
        speed: f64,
        status: MissionStatus,
    ) -> bool {
        let Some(entity) = self.aircraft_entity(id) else {
            return false;
        };
        let Some(start) = path::position(&new_path, 0.0) else {
            return false;
        };
        let Ok((aircraft, follower, position)) = self
            .world
            .query_one_mut::<(&mut Aircraft, &mut PathFollower, &mut GeoPoint)>(entity)
        else {
            return false;
        };
        follower.reassign(new_path, speed);
        *position = start;
        aircraft.mission_status = status;
        true
    }

    /// Move an aircraft to the end of its current leg. Used when a mission
    /// timer fires before the clamped frame advance has caught up.
    pub fn complete_leg(&mut self, id: AircraftId) -> bool {
        let Some(entity) = self.aircraft_entity(id) else {
            return false;
        };
        let Ok((follower, position)) = self
            .world
            .query_one_mut::<(&mut PathFollower, &mut GeoPoint)>(entity)
        else {
            return false;
        };
        let Some(end) = follower.path.last().copied() else {
            return false;
        };
        follower.progress = 1.0;
        *position = end;
        true
    }

    pub fn aircraft(&self, id: AircraftId) -> Option<AircraftView> {
        let entity = self.aircraft_entity(id)?;
        let mut query = self
            .world
            .query_one::<(&Aircraft, &PathFollower, &GeoPoint)>(entity)
            .ok()?;
        let view = query
            .get()
            .map(|(aircraft, follower, at)| systems::snapshot::aircraft_view(aircraft, follower, at));
        view
    }

    fn aircraft_entity(&self, id: AircraftId) -> Option<Entity> {
        self.aircraft
            .iter()
            .find(|(aircraft_id, _)| *aircraft_id == id)
            .map(|(_, entity)| *entity)
    }

    /// Evacuees in spawn order.
    pub fn evacuees(&self) -> Vec<EvacueeView> {
        systems::snapshot::evacuee_views(&self.world, &self.evacuees)
    }

    /// Fleet in configuration order.
    pub fn fleet(&self) -> Vec<AircraftView> {
        let entities: Vec<Entity> = self.aircraft.iter().map(|(_, e)| *e).collect();
        systems::snapshot::aircraft_views(&self.world, &entities)
    }

    /// Current positions of every evacuee still en route.
    pub fn en_route_population(&self) -> Vec<PopulationSample> {
        self.world
            .query::<(&Evacuee, &GeoPoint)>()
            .iter()
            .filter(|(_, (evacuee, _))| evacuee.status == EvacueeStatus::EnRoute)
            .map(|(_, (evacuee, at))| PopulationSample {
                id: evacuee.id,
                position: *at,
            })
            .collect()
    }

    pub fn triage(&self) -> TriageCounts {
        let mut counts = TriageCounts::default();
        for (_, evacuee) in self.world.query::<&Evacuee>().iter() {
            match evacuee.status {
                EvacueeStatus::EnRoute => counts.en_route += 1,
                EvacueeStatus::Safe => counts.safe += 1,
            }
        }
        counts
    }

    pub fn evacuee_count(&self) -> usize {
        self.evacuees.len()
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }
}
