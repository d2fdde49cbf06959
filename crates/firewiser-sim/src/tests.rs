//! Tests for path interpolation, the entity store, scheduling, effects,
//! reconciliation, drop-zone selection and the dispatch lifecycle.

use hecs::World;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use firewiser_core::components::{Aircraft, Evacuee, PathFollower};
use firewiser_core::config::{AircraftConfig, DispatchConfig, EffectsConfig, ScenarioConfig};
use firewiser_core::constants::*;
use firewiser_core::enums::*;
use firewiser_core::render::{IconDescriptor, ShapeGeometry, ShapeStyle};
use firewiser_core::types::{GeoPoint, PopulationSample};

use crate::dispatch::{DispatchController, DispatchError, MissionOutcome};
use crate::dropzone;
use crate::effects::{pulse, FlameFlicker, RevealAnimation, RevealFrame};
use crate::path;
use crate::reconcile::{MarkerReconciler, MarkerSpec, ShapeSet};
use crate::scheduler::AnimationScheduler;
use crate::store::{EntityStore, PRIMARY_EVACUEE_ID};
use crate::surface::JournalSurface;
use crate::systems::movement;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn approx_point(a: GeoPoint, b: GeoPoint) -> bool {
    approx(a.lat, b.lat) && approx(a.lng, b.lng)
}

fn route() -> Vec<GeoPoint> {
    ScenarioConfig::default().safe_route
}

// ---- Path interpolation ----

#[test]
fn test_path_endpoints() {
    let two = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 2.0)];
    for p in [two, route()] {
        assert!(approx_point(path::position(&p, 0.0).unwrap(), p[0]));
        assert!(approx_point(
            path::position(&p, 1.0).unwrap(),
            *p.last().unwrap()
        ));
    }
}

#[test]
fn test_single_waypoint_is_stationary() {
    let p = vec![GeoPoint::new(34.0, -118.0)];
    for i in 0..=10 {
        let progress = i as f64 / 10.0;
        assert_eq!(path::position(&p, progress), Some(p[0]));
    }
}

#[test]
fn test_empty_path_has_no_position() {
    assert_eq!(path::position(&[], 0.5), None);
}

#[test]
fn test_two_point_linear_interpolation() {
    let p = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.003, 0.004)];
    let mid = path::position(&p, 0.25).unwrap();
    assert!(approx(mid.lat, 0.00075));
    assert!(approx(mid.lng, 0.001));
}

#[test]
fn test_progress_is_clamped() {
    let p = vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)];
    assert_eq!(path::position(&p, -0.5), path::position(&p, 0.0));
    assert_eq!(path::position(&p, 1.5), path::position(&p, 1.0));
}

#[test]
fn test_multi_segment_hits_interior_waypoints() {
    let p = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(1.0, 0.0),
        GeoPoint::new(1.0, 1.0),
    ];
    assert!(approx_point(path::position(&p, 0.5).unwrap(), p[1]));
    let quarter = path::position(&p, 0.25).unwrap();
    assert!(approx(quarter.lat, 0.5));
    assert!(approx(quarter.lng, 0.0));
    let three_quarters = path::position(&p, 0.75).unwrap();
    assert!(approx(three_quarters.lat, 1.0));
    assert!(approx(three_quarters.lng, 0.5));
}

#[test]
fn test_segment_index_is_monotonic() {
    let waypoints = route().len();
    let mut last = 0;
    for i in 0..=1000 {
        let index = path::segment_index(waypoints, i as f64 / 1000.0);
        assert!(index >= last, "segment index went backwards");
        assert!(index <= waypoints - 2);
        last = index;
    }
    assert_eq!(last, waypoints - 2);
    assert_eq!(path::segment_index(1, 0.7), 0);
}

#[test]
fn test_leg_heading() {
    let east = vec![GeoPoint::new(34.0, -118.0), GeoPoint::new(34.0, -117.9)];
    assert!((path::leg_heading(&east) - 90.0).abs() < 0.1);
    assert_eq!(path::leg_heading(&[GeoPoint::new(1.0, 1.0)]), 0.0);
}

// ---- Movement system ----

fn spawn_mover(world: &mut World, speed: f64) -> hecs::Entity {
    let follower = PathFollower::new(
        vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0)],
        speed,
    );
    world.spawn((
        Evacuee {
            id: 1,
            status: EvacueeStatus::EnRoute,
            is_primary: false,
        },
        follower,
        GeoPoint::new(0.0, 0.0),
    ))
}

#[test]
fn test_movement_reaches_end_and_marks_safe() {
    let mut world = World::new();
    let entity = spawn_mover(&mut world, 0.3);

    for _ in 0..3 {
        movement::run(&mut world, 1.0);
    }
    {
        let evacuee = world.get::<&Evacuee>(entity).unwrap();
        assert_eq!(evacuee.status, EvacueeStatus::EnRoute);
    }
    movement::run(&mut world, 1.0);

    let follower = world.get::<&PathFollower>(entity).unwrap();
    assert_eq!(follower.progress, 1.0);
    let evacuee = world.get::<&Evacuee>(entity).unwrap();
    assert_eq!(evacuee.status, EvacueeStatus::Safe);
    let at = world.get::<&GeoPoint>(entity).unwrap();
    assert!(approx_point(*at, GeoPoint::new(0.0, 1.0)));
}

#[test]
fn test_terminal_tick_is_idempotent() {
    let mut world = World::new();
    let entity = spawn_mover(&mut world, 0.6);
    movement::run(&mut world, 1.0);
    movement::run(&mut world, 1.0);

    let before = *world.get::<&GeoPoint>(entity).unwrap();
    for _ in 0..50 {
        movement::run(&mut world, 1.0);
    }
    let after = *world.get::<&GeoPoint>(entity).unwrap();
    assert_eq!(before, after);
    assert_eq!(world.get::<&PathFollower>(entity).unwrap().progress, 1.0);
    assert_eq!(
        world.get::<&Evacuee>(entity).unwrap().status,
        EvacueeStatus::Safe
    );
}

#[test]
fn test_movement_scales_with_advance() {
    let mut world = World::new();
    let entity = spawn_mover(&mut world, 0.1);
    movement::run(&mut world, 2.5);
    let progress = world.get::<&PathFollower>(entity).unwrap().progress;
    assert!(approx(progress, 0.25));
}

#[test]
fn test_standby_aircraft_never_moves() {
    let mut world = World::new();
    let entity = world.spawn((
        Aircraft {
            id: 7,
            kind: AircraftType::Plane,
            mission_status: MissionStatus::Standby,
        },
        PathFollower::new(
            vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0)],
            0.5,
        ),
        GeoPoint::new(0.0, 0.0),
    ));
    for _ in 0..10 {
        movement::run(&mut world, 1.0);
    }
    assert_eq!(world.get::<&PathFollower>(entity).unwrap().progress, 0.0);
    assert_eq!(*world.get::<&GeoPoint>(entity).unwrap(), GeoPoint::new(0.0, 0.0));
}

// ---- Entity store ----

fn populated_store(seed: u64) -> EntityStore {
    let config = ScenarioConfig::default();
    let mut store = EntityStore::new();
    store.populate(&config, &mut ChaCha8Rng::seed_from_u64(seed));
    store.spawn_fleet(&config.fleet);
    store
}

#[test]
fn test_populate_counts() {
    let store = populated_store(42);
    assert_eq!(store.evacuee_count(), 630);
    assert_eq!(store.aircraft_count(), 3);
    let triage = store.triage();
    assert_eq!(triage.en_route, 57);
    assert_eq!(triage.safe, 573);
    assert_eq!(store.en_route_population().len(), 57);
}

#[test]
fn test_populate_layout() {
    let config = ScenarioConfig::default();
    let store = populated_store(42);
    let evacuees = store.evacuees();

    let primary = &evacuees[0];
    assert_eq!(primary.id, PRIMARY_EVACUEE_ID);
    assert!(primary.is_primary);
    assert_eq!(primary.position, config.primary_start);
    assert_eq!(evacuees.iter().filter(|e| e.is_primary).count(), 1);

    for e in &evacuees[1..57] {
        assert_eq!(e.status, EvacueeStatus::EnRoute);
        assert!(config.evacuation_zone.contains(&e.position));
    }
    for e in &evacuees[57..] {
        assert_eq!(e.status, EvacueeStatus::Safe);
        assert_eq!(e.progress, 1.0);
        assert!((e.position.lat - config.shelter.lat).abs() <= SAFE_SCATTER_DEG / 2.0);
        assert!((e.position.lng - config.shelter.lng).abs() <= SAFE_SCATTER_DEG / 2.0);
    }

    let mut ids: Vec<u32> = evacuees.iter().map(|e| e.id).collect();
    ids.dedup();
    assert_eq!(ids.len(), 630, "evacuee ids must be unique");
}

#[test]
fn test_populate_is_deterministic() {
    let a = serde_json::to_string(&populated_store(9).evacuees()).unwrap();
    let b = serde_json::to_string(&populated_store(9).evacuees()).unwrap();
    let c = serde_json::to_string(&populated_store(10).evacuees()).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn test_repopulate_replaces_population() {
    let config = ScenarioConfig::default();
    let mut store = populated_store(1);
    store.populate(&config, &mut ChaCha8Rng::seed_from_u64(2));
    assert_eq!(store.evacuee_count(), 630);
    assert_eq!(store.aircraft_count(), 3);
}

#[test]
fn test_tick_never_reorders() {
    let mut store = populated_store(3);
    let before: Vec<u32> = store.evacuees().iter().map(|e| e.id).collect();
    for _ in 0..20 {
        store.tick(1.0);
    }
    let after: Vec<u32> = store.evacuees().iter().map(|e| e.id).collect();
    assert_eq!(before, after);
}

#[test]
fn test_tick_moves_primary_along_route() {
    let mut store = populated_store(3);
    store.tick(1.0);
    let primary = &store.evacuees()[0];
    assert!(approx(primary.progress, PRIMARY_SPEED));
    assert_ne!(primary.position, ScenarioConfig::default().primary_start);
}

#[test]
fn test_fleet_initial_state() {
    let mut store = populated_store(3);
    let tanker_before = store.aircraft(101).unwrap();
    assert_eq!(tanker_before.mission_status, MissionStatus::Standby);
    for _ in 0..10 {
        store.tick(1.0);
    }
    let tanker = store.aircraft(101).unwrap();
    assert_eq!(tanker.position, tanker_before.position);

    let heli = store.aircraft(102).unwrap();
    assert_eq!(heli.mission_status, MissionStatus::Patrolling);
    assert!(approx(heli.progress, 0.008));
}

#[test]
fn test_patrol_parks_without_status_change() {
    let mut store = populated_store(3);
    for _ in 0..400 {
        store.tick(MAX_FRAME_ADVANCE);
    }
    let heli = store.aircraft(102).unwrap();
    assert_eq!(heli.progress, 1.0);
    assert_eq!(heli.mission_status, MissionStatus::Patrolling);
    assert!(approx_point(heli.position, GeoPoint::new(34.0500, -118.7000)));
}

#[test]
fn test_assign_path_unknown_aircraft() {
    let mut store = populated_store(3);
    assert!(!store.assign_path(
        999,
        vec![GeoPoint::new(0.0, 0.0)],
        0.1,
        MissionStatus::EnRoute
    ));
    assert!(!store.assign_path(101, vec![], 0.1, MissionStatus::EnRoute));
}

// ---- Scheduler ----

#[test]
fn test_loops_run_every_frame_in_start_order() {
    let mut scheduler = AnimationScheduler::new();
    scheduler.start_loop("frame");
    scheduler.start_loop("flicker");
    for now in [0.0, 16.0, 33.0] {
        let due: Vec<&str> = scheduler.due(now).into_iter().map(|d| d.payload).collect();
        assert_eq!(due, vec!["frame", "flicker"]);
    }
}

#[test]
fn test_cancel_is_independent() {
    let mut scheduler = AnimationScheduler::new();
    let frame = scheduler.start_loop("frame");
    let flicker = scheduler.start_loop("flicker");
    let pulse = scheduler.start_loop("pulse");

    assert!(scheduler.cancel(flicker));
    assert!(!scheduler.cancel(flicker));
    let due: Vec<&str> = scheduler.due(0.0).into_iter().map(|d| d.payload).collect();
    assert_eq!(due, vec!["frame", "pulse"]);
    assert!(scheduler.is_scheduled(frame));
    assert!(scheduler.is_scheduled(pulse));
}

#[test]
fn test_one_shot_fires_once_at_deadline() {
    let mut scheduler = AnimationScheduler::new();
    let timer = scheduler.schedule_once(100.0, "drop");
    assert!(scheduler.due(99.9).is_empty());
    assert_eq!(scheduler.next_deadline(), Some(100.0));

    let due = scheduler.due(100.0);
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, timer);
    assert!(scheduler.due(200.0).is_empty());
    assert!(!scheduler.cancel(timer));
}

#[test]
fn test_cancelled_one_shot_never_fires() {
    let mut scheduler = AnimationScheduler::new();
    let timer = scheduler.schedule_once(50.0, "drop");
    assert!(scheduler.cancel(timer));
    assert!(scheduler.due(1_000.0).is_empty());
}

#[test]
fn test_expired_one_shots_ordered_by_deadline() {
    let mut scheduler = AnimationScheduler::new();
    scheduler.schedule_once(30.0, "c");
    scheduler.schedule_once(10.0, "a");
    scheduler.schedule_once(20.0, "b");
    let due: Vec<&str> = scheduler.due(50.0).into_iter().map(|d| d.payload).collect();
    assert_eq!(due, vec!["a", "b", "c"]);
}

#[test]
fn test_cancel_all() {
    let mut scheduler = AnimationScheduler::new();
    scheduler.start_loop(1);
    scheduler.schedule_once(10.0, 2);
    assert_eq!(scheduler.cancel_all(), 2);
    assert!(scheduler.is_empty());
    assert!(scheduler.due(100.0).is_empty());
}

// ---- Effects ----

#[test]
fn test_flicker_respects_interval() {
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut flicker = FlameFlicker::new(FLICKER_INTERVAL_MS, 0.0);
    assert!(flicker.step(60.0, &mut rng).is_none());
    assert!(flicker.step(120.0, &mut rng).is_none());
    let icon = flicker.step(121.0, &mut rng).expect("flicker due");
    assert_eq!(flicker.icon(), icon);
    assert!(flicker.step(200.0, &mut rng).is_none());
    assert!(flicker.step(242.0, &mut rng).is_some());
}

#[test]
fn test_flicker_variant_and_size_ranges() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut flicker = FlameFlicker::new(FLICKER_INTERVAL_MS, 0.0);
    for i in 1..200 {
        let icon = flicker.step(i as f64 * 121.0, &mut rng).unwrap();
        match icon {
            IconDescriptor::Flame { variant, size_px } => {
                assert!(variant < FLICKER_VARIANTS);
                assert!((46.0..54.0).contains(&size_px));
            }
            other => panic!("unexpected icon {other:?}"),
        }
    }
}

#[test]
fn test_prediction_opacity_envelope() {
    assert!(approx(pulse::prediction_opacity(0.0, 2000.0), 0.2));
    assert!(approx(pulse::prediction_opacity(1000.0, 2000.0), 0.5));
    assert!(approx(pulse::prediction_opacity(2000.0, 2000.0), 0.2));
    for t in 0..500 {
        let o = pulse::prediction_opacity(t as f64 * 37.0, 2000.0);
        assert!((0.2 - 1e-12..=0.5 + 1e-12).contains(&o));
    }
}

#[test]
fn test_safe_zone_radius_and_fill() {
    assert!(approx(pulse::safe_zone_radius(0.0, 2500.0), 250.0));
    assert!(approx(pulse::safe_zone_radius(1250.0, 2500.0), 350.0));
    assert!(approx(pulse::safe_zone_fill(250.0), 0.25));
    assert!(approx(pulse::safe_zone_fill(350.0), 0.0));
    assert!(approx(pulse::safe_zone_fill(300.0), 0.125));
}

#[test]
fn test_reveal_eases_out_and_terminates() {
    let spec = EffectsConfig::default().drop;
    let reveal = RevealAnimation::new(RevealKind::Drop, GeoPoint::new(0.0, 0.0), spec, 1000.0);

    match reveal.frame(1000.0) {
        RevealFrame::Draw {
            radius_m,
            fill_opacity,
            stroke_opacity,
        } => {
            assert_eq!(radius_m, 0.0);
            assert!(approx(fill_opacity, 0.5));
            assert!(approx(stroke_opacity, 0.8));
        }
        RevealFrame::Finished => panic!("reveal finished at start"),
    }

    match reveal.frame(1000.0 + 1250.0) {
        RevealFrame::Draw {
            radius_m,
            fill_opacity,
            ..
        } => {
            assert!(approx(radius_m, 0.875 * 300.0));
            assert!(approx(fill_opacity, 0.25));
        }
        RevealFrame::Finished => panic!("reveal finished early"),
    }

    assert_eq!(reveal.frame(1000.0 + 2500.1), RevealFrame::Finished);
}

// ---- Reconciliation ----

fn spec(key: u32, lat: f64, icon: IconDescriptor) -> MarkerSpec<u32> {
    MarkerSpec {
        key,
        position: GeoPoint::new(lat, 0.0),
        icon,
        z_order: 0,
    }
}

const EN_ROUTE: IconDescriptor = IconDescriptor::EvacueeEnRoute { primary: false };

#[test]
fn test_reconcile_identity_create_remove() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();

    let a = vec![spec(1, 0.0, EN_ROUTE), spec(2, 0.0, EN_ROUTE), spec(3, 0.0, EN_ROUTE)];
    let stats = markers.reconcile(&mut surface, a);
    assert_eq!(stats.created, 3);
    let h2 = markers.handle(&2).unwrap();
    let h3 = markers.handle(&3).unwrap();
    let h1 = markers.handle(&1).unwrap();

    let b = vec![spec(2, 0.1, EN_ROUTE), spec(3, 0.0, EN_ROUTE), spec(4, 0.0, EN_ROUTE)];
    let stats = markers.reconcile(&mut surface, b);
    assert_eq!(stats.created, 1);
    assert_eq!(stats.removed, 1);
    assert_eq!(stats.updated, 1);
    assert_eq!(markers.handle(&2), Some(h2));
    assert_eq!(markers.handle(&3), Some(h3));
    assert_eq!(markers.handle(&1), None);
    assert!(surface.marker(h1).is_none());
    assert_eq!(surface.marker(h2).unwrap().position, GeoPoint::new(0.1, 0.0));
    assert_eq!(surface.marker_count(), 3);
}

#[test]
fn test_reconcile_same_set_is_noop() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();
    let set = vec![spec(1, 0.0, EN_ROUTE), spec(2, 1.0, IconDescriptor::EvacueeSafe)];
    markers.reconcile(&mut surface, set.clone());
    let before = surface.counters();

    let stats = markers.reconcile(&mut surface, set);
    assert!(stats.is_noop());
    assert_eq!(surface.counters(), before);
}

#[test]
fn test_reconcile_status_change_restyles_in_place() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();
    markers.reconcile(&mut surface, vec![spec(1, 0.0, EN_ROUTE)]);
    let handle = markers.handle(&1).unwrap();

    markers.reconcile(&mut surface, vec![spec(1, 0.5, IconDescriptor::EvacueeSafe)]);
    assert_eq!(markers.handle(&1), Some(handle));
    let marker = surface.marker(handle).unwrap();
    assert_eq!(marker.icon, IconDescriptor::EvacueeSafe);
    assert_eq!(surface.counters().markers_created, 1);
    assert_eq!(surface.counters().markers_updated, 1);
}

#[test]
fn test_reconcile_empty_set_clears() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();
    markers.reconcile(&mut surface, vec![spec(1, 0.0, EN_ROUTE), spec(2, 0.0, EN_ROUTE)]);
    let stats = markers.reconcile(&mut surface, Vec::new());
    assert_eq!(stats.removed, 2);
    assert!(markers.is_empty());
    assert_eq!(surface.marker_count(), 0);
    assert!(markers.reconcile(&mut surface, Vec::new()).is_noop());
}

#[test]
fn test_reconcile_ignores_duplicate_ids() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();
    let stats = markers.reconcile(&mut surface, vec![spec(1, 0.0, EN_ROUTE), spec(1, 5.0, EN_ROUTE)]);
    assert_eq!(stats.created, 1);
    assert_eq!(markers.len(), 1);
    assert_eq!(surface.marker_count(), 1);
}

#[test]
fn test_restyle_all_skips_matching_icons() {
    let mut surface = JournalSurface::new();
    let mut markers = MarkerReconciler::new();
    let flame = IconDescriptor::Flame {
        variant: 0,
        size_px: 50.0,
    };
    markers.reconcile(&mut surface, vec![spec(0, 0.0, flame), spec(1, 1.0, flame)]);
    let next = IconDescriptor::Flame {
        variant: 2,
        size_px: 47.5,
    };
    assert_eq!(markers.restyle_all(&mut surface, next), 2);
    assert_eq!(markers.restyle_all(&mut surface, next), 0);
}

#[test]
fn test_shape_set_replaces_and_removes() {
    let mut surface = JournalSurface::new();
    let mut shapes = ShapeSet::new();
    let circle = ShapeGeometry::Circle {
        center: GeoPoint::new(0.0, 0.0),
        radius_m: 0.0,
    };
    let first = shapes.draw(&mut surface, "reveal", &circle, &ShapeStyle::default());
    let second = shapes.draw(&mut surface, "reveal", &circle, &ShapeStyle::default());
    assert_ne!(first, second);
    assert!(surface.shape(first).is_none());
    assert_eq!(surface.shape_count(), 1);

    assert!(shapes.restyle(
        &mut surface,
        "reveal",
        &ShapeStyle {
            radius_m: Some(120.0),
            ..Default::default()
        }
    ));
    match &surface.shape(second).unwrap().geometry {
        ShapeGeometry::Circle { radius_m, .. } => assert_eq!(*radius_m, 120.0),
        other => panic!("unexpected geometry {other:?}"),
    }

    assert!(shapes.remove(&mut surface, "reveal"));
    assert!(!shapes.remove(&mut surface, "reveal"));
    assert!(!shapes.restyle(&mut surface, "reveal", &ShapeStyle::default()));
    assert_eq!(surface.shape_count(), 0);
    assert_eq!(surface.counters().dangling_calls, 0);
}

// ---- Drop-zone selection ----

fn sample(id: u32, lat: f64, lng: f64) -> PopulationSample {
    PopulationSample {
        id,
        position: GeoPoint::new(lat, lng),
    }
}

#[test]
fn test_select_empty_population() {
    assert_eq!(dropzone::select(&[], GeoPoint::new(34.0, -118.0)), None);
}

#[test]
fn test_cluster_size() {
    assert_eq!(dropzone::cluster_size(0), 0);
    assert_eq!(dropzone::cluster_size(1), 1);
    assert_eq!(dropzone::cluster_size(3), 3);
    assert_eq!(dropzone::cluster_size(10), 5);
    assert_eq!(dropzone::cluster_size(57), 12);
    assert_eq!(dropzone::cluster_size(100), 20);
}

#[test]
fn test_select_centroid_within_cluster_bounds() {
    let config = ScenarioConfig::default();
    let store = populated_store(77);
    let population = store.en_route_population();
    assert_eq!(population.len(), 57);

    let zone = dropzone::select(&population, config.fire_center).unwrap();
    let members = dropzone::cluster(&population, config.fire_center);
    assert_eq!(members.len(), 12);

    let lats: Vec<f64> = members.iter().map(|&i| population[i].position.lat).collect();
    let lngs: Vec<f64> = members.iter().map(|&i| population[i].position.lng).collect();
    let (lat_min, lat_max) = (
        lats.iter().cloned().fold(f64::INFINITY, f64::min),
        lats.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    let (lng_min, lng_max) = (
        lngs.iter().cloned().fold(f64::INFINITY, f64::min),
        lngs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
    );
    assert!(zone.lat >= lat_min && zone.lat <= lat_max);
    assert!(zone.lng >= lng_min && zone.lng <= lng_max);

    // Every member is at least as close as every non-member.
    let farthest_member = members
        .iter()
        .map(|&i| population[i].position.planar_distance_to(&config.fire_center))
        .fold(0.0, f64::max);
    for (i, s) in population.iter().enumerate() {
        if !members.contains(&i) {
            assert!(s.position.planar_distance_to(&config.fire_center) >= farthest_member);
        }
    }
}

#[test]
fn test_select_small_population_uses_everyone() {
    let population = vec![sample(0, 0.0, 0.0), sample(1, 2.0, 4.0), sample(2, 4.0, 2.0)];
    let zone = dropzone::select(&population, GeoPoint::new(100.0, 100.0)).unwrap();
    assert!(approx(zone.lat, 2.0));
    assert!(approx(zone.lng, 2.0));
}

#[test]
fn test_cluster_ties_keep_input_order() {
    let population: Vec<PopulationSample> = (0..8).map(|i| sample(i, 1.0, 0.0)).collect();
    let members = dropzone::cluster(&population, GeoPoint::new(0.0, 0.0));
    assert_eq!(members, vec![0, 1, 2, 3, 4]);
}

// ---- Dispatch ----

fn dispatch_fixture() -> (EntityStore, DispatchController) {
    let fleet = vec![AircraftConfig {
        id: 1,
        kind: AircraftType::Plane,
        initial_status: MissionStatus::Standby,
        path: vec![GeoPoint::new(0.0, 0.0)],
        speed: 0.0,
    }];
    let mut store = EntityStore::new();
    store.spawn_fleet(&fleet);
    let controller = DispatchController::new(DispatchConfig::default(), &fleet);
    (store, controller)
}

#[test]
fn test_dispatch_eta_is_distance_over_speed() {
    let (mut store, mut controller) = dispatch_fixture();
    let order = controller
        .dispatch(&mut store, 1, GeoPoint::new(0.003, 0.004), 0.0)
        .unwrap();
    assert!((order.eta_frames - 2.0).abs() < 1e-9);
    assert!((order.eta_ms - 2.0 * NOMINAL_FRAME_MS).abs() < 1e-6);
    assert_eq!(order.origin, GeoPoint::new(0.0, 0.0));

    let aircraft = store.aircraft(1).unwrap();
    assert_eq!(aircraft.mission_status, MissionStatus::EnRoute);
    assert_eq!(aircraft.progress, 0.0);
}

#[test]
fn test_dispatch_arrives_when_timer_fires() {
    let (mut store, mut controller) = dispatch_fixture();
    let target = GeoPoint::new(0.003, 0.004);
    let order = controller.dispatch(&mut store, 1, target, 0.0).unwrap();

    store.tick(1.0);
    assert!(controller.fire_due(&mut store, NOMINAL_FRAME_MS).is_empty());
    store.tick(1.0);
    let position = store.aircraft(1).unwrap().position;
    assert!(position.planar_distance_to(&target) < 1e-9);

    let outcomes = controller.fire_due(&mut store, order.eta_ms + 1e-6);
    assert_eq!(
        outcomes,
        vec![MissionOutcome::Dropped {
            aircraft_id: 1,
            target
        }]
    );
}

#[test]
fn test_arrival_snaps_a_stalled_aircraft_to_target() {
    let (mut store, mut controller) = dispatch_fixture();
    let target = GeoPoint::new(0.003, 0.004);
    let order = controller.dispatch(&mut store, 1, target, 0.0).unwrap();

    // Half a leg of movement, then the timer fires anyway.
    store.tick(1.0);
    assert!(store.aircraft(1).unwrap().progress < 1.0);
    let outcomes = controller.fire_due(&mut store, order.eta_ms);
    assert_eq!(outcomes.len(), 1);

    let aircraft = store.aircraft(1).unwrap();
    assert_eq!(aircraft.progress, 1.0);
    assert!(aircraft.position.planar_distance_to(&target) < 1e-12);
}

#[test]
fn test_complete_leg_unknown_aircraft() {
    let (mut store, _) = dispatch_fixture();
    assert!(!store.complete_leg(7));
}

#[test]
fn test_exactly_one_drop_then_return() {
    let (mut store, mut controller) = dispatch_fixture();
    let target = GeoPoint::new(0.003, 0.004);
    let order = controller.dispatch(&mut store, 1, target, 0.0).unwrap();

    let mut drops = 0;
    let mut returns = 0;
    let mut now = 0.0;
    while now < order.eta_ms + 2_000.0 {
        now += NOMINAL_FRAME_MS;
        store.tick(1.0);
        for outcome in controller.fire_due(&mut store, now) {
            match outcome {
                MissionOutcome::Dropped { .. } => drops += 1,
                MissionOutcome::ReturnLegIssued { home, .. } => {
                    assert_eq!(home, GeoPoint::new(0.0, 0.0));
                    returns += 1;
                }
            }
        }
        if drops == 1 && returns == 0 {
            assert_eq!(store.aircraft(1).unwrap().mission_status, MissionStatus::EnRoute);
        }
    }
    assert_eq!(drops, 1);
    assert_eq!(returns, 1);
    assert_eq!(store.aircraft(1).unwrap().mission_status, MissionStatus::Returning);
    assert_eq!(controller.pending_timers(), 0);
    assert_eq!(controller.active_missions(), 0);
}

#[test]
fn test_return_leg_after_grace_delay() {
    let (mut store, mut controller) = dispatch_fixture();
    let order = controller
        .dispatch(&mut store, 1, GeoPoint::new(0.003, 0.004), 0.0)
        .unwrap();
    store.tick(1.0);
    store.tick(1.0);
    let drop_at = order.eta_ms + 1.0;
    assert_eq!(controller.fire_due(&mut store, drop_at).len(), 1);
    assert!(controller
        .fire_due(&mut store, drop_at + RETURN_GRACE_MS - 1.0)
        .is_empty());
    assert_eq!(store.aircraft(1).unwrap().mission_status, MissionStatus::EnRoute);

    let outcomes = controller.fire_due(&mut store, drop_at + RETURN_GRACE_MS);
    assert!(matches!(outcomes[..], [MissionOutcome::ReturnLegIssued { .. }]));
    let aircraft = store.aircraft(1).unwrap();
    assert_eq!(aircraft.mission_status, MissionStatus::Returning);
    assert_eq!(aircraft.progress, 0.0);

    // Parks at home and stays RETURNING.
    for _ in 0..300 {
        store.tick(MAX_FRAME_ADVANCE);
    }
    let parked = store.aircraft(1).unwrap();
    assert_eq!(parked.progress, 1.0);
    assert_eq!(parked.mission_status, MissionStatus::Returning);
    assert!(parked.position.planar_distance_to(&GeoPoint::new(0.0, 0.0)) < 1e-12);
}

#[test]
fn test_busy_aircraft_is_rejected() {
    let (mut store, mut controller) = dispatch_fixture();
    controller
        .dispatch(&mut store, 1, GeoPoint::new(0.003, 0.004), 0.0)
        .unwrap();
    let err = controller
        .dispatch(&mut store, 1, GeoPoint::new(0.1, 0.1), 5.0)
        .unwrap_err();
    assert!(matches!(err, DispatchError::MissionInProgress { id: 1, .. }));
    assert_eq!(controller.pending_timers(), 1);
}

#[test]
fn test_unknown_aircraft_is_rejected() {
    let (mut store, mut controller) = dispatch_fixture();
    let err = controller
        .dispatch(&mut store, 42, GeoPoint::new(0.0, 0.0), 0.0)
        .unwrap_err();
    assert_eq!(err, DispatchError::UnknownAircraft(42));
}

#[test]
fn test_abandoned_mission_timers_are_noops() {
    let (mut store, mut controller) = dispatch_fixture();
    controller
        .dispatch(&mut store, 1, GeoPoint::new(0.003, 0.004), 0.0)
        .unwrap();
    assert_eq!(controller.abandon_all(), 1);
    assert!(controller.fire_due(&mut store, 10_000.0).is_empty());
    assert_eq!(controller.next_deadline(), None);
}

#[test]
fn test_zero_length_leg_drops_immediately() {
    let (mut store, mut controller) = dispatch_fixture();
    let order = controller
        .dispatch(&mut store, 1, GeoPoint::new(0.0, 0.0), 100.0)
        .unwrap();
    assert_eq!(order.eta_ms, 0.0);
    let outcomes = controller.fire_due(&mut store, 100.0);
    assert_eq!(outcomes.len(), 1);
}

#[test]
fn test_parked_returning_aircraft_can_be_redispatched() {
    assert!(DispatchController::can_dispatch(MissionStatus::Standby, 0.0));
    assert!(DispatchController::can_dispatch(MissionStatus::Patrolling, 0.4));
    assert!(!DispatchController::can_dispatch(MissionStatus::EnRoute, 1.0));
    assert!(!DispatchController::can_dispatch(MissionStatus::Returning, 0.5));
    assert!(DispatchController::can_dispatch(MissionStatus::Returning, 1.0));
}
