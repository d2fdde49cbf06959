//! Tests for the shared vocabulary: geo math, enums, configuration, and serde shapes.

use crate::commands::OperatorCommand;
use crate::config::{ConfigError, DispatchConfig, ScenarioConfig};
use crate::constants::*;
use crate::enums::*;
use crate::events::SimEvent;
use crate::render::{IconDescriptor, ShapeGeometry, ShapeStyle};
use crate::types::{FrameClock, GeoBounds, GeoPoint};

// ---- Geo math ----

#[test]
fn test_planar_distance_is_pythagorean() {
    let a = GeoPoint::new(0.0, 0.0);
    let b = GeoPoint::new(0.003, 0.004);
    assert!((a.planar_distance_to(&b) - 0.005).abs() < 1e-12);
    assert!((b.planar_distance_to(&a) - 0.005).abs() < 1e-12);
}

#[test]
fn test_lerp_endpoints_and_midpoint() {
    let a = GeoPoint::new(34.0, -118.0);
    let b = GeoPoint::new(35.0, -117.0);
    assert_eq!(a.lerp(&b, 0.0), a);
    assert_eq!(a.lerp(&b, 1.0), b);
    let mid = a.lerp(&b, 0.5);
    assert!((mid.lat - 34.5).abs() < 1e-12);
    assert!((mid.lng + 117.5).abs() < 1e-12);
}

#[test]
fn test_heading_cardinal_directions() {
    let origin = GeoPoint::new(34.0, -118.0);
    let north = GeoPoint::new(34.1, -118.0);
    let east = GeoPoint::new(34.0, -117.9);
    let south = GeoPoint::new(33.9, -118.0);
    let west = GeoPoint::new(34.0, -118.1);

    assert!(origin.heading_to(&north).abs() < 1e-9);
    assert!((origin.heading_to(&east) - 90.0).abs() < 0.1);
    assert!((origin.heading_to(&south).abs() - 180.0).abs() < 1e-9);
    assert!((origin.heading_to(&west) + 90.0).abs() < 0.1);
}

#[test]
fn test_bounds_sample_stays_inside() {
    let bounds = GeoBounds {
        north: 34.045,
        south: 34.020,
        west: -118.725,
        east: -118.690,
    };
    for &(u, v) in &[(0.0, 0.0), (1.0, 1.0), (0.3, 0.7), (0.999, 0.001)] {
        assert!(bounds.contains(&bounds.sample(u, v)));
    }
    assert!(bounds.is_valid());
    assert!(!GeoBounds {
        north: 1.0,
        south: 2.0,
        west: 0.0,
        east: 1.0
    }
    .is_valid());
}

#[test]
fn test_frame_clock_counts_runs() {
    let mut clock = FrameClock::default();
    clock.advance(16.0);
    clock.advance(40.0);
    assert_eq!(clock.frame, 2);
    assert_eq!(clock.elapsed_ms, 40.0);
}

// ---- Enums ----

#[test]
fn test_status_from_progress() {
    assert_eq!(EvacueeStatus::from_progress(0.0), EvacueeStatus::EnRoute);
    assert_eq!(EvacueeStatus::from_progress(0.999), EvacueeStatus::EnRoute);
    assert_eq!(EvacueeStatus::from_progress(1.0), EvacueeStatus::Safe);
}

#[test]
fn test_mission_status_idle() {
    assert!(MissionStatus::Standby.is_idle());
    assert!(MissionStatus::Patrolling.is_idle());
    assert!(!MissionStatus::EnRoute.is_idle());
    assert!(!MissionStatus::Returning.is_idle());
}

#[test]
fn test_household_profile_parse() {
    assert_eq!(HouseholdProfile::parse("parent"), Some(HouseholdProfile::Parent));
    assert_eq!(
        HouseholdProfile::parse("Pet_Owner"),
        Some(HouseholdProfile::PetOwner)
    );
    assert_eq!(
        HouseholdProfile::parse(" mobility-impaired "),
        Some(HouseholdProfile::MobilityImpaired)
    );
    assert_eq!(HouseholdProfile::parse("astronaut"), None);
    for profile in HouseholdProfile::ALL {
        assert!(!profile.label().is_empty());
    }
}

#[test]
fn test_enum_serde() {
    for v in [
        MissionStatus::Standby,
        MissionStatus::Patrolling,
        MissionStatus::EnRoute,
        MissionStatus::Returning,
    ] {
        let json = serde_json::to_string(&v).unwrap();
        let back: MissionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
    for v in HouseholdProfile::ALL {
        let json = serde_json::to_string(&v).unwrap();
        let back: HouseholdProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(v, back);
    }
}

// ---- Configuration ----

#[test]
fn test_default_scenario_is_valid() {
    let config = ScenarioConfig::default();
    config.validate().unwrap();
    assert_eq!(config.en_route_count, 57);
    assert_eq!(config.safe_count, 573);
    assert_eq!(config.safe_route.first(), Some(&config.primary_start));
    assert_eq!(config.safe_route.last(), Some(&config.shelter));
    let tanker = config.aircraft(config.commandable_aircraft).unwrap();
    assert_eq!(tanker.initial_status, MissionStatus::Standby);
}

#[test]
fn test_partial_json_overrides_defaults() {
    let config = ScenarioConfig::from_json(r#"{ "seed": 7, "safe_count": 10 }"#).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.safe_count, 10);
    assert_eq!(config.shelter, ScenarioConfig::default().shelter);
}

#[test]
fn test_invalid_json_is_decode_error() {
    let err = ScenarioConfig::from_json("{ not json").unwrap_err();
    assert!(matches!(err, ConfigError::Decode(_)));
}

#[test]
fn test_validation_rejects_short_route() {
    let mut config = ScenarioConfig::default();
    config.safe_route.truncate(1);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validation_rejects_duplicate_aircraft() {
    let mut config = ScenarioConfig::default();
    let dup = config.fleet[0].clone();
    config.fleet.push(dup);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validation_rejects_unknown_commandable() {
    let config = ScenarioConfig {
        commandable_aircraft: 999,
        ..Default::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = ScenarioConfig::load(std::path::Path::new("/nonexistent/scenario.json")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_dispatch_config_defaults() {
    let config = DispatchConfig::default();
    assert_eq!(config.dispatch_speed, DISPATCH_SPEED);
    assert_eq!(config.return_grace_ms, RETURN_GRACE_MS);
    assert!((config.frame_ms - 1000.0 / 60.0).abs() < 1e-12);
}

// ---- Render contract ----

#[test]
fn test_shape_style_merge_only_overrides_set_fields() {
    let base = ShapeStyle {
        stroke_color: Some("#FF0000"),
        stroke_opacity: Some(0.8),
        fill_opacity: Some(0.35),
        ..Default::default()
    };
    let patch = ShapeStyle {
        fill_opacity: Some(0.1),
        radius_m: Some(300.0),
        ..Default::default()
    };
    let merged = base.merged(&patch);
    assert_eq!(merged.stroke_color, Some("#FF0000"));
    assert_eq!(merged.stroke_opacity, Some(0.8));
    assert_eq!(merged.fill_opacity, Some(0.1));
    assert_eq!(merged.radius_m, Some(300.0));
}

#[test]
fn test_shape_geometry_kind() {
    let p = GeoPoint::new(0.0, 0.0);
    assert_eq!(ShapeGeometry::Polygon(vec![p]).kind(), ShapeKind::Polygon);
    assert_eq!(
        ShapeGeometry::Circle {
            center: p,
            radius_m: 1.0
        }
        .kind(),
        ShapeKind::Circle
    );
    assert_eq!(ShapeGeometry::Polyline(vec![p]).kind(), ShapeKind::Polyline);
}

#[test]
fn test_icon_descriptor_serde() {
    let icons = vec![
        IconDescriptor::EvacueeEnRoute { primary: true },
        IconDescriptor::EvacueeSafe,
        IconDescriptor::Aircraft {
            kind: AircraftType::Helicopter,
            heading_deg: 45.0,
        },
        IconDescriptor::Flame {
            variant: 2,
            size_px: 50.0,
        },
        IconDescriptor::Shelter,
        IconDescriptor::DropZone,
    ];
    for icon in &icons {
        let json = serde_json::to_string(icon).unwrap();
        let back: IconDescriptor = serde_json::from_str(&json).unwrap();
        assert_eq!(*icon, back);
    }
}

// ---- Commands & events ----

/// Verify OperatorCommand round-trips through serde (tagged union).
#[test]
fn test_operator_command_serde() {
    let commands = vec![
        OperatorCommand::DispatchAircraft {
            aircraft_id: 101,
            target: Some(GeoPoint::new(34.03, -118.70)),
        },
        OperatorCommand::DispatchAircraft {
            aircraft_id: 101,
            target: None,
        },
        OperatorCommand::ResetScenario { seed: Some(9) },
    ];
    for cmd in &commands {
        let json = serde_json::to_string(cmd).unwrap();
        assert!(json.contains("\"type\""));
        let back: OperatorCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(*cmd, back);
    }
}

#[test]
fn test_operator_command_from_frontend_json() {
    let cmd: OperatorCommand =
        serde_json::from_str(r#"{"type":"DispatchAircraft","aircraft_id":101,"target":null}"#)
            .unwrap();
    assert_eq!(
        cmd,
        OperatorCommand::DispatchAircraft {
            aircraft_id: 101,
            target: None
        }
    );
}

#[test]
fn test_sim_event_serde() {
    let events = vec![
        SimEvent::RevealStarted {
            kind: RevealKind::Drop,
            at: GeoPoint::new(1.0, 2.0),
        },
        SimEvent::TargetCleared,
        SimEvent::DropZoneUpdated { zone: None },
    ];
    for event in &events {
        let json = serde_json::to_string(event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(*event, back);
    }
}
