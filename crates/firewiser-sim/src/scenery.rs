//! Static scenery drawn once when a session starts.

use std::f64::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use firewiser_core::config::{PredictionBoundaryConfig, ScenarioConfig};
use firewiser_core::constants::*;
use firewiser_core::enums::RevealKind;
use firewiser_core::render::{RenderSurface, ShapeGeometry, ShapeStyle};
use firewiser_core::types::GeoPoint;

use crate::reconcile::ShapeSet;

/// Keys of every shape a session draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKey {
    Prediction,
    HeatAdvisory,
    CodeRed,
    SafeRoute,
    SafeZone,
    Reveal(RevealKind),
}

/// Fixed point markers that are not simulated entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Landmark {
    Shelter,
    DropZone,
}

/// Predicted fire-spread boundary: an irregular stretched ring around the
/// fire center. Each vertex is pulled inwards by a random fraction of up to
/// `irregularity`.
pub fn prediction_boundary(config: &PredictionBoundaryConfig, rng: &mut ChaCha8Rng) -> Vec<GeoPoint> {
    (0..config.vertices)
        .map(|i| {
            let angle = i as f64 / config.vertices as f64 * TAU;
            let offset = 1.0 - rng.gen::<f64>() * config.irregularity;
            GeoPoint::new(
                config.center.lat + angle.cos() * config.radius_deg * offset,
                config.center.lng + angle.sin() * config.radius_deg * offset * config.lng_stretch,
            )
        })
        .collect()
}

fn prediction_style() -> ShapeStyle {
    ShapeStyle {
        stroke_color: Some("#FF4500"),
        stroke_opacity: Some(0.9),
        stroke_weight: Some(2.0),
        fill_color: Some("#FF4500"),
        fill_opacity: Some(0.3),
        ..Default::default()
    }
}

fn heat_advisory_style() -> ShapeStyle {
    ShapeStyle {
        stroke_color: Some("#FFC107"),
        stroke_opacity: Some(0.1),
        stroke_weight: Some(1.0),
        fill_color: Some("#FF9800"),
        fill_opacity: Some(0.15),
        ..Default::default()
    }
}

fn code_red_style() -> ShapeStyle {
    ShapeStyle {
        stroke_color: Some("#B71C1C"),
        stroke_opacity: Some(0.8),
        stroke_weight: Some(2.0),
        fill_color: Some("#D32F2F"),
        fill_opacity: Some(0.4),
        ..Default::default()
    }
}

fn safe_route_style() -> ShapeStyle {
    ShapeStyle {
        stroke_color: Some("#3B82F6"),
        stroke_opacity: Some(1.0),
        stroke_weight: Some(4.0),
        ..Default::default()
    }
}

fn safe_zone_style() -> ShapeStyle {
    ShapeStyle {
        stroke_color: Some("#3B82F6"),
        stroke_opacity: Some(0.7),
        stroke_weight: Some(1.0),
        fill_color: Some("#3B82F6"),
        fill_opacity: Some(0.2),
        radius_m: Some(SAFE_ZONE_RADIUS_MIN_M),
        z_order: Some(Z_SAFE_ZONE),
    }
}

/// Draw the prediction boundary, advisory polygons, safe route and safe zone.
pub fn draw<S: RenderSurface + ?Sized>(
    surface: &mut S,
    shapes: &mut ShapeSet<ShapeKey>,
    config: &ScenarioConfig,
    boundary: Vec<GeoPoint>,
) {
    shapes.draw(
        surface,
        ShapeKey::Prediction,
        &ShapeGeometry::Polygon(boundary),
        &prediction_style(),
    );
    if !config.heat_advisory.is_empty() {
        shapes.draw(
            surface,
            ShapeKey::HeatAdvisory,
            &ShapeGeometry::Polygon(config.heat_advisory.clone()),
            &heat_advisory_style(),
        );
    }
    if !config.code_red_zone.is_empty() {
        shapes.draw(
            surface,
            ShapeKey::CodeRed,
            &ShapeGeometry::Polygon(config.code_red_zone.clone()),
            &code_red_style(),
        );
    }
    shapes.draw(
        surface,
        ShapeKey::SafeRoute,
        &ShapeGeometry::Polyline(config.safe_route.clone()),
        &safe_route_style(),
    );
    shapes.draw(
        surface,
        ShapeKey::SafeZone,
        &ShapeGeometry::Circle {
            center: config.shelter,
            radius_m: SAFE_ZONE_RADIUS_MIN_M,
        },
        &safe_zone_style(),
    );
}
