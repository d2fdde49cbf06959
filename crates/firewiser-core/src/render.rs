//! Contract with the external rendering surface (the map).
//!
//! The simulation never talks to a concrete map SDK. It drives any type that
//! implements [`RenderSurface`], and only ever holds the opaque handles that
//! surface hands back.

use serde::{Deserialize, Serialize};

use crate::enums::{AircraftType, ShapeKind};
use crate::types::GeoPoint;

/// Opaque reference to a marker on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MarkerHandle(pub u64);

/// Opaque reference to a drawn shape on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeHandle(pub u64);

/// What a marker looks like. Closed set; surfaces map each variant to a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "icon")]
pub enum IconDescriptor {
    /// Pinging orange dot; the primary point is larger and amber.
    EvacueeEnRoute { primary: bool },
    /// Solid blue dot.
    EvacueeSafe,
    /// Airframe glyph rotated to `heading_deg` (0 = North, clockwise).
    Aircraft { kind: AircraftType, heading_deg: f64 },
    /// Flame glyph variant and size in px.
    Flame { variant: u8, size_px: f64 },
    Shelter,
    DropZone,
}

/// Geometry of a drawn shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Polygon(Vec<GeoPoint>),
    Circle { center: GeoPoint, radius_m: f64 },
    Polyline(Vec<GeoPoint>),
}

impl ShapeGeometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Polyline(_) => ShapeKind::Polyline,
        }
    }
}

/// Shape style. Every field is optional so the same type doubles as a
/// partial update for [`RenderSurface::set_shape_style`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShapeStyle {
    pub stroke_color: Option<&'static str>,
    pub stroke_opacity: Option<f64>,
    pub stroke_weight: Option<f64>,
    pub fill_color: Option<&'static str>,
    pub fill_opacity: Option<f64>,
    /// Circle radius in metres (circles only).
    pub radius_m: Option<f64>,
    pub z_order: Option<i32>,
}

impl ShapeStyle {
    /// Overlay the fields set in `patch` on top of `self`.
    pub fn merged(mut self, patch: &ShapeStyle) -> ShapeStyle {
        if patch.stroke_color.is_some() {
            self.stroke_color = patch.stroke_color;
        }
        if patch.stroke_opacity.is_some() {
            self.stroke_opacity = patch.stroke_opacity;
        }
        if patch.stroke_weight.is_some() {
            self.stroke_weight = patch.stroke_weight;
        }
        if patch.fill_color.is_some() {
            self.fill_color = patch.fill_color;
        }
        if patch.fill_opacity.is_some() {
            self.fill_opacity = patch.fill_opacity;
        }
        if patch.radius_m.is_some() {
            self.radius_m = patch.radius_m;
        }
        if patch.z_order.is_some() {
            self.z_order = patch.z_order;
        }
        self
    }
}

/// The rendering surface the simulation draws onto.
pub trait RenderSurface {
    fn create_marker(&mut self, position: GeoPoint, icon: &IconDescriptor, z_order: i32)
        -> MarkerHandle;

    /// Move and/or restyle a marker. `None` leaves that attribute untouched.
    fn update_marker(
        &mut self,
        handle: MarkerHandle,
        position: Option<GeoPoint>,
        icon: Option<&IconDescriptor>,
    );

    fn remove_marker(&mut self, handle: MarkerHandle);

    fn draw_shape(&mut self, geometry: &ShapeGeometry, style: &ShapeStyle) -> ShapeHandle;

    /// Apply a partial style to an existing shape.
    fn set_shape_style(&mut self, handle: ShapeHandle, style: &ShapeStyle);

    fn remove_shape(&mut self, handle: ShapeHandle);

    fn fit_viewport(&mut self, points: &[GeoPoint], padding_px: u32);
}
