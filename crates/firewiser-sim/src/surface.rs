//! In-memory rendering surface.
//!
//! `JournalSurface` retains the scene the way a map would and counts every
//! call, which makes it the surface of choice for the headless app and for
//! asserting reconciliation behaviour in tests.

use std::collections::BTreeMap;

use serde::Serialize;

use firewiser_core::render::{
    IconDescriptor, MarkerHandle, RenderSurface, ShapeGeometry, ShapeHandle, ShapeStyle,
};
use firewiser_core::types::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct RetainedMarker {
    pub position: GeoPoint,
    pub icon: IconDescriptor,
    pub z_order: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetainedShape {
    pub geometry: ShapeGeometry,
    pub style: ShapeStyle,
}

/// Call counters, by operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SurfaceCounters {
    pub markers_created: u64,
    pub markers_updated: u64,
    pub markers_removed: u64,
    pub shapes_drawn: u64,
    pub shapes_restyled: u64,
    pub shapes_removed: u64,
    pub viewport_fits: u64,
    /// Calls that referenced a handle the surface no longer holds.
    pub dangling_calls: u64,
}

impl SurfaceCounters {
    /// Total number of marker create/update/remove calls.
    pub fn marker_calls(&self) -> u64 {
        self.markers_created + self.markers_updated + self.markers_removed
    }
}

#[derive(Debug, Default)]
pub struct JournalSurface {
    markers: BTreeMap<MarkerHandle, RetainedMarker>,
    shapes: BTreeMap<ShapeHandle, RetainedShape>,
    next_handle: u64,
    counters: SurfaceCounters,
    viewport: Vec<GeoPoint>,
}

impl JournalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn counters(&self) -> SurfaceCounters {
        self.counters
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&RetainedMarker> {
        self.markers.get(&handle)
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&RetainedShape> {
        self.shapes.get(&handle)
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerHandle, &RetainedMarker)> {
        self.markers.iter()
    }

    pub fn shapes(&self) -> impl Iterator<Item = (&ShapeHandle, &RetainedShape)> {
        self.shapes.iter()
    }

    /// Points the viewport was last fitted to.
    pub fn viewport(&self) -> &[GeoPoint] {
        &self.viewport
    }
}

impl RenderSurface for JournalSurface {
    fn create_marker(
        &mut self,
        position: GeoPoint,
        icon: &IconDescriptor,
        z_order: i32,
    ) -> MarkerHandle {
        let handle = MarkerHandle(self.next());
        log::trace!("create marker {handle:?} at ({:.5}, {:.5})", position.lat, position.lng);
        self.markers.insert(
            handle,
            RetainedMarker {
                position,
                icon: *icon,
                z_order,
            },
        );
        self.counters.markers_created += 1;
        handle
    }

    fn update_marker(
        &mut self,
        handle: MarkerHandle,
        position: Option<GeoPoint>,
        icon: Option<&IconDescriptor>,
    ) {
        let Some(marker) = self.markers.get_mut(&handle) else {
            log::trace!("update of unknown marker {handle:?}");
            self.counters.dangling_calls += 1;
            return;
        };
        if let Some(position) = position {
            marker.position = position;
        }
        if let Some(icon) = icon {
            marker.icon = *icon;
        }
        self.counters.markers_updated += 1;
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        log::trace!("remove marker {handle:?}");
        if self.markers.remove(&handle).is_some() {
            self.counters.markers_removed += 1;
        } else {
            self.counters.dangling_calls += 1;
        }
    }

    fn draw_shape(&mut self, geometry: &ShapeGeometry, style: &ShapeStyle) -> ShapeHandle {
        let handle = ShapeHandle(self.next());
        log::trace!("draw {:?} shape {handle:?}", geometry.kind());
        self.shapes.insert(
            handle,
            RetainedShape {
                geometry: geometry.clone(),
                style: *style,
            },
        );
        self.counters.shapes_drawn += 1;
        handle
    }

    fn set_shape_style(&mut self, handle: ShapeHandle, style: &ShapeStyle) {
        let Some(shape) = self.shapes.get_mut(&handle) else {
            self.counters.dangling_calls += 1;
            return;
        };
        shape.style = shape.style.merged(style);
        if let (ShapeGeometry::Circle { radius_m, .. }, Some(r)) =
            (&mut shape.geometry, style.radius_m)
        {
            *radius_m = r;
        }
        self.counters.shapes_restyled += 1;
    }

    fn remove_shape(&mut self, handle: ShapeHandle) {
        log::trace!("remove shape {handle:?}");
        if self.shapes.remove(&handle).is_some() {
            self.counters.shapes_removed += 1;
        } else {
            self.counters.dangling_calls += 1;
        }
    }

    fn fit_viewport(&mut self, points: &[GeoPoint], padding_px: u32) {
        log::trace!("fit viewport to {} points (padding {padding_px}px)", points.len());
        self.viewport = points.to_vec();
        self.counters.viewport_fits += 1;
    }
}
