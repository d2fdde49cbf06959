//! MarkerReconciler: keeps surface markers in step with simulated state.
//!
//! Each reconciler exclusively owns an id → handle map. `reconcile` is the
//! only way markers are created, moved, restyled, or removed:
//! - a known id is updated in place, and only for attributes that changed;
//! - an unknown id gets a new handle;
//! - a handle whose id is missing from the incoming set is removed.
//!
//! Reconciling the same set twice performs no surface calls at all.
//!
//! [`ShapeSet`] does the same bookkeeping for drawn shapes (polygons,
//! circles, polylines), which are addressed by key rather than diffed.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use firewiser_core::render::{
    IconDescriptor, MarkerHandle, RenderSurface, ShapeGeometry, ShapeHandle, ShapeStyle,
};
use firewiser_core::types::GeoPoint;

/// Desired state of one marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpec<K> {
    pub key: K,
    pub position: GeoPoint,
    pub icon: IconDescriptor,
    pub z_order: i32,
}

#[derive(Debug, Clone, Copy)]
struct MarkerEntry {
    handle: MarkerHandle,
    position: GeoPoint,
    icon: IconDescriptor,
}

/// Surface calls made by one `reconcile`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileStats {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.removed == 0
    }
}

#[derive(Debug)]
pub struct MarkerReconciler<K> {
    markers: HashMap<K, MarkerEntry>,
}

impl<K> Default for MarkerReconciler<K> {
    fn default() -> Self {
        Self {
            markers: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> MarkerReconciler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the surface show exactly `incoming`.
    pub fn reconcile<S, I>(&mut self, surface: &mut S, incoming: I) -> ReconcileStats
    where
        S: RenderSurface + ?Sized,
        I: IntoIterator<Item = MarkerSpec<K>>,
    {
        let mut stats = ReconcileStats::default();
        let mut seen: HashSet<K> = HashSet::new();

        for spec in incoming {
            if !seen.insert(spec.key) {
                continue;
            }
            match self.markers.get_mut(&spec.key) {
                Some(entry) => {
                    let moved = (entry.position != spec.position).then_some(spec.position);
                    let restyled = (entry.icon != spec.icon).then_some(&spec.icon);
                    if moved.is_some() || restyled.is_some() {
                        surface.update_marker(entry.handle, moved, restyled);
                        entry.position = spec.position;
                        entry.icon = spec.icon;
                        stats.updated += 1;
                    }
                }
                None => {
                    let handle = surface.create_marker(spec.position, &spec.icon, spec.z_order);
                    self.markers.insert(
                        spec.key,
                        MarkerEntry {
                            handle,
                            position: spec.position,
                            icon: spec.icon,
                        },
                    );
                    stats.created += 1;
                }
            }
        }

        if seen.len() < self.markers.len() {
            self.markers.retain(|key, entry| {
                if seen.contains(key) {
                    true
                } else {
                    surface.remove_marker(entry.handle);
                    stats.removed += 1;
                    false
                }
            });
        }

        stats
    }

    /// Apply `icon` to every mapped marker that doesn't already show it.
    /// Returns the number of markers updated.
    pub fn restyle_all<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        icon: IconDescriptor,
    ) -> usize {
        let mut updated = 0;
        for entry in self.markers.values_mut() {
            if entry.icon != icon {
                surface.update_marker(entry.handle, None, Some(&icon));
                entry.icon = icon;
                updated += 1;
            }
        }
        updated
    }

    /// Remove every marker from the surface.
    pub fn clear<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let removed = self.markers.len();
        for (_, entry) in self.markers.drain() {
            surface.remove_marker(entry.handle);
        }
        removed
    }

    pub fn handle(&self, key: &K) -> Option<MarkerHandle> {
        self.markers.get(key).map(|entry| entry.handle)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Keyed set of drawn shapes.
#[derive(Debug)]
pub struct ShapeSet<K> {
    shapes: HashMap<K, ShapeHandle>,
}

impl<K> Default for ShapeSet<K> {
    fn default() -> Self {
        Self {
            shapes: HashMap::new(),
        }
    }
}

impl<K: Copy + Eq + Hash> ShapeSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a shape under `key`, replacing any shape already drawn there.
    pub fn draw<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        key: K,
        geometry: &ShapeGeometry,
        style: &ShapeStyle,
    ) -> ShapeHandle {
        if let Some(old) = self.shapes.remove(&key) {
            surface.remove_shape(old);
        }
        let handle = surface.draw_shape(geometry, style);
        self.shapes.insert(key, handle);
        handle
    }

    /// Apply a partial style. Returns false if nothing is drawn under `key`.
    pub fn restyle<S: RenderSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        key: K,
        patch: &ShapeStyle,
    ) -> bool {
        match self.shapes.get(&key) {
            Some(handle) => {
                surface.set_shape_style(*handle, patch);
                true
            }
            None => false,
        }
    }

    pub fn remove<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, key: K) -> bool {
        match self.shapes.remove(&key) {
            Some(handle) => {
                surface.remove_shape(handle);
                true
            }
            None => false,
        }
    }

    pub fn clear<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) -> usize {
        let removed = self.shapes.len();
        for (_, handle) in self.shapes.drain() {
            surface.remove_shape(handle);
        }
        removed
    }

    pub fn contains(&self, key: K) -> bool {
        self.shapes.contains_key(&key)
    }

    pub fn handle(&self, key: K) -> Option<ShapeHandle> {
        self.shapes.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}
