//! Path interpolation: waypoint path + progress → current position.
//!
//! Pure functions only. Every moving entity (evacuee or aircraft) resolves
//! its position through [`position`] after each progress update.

use firewiser_core::types::GeoPoint;

/// Position along `path` at normalised `progress`.
///
/// - One waypoint: always that waypoint.
/// - Two waypoints: straight linear interpolation.
/// - More: `progress` is spread evenly over the `len - 1` segments, so
///   `progress = 1` lands exactly on the last waypoint.
///
/// `progress` is clamped to [0, 1]. Returns `None` for an empty path.
pub fn position(path: &[GeoPoint], progress: f64) -> Option<GeoPoint> {
    let progress = progress.clamp(0.0, 1.0);
    match path {
        [] => None,
        [only] => Some(*only),
        [from, to] => Some(from.lerp(to, progress)),
        _ => {
            let index = segment_index(path.len(), progress);
            let t = progress * (path.len() - 1) as f64;
            let fraction = t - index as f64;
            Some(path[index].lerp(&path[index + 1], fraction))
        }
    }
}

/// Index of the segment that contains `progress` on a path of `waypoints`
/// points. Always in `0..=waypoints - 2` (0 for degenerate paths).
pub fn segment_index(waypoints: usize, progress: f64) -> usize {
    let segments = waypoints.saturating_sub(1);
    if segments == 0 {
        return 0;
    }
    let t = progress.clamp(0.0, 1.0) * segments as f64;
    (t.floor() as usize).min(segments - 1)
}

/// Heading of a path's first leg (degrees, 0 = North, clockwise).
/// A single-waypoint path faces North.
pub fn leg_heading(path: &[GeoPoint]) -> f64 {
    match path {
        [from, to, ..] => from.heading_to(to),
        _ => 0.0,
    }
}
