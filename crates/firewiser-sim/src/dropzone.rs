//! DropZoneSelector: picks a response target from a population snapshot.
//!
//! The target is the centroid of the cluster of people nearest the risk
//! epicenter. Distances are planar in degrees.

use glam::DVec2;

use firewiser_core::constants::{CLUSTER_FRACTION, MIN_CLUSTER_SIZE};
use firewiser_core::types::{GeoPoint, PopulationSample};

/// Number of members averaged for a population of `population` points:
/// `max(5, ceil(0.2 * n))`, clipped to `n`.
pub fn cluster_size(population: usize) -> usize {
    let fraction = (CLUSTER_FRACTION * population as f64).ceil() as usize;
    fraction.max(MIN_CLUSTER_SIZE).min(population)
}

/// Indices of the cluster members, nearest first. Ties keep input order.
pub fn cluster(population: &[PopulationSample], epicenter: GeoPoint) -> Vec<usize> {
    let mut ranked: Vec<(f64, usize)> = population
        .iter()
        .enumerate()
        .map(|(i, sample)| (sample.position.planar_distance_to(&epicenter), i))
        .collect();
    // sort_by is stable.
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
        .into_iter()
        .take(cluster_size(population.len()))
        .map(|(_, i)| i)
        .collect()
}

/// Centroid of the cluster nearest `epicenter`, or `None` for an empty population.
pub fn select(population: &[PopulationSample], epicenter: GeoPoint) -> Option<GeoPoint> {
    let members = cluster(population, epicenter);
    if members.is_empty() {
        return None;
    }
    let sum: DVec2 = members.iter().map(|&i| population[i].position.to_vec()).sum();
    Some(GeoPoint::from_vec(sum / members.len() as f64))
}
