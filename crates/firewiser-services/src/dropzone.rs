//! Asynchronous drop-zone resolution.
//!
//! Runs detached from the session: the result carries the request's ticket
//! and is applied with `MapSession::apply_drop_zone`, which discards it if
//! the session moved on in the meantime.

use std::time::Duration;

use firewiser_core::state::DropZoneRequest;
use firewiser_core::types::{GeoPoint, SessionTicket};
use firewiser_sim::dropzone;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::with_timeout;
use crate::population::PopulationSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedDropZone {
    pub ticket: SessionTicket,
    pub zone: Option<GeoPoint>,
    /// True when the request's own population was used.
    pub used_fallback: bool,
}

pub async fn resolve_drop_zone<P: PopulationSource>(
    source: &P,
    request: DropZoneRequest,
    timeout: Duration,
) -> ResolvedDropZone {
    let (zone, used_fallback) = match with_timeout(timeout, source.lookup(request.bounds)).await {
        Ok(population) if !population.is_empty() => {
            (dropzone::select(&population, request.epicenter), false)
        }
        Ok(_) => {
            log::warn!("Population lookup returned no samples, using session population");
            (dropzone::select(&request.fallback_population, request.epicenter), true)
        }
        Err(err) => {
            log::warn!("Population lookup failed, using session population: {err}");
            (dropzone::select(&request.fallback_population, request.epicenter), true)
        }
    };
    log::debug!("Resolved drop zone {zone:?} for {:?}", request.ticket);

    ResolvedDropZone {
        ticket: request.ticket,
        zone,
        used_fallback,
    }
}

/// Resolve requests as they arrive and hand each result to `deliver`.
///
/// Stops when the request channel closes or `deliver` returns false.
/// Independent of any briefing in flight, so it should be spawned before
/// awaiting one.
pub async fn run_drop_zone_resolver<P, F>(
    source: &P,
    mut requests: UnboundedReceiver<DropZoneRequest>,
    timeout: Duration,
    mut deliver: F,
) where
    P: PopulationSource,
    F: FnMut(ResolvedDropZone) -> bool,
{
    while let Some(request) = requests.recv().await {
        let resolved = resolve_drop_zone(source, request, timeout).await;
        if !deliver(resolved) {
            log::debug!("Drop-zone receiver gone, resolver stopping");
            break;
        }
    }
}
