//! Session loop thread: runs the map session at the nominal frame rate.
//!
//! The session is created inside this thread and never leaves it. Commands
//! arrive via an `mpsc` channel; drop-zone requests go out on a tokio channel
//! to the async resolver, whose results come back as `LoopCommand`s. The
//! latest snapshot is stored in shared state for polling.

use std::ops::ControlFlow;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

use firewiser_core::constants::NOMINAL_FRAME_RATE;
use firewiser_core::events::SimEvent;
use firewiser_core::state::{DropZoneRequest, SessionSnapshot, TriageCounts};
use firewiser_sim::surface::SurfaceCounters;
use firewiser_sim::{JournalSurface, MapSession, SessionConfig};

use crate::state::LoopCommand;

/// Nominal duration of one frame.
pub const FRAME_DURATION: Duration = Duration::from_nanos(1_000_000_000 / NOMINAL_FRAME_RATE as u64);

/// What a finished loop reports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoopSummary {
    pub frames: u64,
    pub dispatches_accepted: u32,
    pub dispatches_rejected: u32,
    pub payloads_dropped: u32,
    pub triage: TriageCounts,
    pub surface: SurfaceCounters,
    /// Markers still on the surface after teardown. Always 0.
    pub markers_after_teardown: usize,
}

/// The session plus the bookkeeping the loop does around it.
pub struct SessionLoop {
    session: MapSession<JournalSurface>,
    drop_zone_tx: UnboundedSender<DropZoneRequest>,
    summary: LoopSummary,
}

impl SessionLoop {
    /// Start the session and request its first drop zone.
    pub fn start(
        config: SessionConfig,
        drop_zone_tx: UnboundedSender<DropZoneRequest>,
        now_ms: f64,
    ) -> Self {
        let session = MapSession::start(config, JournalSurface::new(), now_ms);
        let driver = Self {
            session,
            drop_zone_tx,
            summary: LoopSummary::default(),
        };
        driver.request_drop_zone();
        driver
    }

    fn request_drop_zone(&self) {
        if self
            .drop_zone_tx
            .send(self.session.drop_zone_request())
            .is_err()
        {
            log::warn!("Drop-zone resolver is gone, no drop zone will be computed");
        }
    }

    /// Apply one incoming command. `Break` means stop the loop.
    pub fn handle(&mut self, command: LoopCommand) -> ControlFlow<()> {
        match command {
            LoopCommand::Operator(cmd) => self.session.queue_command(cmd),
            LoopCommand::DropZoneResolved(resolved) => {
                if !self.session.apply_drop_zone(resolved.ticket, resolved.zone) {
                    log::info!("Discarded drop zone for a previous scenario");
                }
            }
            LoopCommand::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Run one frame at `now_ms` since the loop started.
    pub fn frame(&mut self, now_ms: f64) -> SessionSnapshot {
        let snapshot = self.session.advance(now_ms);
        self.summary.frames += 1;
        for event in &snapshot.events {
            self.observe(event);
        }
        snapshot
    }

    fn observe(&mut self, event: &SimEvent) {
        match event {
            SimEvent::DispatchAccepted {
                aircraft_id,
                eta_ms,
                ..
            } => {
                self.summary.dispatches_accepted += 1;
                log::info!("Aircraft {aircraft_id} dispatched, ETA {:.1}s", eta_ms / 1000.0);
            }
            SimEvent::DispatchRejected {
                aircraft_id,
                reason,
            } => {
                self.summary.dispatches_rejected += 1;
                log::info!("Aircraft {aircraft_id} not dispatched: {reason}");
            }
            SimEvent::PayloadDropped { aircraft_id, .. } => {
                self.summary.payloads_dropped += 1;
                log::info!("Aircraft {aircraft_id} dropped its payload");
            }
            SimEvent::ScenarioReset { seed } => {
                log::info!("Scenario reset with seed {seed}");
                self.request_drop_zone();
            }
            other => log::debug!("{other:?}"),
        }
    }

    pub fn session(&self) -> &MapSession<JournalSurface> {
        &self.session
    }

    /// Tear the session down and report.
    pub fn finish(mut self) -> LoopSummary {
        self.summary.triage = self.session.store().triage();
        self.session.teardown();
        self.summary.surface = self.session.surface().counters();
        self.summary.markers_after_teardown = self.session.surface().marker_count();
        self.summary
    }
}

/// Spawns the session loop in a new thread.
///
/// Returns the command sender and the handle yielding the final summary.
pub fn spawn_session_loop(
    config: SessionConfig,
    latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
    drop_zone_tx: UnboundedSender<DropZoneRequest>,
) -> (mpsc::Sender<LoopCommand>, JoinHandle<LoopSummary>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    let handle = std::thread::Builder::new()
        .name("firewiser-session-loop".into())
        .spawn(move || run_session_loop(config, cmd_rx, drop_zone_tx, &latest_snapshot))
        .expect("Failed to spawn session loop thread");

    (cmd_tx, handle)
}

/// Runs until Shutdown or channel disconnect.
fn run_session_loop(
    config: SessionConfig,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    drop_zone_tx: UnboundedSender<DropZoneRequest>,
    latest_snapshot: &Mutex<Option<SessionSnapshot>>,
) -> LoopSummary {
    let started = Instant::now();
    let mut driver = SessionLoop::start(config, drop_zone_tx, 0.0);
    let mut next_frame_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => {
                    if driver.handle(cmd).is_break() {
                        return driver.finish();
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return driver.finish(),
            }
        }

        // 2. Advance to the current wall-clock time
        let now_ms = started.elapsed().as_secs_f64() * 1000.0;
        let snapshot = driver.frame(now_ms);

        // 3. Store latest snapshot for polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next frame
        next_frame_time += FRAME_DURATION;
        let now = Instant::now();
        if next_frame_time > now {
            std::thread::sleep(next_frame_time - now);
        } else if now - next_frame_time > FRAME_DURATION * 2 {
            // Too far behind; the session clamps the advance anyway
            next_frame_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firewiser_core::commands::OperatorCommand;
    use firewiser_core::config::ScenarioConfig;
    use firewiser_core::constants::NOMINAL_FRAME_MS;
    use firewiser_core::enums::MissionStatus;
    use firewiser_core::types::GeoPoint;
    use firewiser_services::ResolvedDropZone;
    use tokio::sync::mpsc::unbounded_channel;

    const TANKER: u32 = 101;

    fn start() -> (
        SessionLoop,
        tokio::sync::mpsc::UnboundedReceiver<DropZoneRequest>,
    ) {
        let (tx, rx) = unbounded_channel();
        let driver = SessionLoop::start(SessionConfig::new(ScenarioConfig::default()), tx, 0.0);
        (driver, rx)
    }

    fn run_frames(driver: &mut SessionLoop, now: &mut f64, frames: u32) -> SessionSnapshot {
        let mut snapshot = driver.frame(*now);
        for _ in 0..frames {
            *now += NOMINAL_FRAME_MS;
            snapshot = driver.frame(*now);
        }
        snapshot
    }

    #[test]
    fn test_commands_over_channel_reach_session() {
        let (mut driver, mut rx) = start();
        let first = rx.try_recv().unwrap();
        let (tx, cmd_rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Operator(OperatorCommand::ResetScenario {
            seed: Some(8),
        }))
        .unwrap();
        tx.send(LoopCommand::Operator(OperatorCommand::DispatchAircraft {
            aircraft_id: TANKER,
            target: None,
        }))
        .unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();
        tx.send(LoopCommand::Operator(OperatorCommand::DispatchAircraft {
            aircraft_id: TANKER,
            target: Some(GeoPoint::new(34.02, -118.67)),
        }))
        .unwrap();

        let mut handled = 0;
        let mut stopped = false;
        for cmd in cmd_rx.try_iter() {
            handled += 1;
            if driver.handle(cmd).is_break() {
                stopped = true;
                break;
            }
        }
        assert!(stopped);
        assert_eq!(handled, 3);

        let mut now = 0.0;
        run_frames(&mut driver, &mut now, 1);
        // The reset asked for a fresh zone, and the dispatch found none.
        assert_ne!(rx.try_recv().unwrap().ticket, first.ticket);
        let summary = driver.finish();
        assert_eq!(summary.dispatches_rejected, 1);
        assert_eq!(summary.dispatches_accepted, 0);
    }

    #[test]
    fn test_start_requests_drop_zone() {
        let (driver, mut rx) = start();
        let request = rx.try_recv().unwrap();
        assert_eq!(request.ticket, driver.session().ticket());
        assert_eq!(request.fallback_population.len(), 57);
    }

    #[test]
    fn test_resolved_zone_then_dispatch() {
        let (mut driver, mut rx) = start();
        let request = rx.try_recv().unwrap();
        let zone = GeoPoint::new(34.02, -118.67);

        let flow = driver.handle(LoopCommand::DropZoneResolved(ResolvedDropZone {
            ticket: request.ticket,
            zone: Some(zone),
            used_fallback: false,
        }));
        assert!(flow.is_continue());
        assert_eq!(driver.session().drop_zone(), Some(zone));

        driver.handle(LoopCommand::Operator(OperatorCommand::DispatchAircraft {
            aircraft_id: TANKER,
            target: None,
        }));
        let mut now = 0.0;
        // Long enough for the flight, the grace delay and the return order.
        let snapshot = run_frames(&mut driver, &mut now, 60 * 60);

        let tanker = snapshot
            .aircraft
            .iter()
            .find(|a| a.id == TANKER)
            .unwrap();
        assert_eq!(tanker.mission_status, MissionStatus::Returning);

        let summary = driver.finish();
        assert_eq!(summary.dispatches_accepted, 1);
        assert_eq!(summary.payloads_dropped, 1);
        assert_eq!(summary.markers_after_teardown, 0);
    }

    #[test]
    fn test_reset_discards_old_zone_and_requests_again() {
        let (mut driver, mut rx) = start();
        let stale = rx.try_recv().unwrap();

        driver.handle(LoopCommand::Operator(OperatorCommand::ResetScenario {
            seed: Some(5),
        }));
        let mut now = 0.0;
        run_frames(&mut driver, &mut now, 1);
        let fresh = rx.try_recv().unwrap();
        assert_ne!(fresh.ticket, stale.ticket);

        driver.handle(LoopCommand::DropZoneResolved(ResolvedDropZone {
            ticket: stale.ticket,
            zone: Some(GeoPoint::new(34.0, -118.7)),
            used_fallback: true,
        }));
        assert_eq!(driver.session().drop_zone(), None);
    }

    #[test]
    fn test_dispatch_without_zone_is_rejected() {
        let (mut driver, _rx) = start();
        driver.handle(LoopCommand::Operator(OperatorCommand::DispatchAircraft {
            aircraft_id: TANKER,
            target: None,
        }));
        let mut now = 0.0;
        run_frames(&mut driver, &mut now, 2);
        let summary = driver.finish();
        assert_eq!(summary.dispatches_rejected, 1);
        assert_eq!(summary.dispatches_accepted, 0);
    }

    #[test]
    fn test_shutdown_breaks() {
        let (mut driver, _rx) = start();
        assert!(driver.handle(LoopCommand::Shutdown).is_break());
    }

    #[test]
    fn test_spawned_loop_stops_on_shutdown() {
        let latest = Arc::new(Mutex::new(None));
        let (req_tx, _req_rx) = unbounded_channel();
        let (cmd_tx, handle) = spawn_session_loop(
            SessionConfig::new(ScenarioConfig::default()),
            Arc::clone(&latest),
            req_tx,
        );
        std::thread::sleep(Duration::from_millis(100));
        cmd_tx.send(LoopCommand::Shutdown).unwrap();

        let summary = handle.join().unwrap();
        assert!(summary.frames > 0);
        assert_eq!(summary.markers_after_teardown, 0);
        assert!(latest.lock().unwrap().is_some());
    }

    #[test]
    fn test_snapshot_serializes_for_polling() {
        let (mut driver, _rx) = start();
        let mut now = 0.0;
        let snapshot = run_frames(&mut driver, &mut now, 50);

        let json = serde_json::to_string(&snapshot).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["evacuees"].as_array().map(Vec::len), Some(57));
        assert!(value["aircraft"].is_array());
        assert!(value["drop_zone"].is_null());
    }

    #[test]
    fn test_frame_duration_constant() {
        let expected_nanos = 1_000_000_000u64 / 60;
        assert_eq!(FRAME_DURATION.as_nanos(), expected_nanos as u128);
    }
}
