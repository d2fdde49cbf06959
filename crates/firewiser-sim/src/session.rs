//! Map session: the core of the incident map.
//!
//! `MapSession` owns the entity store, the animation scheduler, the dispatch
//! controller and every reconciler, processes operator commands, and produces
//! `SessionSnapshot`s. It is driven entirely by `advance(now_ms)` calls from
//! the embedding frame loop, so it is headless and deterministic to test.
//!
//! Lifetime: `start` draws the scene and registers the frame, flicker and
//! pulse loops. `teardown` (or dropping the session) cancels every loop and
//! timer first, then detaches all rendering resources. Asynchronous results
//! carry a [`SessionTicket`] and are discarded once the session has been torn
//! down or its population replaced.

use std::collections::{BTreeMap, VecDeque};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use firewiser_core::commands::OperatorCommand;
use firewiser_core::config::{DispatchConfig, EffectsConfig, RevealSpec, ScenarioConfig};
use firewiser_core::constants::*;
use firewiser_core::enums::{EvacueeStatus, RevealKind};
use firewiser_core::events::SimEvent;
use firewiser_core::render::{IconDescriptor, RenderSurface, ShapeGeometry, ShapeStyle};
use firewiser_core::state::{DropZoneRequest, SessionSnapshot};
use firewiser_core::types::{AircraftId, EntityId, FrameClock, GeoPoint, SessionTicket};

use crate::dispatch::{DispatchController, DispatchError, MissionOutcome};
use crate::effects::{FlameFlicker, PulseTiming, RevealAnimation, RevealFrame};
use crate::reconcile::{MarkerReconciler, MarkerSpec, ShapeSet};
use crate::scenery::{self, Landmark, ShapeKey};
use crate::scheduler::{AnimationScheduler, TaskId};
use crate::store::EntityStore;

/// Everything a session is configured with at construction.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub scenario: ScenarioConfig,
    pub effects: EffectsConfig,
    pub dispatch: DispatchConfig,
}

impl SessionConfig {
    pub fn new(scenario: ScenarioConfig) -> Self {
        Self {
            scenario,
            ..Default::default()
        }
    }
}

/// Loops registered with the session scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionTask {
    Frame,
    Flicker,
    Pulse,
    Reveal(RevealKind),
}

pub struct MapSession<S: RenderSurface> {
    config: SessionConfig,
    surface: S,
    store: EntityStore,
    scheduler: AnimationScheduler<SessionTask>,
    dispatch: DispatchController,

    evacuee_markers: MarkerReconciler<EntityId>,
    aircraft_markers: MarkerReconciler<AircraftId>,
    flame_markers: MarkerReconciler<usize>,
    landmarks: MarkerReconciler<Landmark>,
    shapes: ShapeSet<ShapeKey>,

    flicker: FlameFlicker,
    pulse: PulseTiming,
    reveals: BTreeMap<RevealKind, (TaskId, RevealAnimation)>,
    rng: ChaCha8Rng,

    clock: FrameClock,
    started_ms: f64,
    last_frame_ms: f64,
    generation: u64,
    live: bool,
    drop_zone: Option<GeoPoint>,
    command_queue: VecDeque<OperatorCommand>,
    events: Vec<SimEvent>,
}

impl<S: RenderSurface> MapSession<S> {
    /// Build the scenario on `surface` and start the animation loops.
    pub fn start(config: SessionConfig, mut surface: S, now_ms: f64) -> Self {
        let scenario = &config.scenario;
        let mut store = EntityStore::new();
        store.populate(scenario, &mut ChaCha8Rng::seed_from_u64(scenario.seed));
        store.spawn_fleet(&scenario.fleet);

        let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed.wrapping_add(1));
        let mut shapes = ShapeSet::new();
        let boundary = scenery::prediction_boundary(&scenario.prediction, &mut rng);
        scenery::draw(&mut surface, &mut shapes, scenario, boundary);
        if !scenario.fit_points.is_empty() {
            surface.fit_viewport(&scenario.fit_points, VIEWPORT_PADDING_PX);
        }

        let mut scheduler = AnimationScheduler::new();
        scheduler.start_loop(SessionTask::Frame);
        scheduler.start_loop(SessionTask::Flicker);
        scheduler.start_loop(SessionTask::Pulse);

        let dispatch = DispatchController::new(config.dispatch, &scenario.fleet);
        let flicker = FlameFlicker::new(config.effects.flicker_interval_ms, now_ms);
        let pulse = PulseTiming {
            started_ms: now_ms,
            prediction_period_ms: config.effects.prediction_period_ms,
            safe_zone_period_ms: config.effects.safe_zone_period_ms,
        };

        let mut session = Self {
            config,
            surface,
            store,
            scheduler,
            dispatch,
            evacuee_markers: MarkerReconciler::new(),
            aircraft_markers: MarkerReconciler::new(),
            flame_markers: MarkerReconciler::new(),
            landmarks: MarkerReconciler::new(),
            shapes,
            flicker,
            pulse,
            reveals: BTreeMap::new(),
            rng,
            clock: FrameClock::default(),
            started_ms: now_ms,
            last_frame_ms: now_ms,
            generation: 0,
            live: true,
            drop_zone: None,
            command_queue: VecDeque::new(),
            events: Vec::new(),
        };

        session.sync_flames();
        session.sync_landmarks();
        session.sync_entities();

        log::info!(
            "session started: {} evacuees, {} aircraft",
            session.store.evacuee_count(),
            session.store.aircraft_count()
        );
        session
    }

    /// Queue an operator command for processing at the next `advance`.
    pub fn queue_command(&mut self, command: OperatorCommand) {
        if !self.live {
            log::debug!("command {command:?} ignored: session torn down");
            return;
        }
        self.command_queue.push_back(command);
    }

    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = OperatorCommand>) {
        for command in commands {
            self.queue_command(command);
        }
    }

    /// Run one frame at wall-clock `now_ms` and return the resulting snapshot.
    ///
    /// Entity speeds are per nominal frame, so the frame advance is the
    /// elapsed time since the previous frame in nominal frames, clamped to
    /// `[0, MAX_FRAME_ADVANCE]`. Queued commands run after the frame tick.
    pub fn advance(&mut self, now_ms: f64) -> SessionSnapshot {
        if !self.live {
            return self.snapshot();
        }

        let frame_ms = self.config.dispatch.frame_ms;
        let advance = ((now_ms - self.last_frame_ms) / frame_ms).clamp(0.0, MAX_FRAME_ADVANCE);
        self.last_frame_ms = self.last_frame_ms.max(now_ms);

        for due in self.scheduler.due(now_ms) {
            match due.payload {
                SessionTask::Frame => {
                    self.store.tick(advance);
                    self.sync_entities();
                }
                SessionTask::Flicker => {
                    if let Some(icon) = self.flicker.step(now_ms, &mut self.rng) {
                        self.flame_markers.restyle_all(&mut self.surface, icon);
                    }
                }
                SessionTask::Pulse => self.run_pulse(now_ms),
                SessionTask::Reveal(kind) => self.run_reveal(kind, due.id, now_ms),
            }
        }

        // After the tick, so a leg assigned this frame starts moving next frame.
        self.process_commands(now_ms);

        for outcome in self.dispatch.fire_due(&mut self.store, now_ms) {
            self.handle_mission_outcome(outcome, now_ms);
        }

        self.clock.advance(now_ms - self.started_ms);
        self.snapshot()
    }

    /// Build a snapshot, draining pending events.
    fn snapshot(&mut self) -> SessionSnapshot {
        SessionSnapshot {
            clock: self.clock,
            live: self.live,
            evacuees: self.store.evacuees(),
            aircraft: self.store.fleet(),
            triage: self.store.triage(),
            drop_zone: self.drop_zone,
            events: std::mem::take(&mut self.events),
        }
    }

    fn process_commands(&mut self, now_ms: f64) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command, now_ms);
        }
    }

    fn handle_command(&mut self, command: OperatorCommand, now_ms: f64) {
        match command {
            OperatorCommand::DispatchAircraft {
                aircraft_id,
                target,
            } => {
                let result = target
                    .or(self.drop_zone)
                    .ok_or(DispatchError::NoTarget)
                    .and_then(|target| {
                        self.dispatch
                            .dispatch(&mut self.store, aircraft_id, target, now_ms)
                    });
                match result {
                    Ok(order) => {
                        self.events.push(SimEvent::DispatchAccepted {
                            aircraft_id,
                            target: order.target,
                            eta_ms: order.eta_ms,
                        });
                        self.start_reveal(RevealKind::Acknowledgement, order.origin, now_ms);
                    }
                    Err(err) => {
                        log::warn!("dispatch of aircraft {aircraft_id} rejected: {err}");
                        self.events.push(SimEvent::DispatchRejected {
                            aircraft_id,
                            reason: err.to_string(),
                        });
                    }
                }
            }
            OperatorCommand::ResetScenario { seed } => {
                let seed = seed.unwrap_or(self.config.scenario.seed);
                self.store
                    .populate(&self.config.scenario, &mut ChaCha8Rng::seed_from_u64(seed));
                // The drop zone was derived from the replaced population.
                self.generation += 1;
                if self.drop_zone.take().is_some() {
                    self.sync_landmarks();
                    self.events.push(SimEvent::TargetCleared);
                }
                self.sync_entities();
                log::info!("scenario reset with seed {seed}");
                self.events.push(SimEvent::ScenarioReset { seed });
            }
        }
    }

    fn handle_mission_outcome(&mut self, outcome: MissionOutcome, now_ms: f64) {
        match outcome {
            MissionOutcome::Dropped {
                aircraft_id,
                target,
            } => {
                self.events.push(SimEvent::PayloadDropped {
                    aircraft_id,
                    target,
                });
                self.start_reveal(RevealKind::Drop, target, now_ms);
                if self.drop_zone.take().is_some() {
                    self.sync_landmarks();
                    self.events.push(SimEvent::TargetCleared);
                }
            }
            MissionOutcome::ReturnLegIssued { aircraft_id, home } => {
                self.events
                    .push(SimEvent::ReturnLegIssued { aircraft_id, home });
            }
        }
    }

    // --- Rendering ---

    /// Reconcile evacuee and aircraft markers with the entity store.
    fn sync_entities(&mut self) {
        let evacuees = self.store.evacuees();
        self.evacuee_markers.reconcile(
            &mut self.surface,
            evacuees.iter().map(|e| MarkerSpec {
                key: e.id,
                position: e.position,
                icon: match e.status {
                    EvacueeStatus::EnRoute => IconDescriptor::EvacueeEnRoute {
                        primary: e.is_primary,
                    },
                    EvacueeStatus::Safe => IconDescriptor::EvacueeSafe,
                },
                z_order: Z_EVACUEE,
            }),
        );

        let fleet = self.store.fleet();
        self.aircraft_markers.reconcile(
            &mut self.surface,
            fleet.iter().map(|a| MarkerSpec {
                key: a.id,
                position: a.position,
                icon: IconDescriptor::Aircraft {
                    kind: a.kind,
                    heading_deg: a.heading_deg,
                },
                z_order: Z_AIRCRAFT,
            }),
        );
    }

    fn sync_flames(&mut self) {
        let icon = self.flicker.icon();
        self.flame_markers.reconcile(
            &mut self.surface,
            self.config
                .scenario
                .flame_locations
                .iter()
                .enumerate()
                .map(|(i, at)| MarkerSpec {
                    key: i,
                    position: *at,
                    icon,
                    z_order: Z_FLAME,
                }),
        );
    }

    fn sync_landmarks(&mut self) {
        let shelter = MarkerSpec {
            key: Landmark::Shelter,
            position: self.config.scenario.shelter,
            icon: IconDescriptor::Shelter,
            z_order: Z_SHELTER,
        };
        let drop_zone = self.drop_zone.map(|at| MarkerSpec {
            key: Landmark::DropZone,
            position: at,
            icon: IconDescriptor::DropZone,
            z_order: Z_DROP_ZONE,
        });
        self.landmarks
            .reconcile(&mut self.surface, std::iter::once(shelter).chain(drop_zone));
    }

    fn run_pulse(&mut self, now_ms: f64) {
        let frame = self.pulse.frame(now_ms);
        self.shapes.restyle(
            &mut self.surface,
            ShapeKey::Prediction,
            &ShapeStyle {
                fill_opacity: Some(frame.prediction_opacity),
                ..Default::default()
            },
        );
        self.shapes.restyle(
            &mut self.surface,
            ShapeKey::SafeZone,
            &ShapeStyle {
                radius_m: Some(frame.safe_zone_radius_m),
                fill_opacity: Some(frame.safe_zone_fill),
                ..Default::default()
            },
        );
    }

    fn reveal_spec(&self, kind: RevealKind) -> RevealSpec {
        match kind {
            RevealKind::Drop => self.config.effects.drop,
            RevealKind::Acknowledgement => self.config.effects.acknowledgement,
        }
    }

    /// Start a reveal at `center`, replacing a running one of the same kind.
    fn start_reveal(&mut self, kind: RevealKind, center: GeoPoint, now_ms: f64) {
        if let Some((task, _)) = self.reveals.remove(&kind) {
            self.scheduler.cancel(task);
        }
        let spec = self.reveal_spec(kind);
        self.shapes.draw(
            &mut self.surface,
            ShapeKey::Reveal(kind),
            &ShapeGeometry::Circle {
                center,
                radius_m: 0.0,
            },
            &ShapeStyle {
                stroke_color: Some(spec.stroke_color),
                stroke_opacity: Some(spec.stroke_opacity),
                stroke_weight: Some(2.0),
                fill_color: Some(spec.fill_color),
                fill_opacity: Some(spec.fill_opacity),
                radius_m: Some(0.0),
                z_order: Some(spec.z_order),
            },
        );
        let task = self.scheduler.start_loop(SessionTask::Reveal(kind));
        self.reveals
            .insert(kind, (task, RevealAnimation::new(kind, center, spec, now_ms)));
        self.events.push(SimEvent::RevealStarted { kind, at: center });
    }

    fn run_reveal(&mut self, kind: RevealKind, task: TaskId, now_ms: f64) {
        let Some((current, animation)) = self.reveals.get(&kind).copied() else {
            self.scheduler.cancel(task);
            return;
        };
        if current != task {
            self.scheduler.cancel(task);
            return;
        }
        match animation.frame(now_ms) {
            RevealFrame::Draw {
                radius_m,
                fill_opacity,
                stroke_opacity,
            } => {
                self.shapes.restyle(
                    &mut self.surface,
                    ShapeKey::Reveal(kind),
                    &ShapeStyle {
                        radius_m: Some(radius_m),
                        fill_opacity: Some(fill_opacity),
                        stroke_opacity: Some(stroke_opacity),
                        ..Default::default()
                    },
                );
            }
            RevealFrame::Finished => {
                self.scheduler.cancel(task);
                self.reveals.remove(&kind);
                self.shapes.remove(&mut self.surface, ShapeKey::Reveal(kind));
            }
        }
    }

    // --- Asynchronous drop-zone computation ---

    /// Liveness ticket for results computed off the frame loop.
    pub fn ticket(&self) -> SessionTicket {
        SessionTicket {
            generation: self.generation,
        }
    }

    /// Everything needed to compute a drop zone off the frame loop.
    pub fn drop_zone_request(&self) -> DropZoneRequest {
        DropZoneRequest {
            ticket: self.ticket(),
            epicenter: self.config.scenario.fire_center,
            bounds: self.config.scenario.evacuation_zone,
            fallback_population: self.store.en_route_population(),
        }
    }

    /// Apply an asynchronously computed drop zone. Results whose ticket is
    /// stale are dropped. Returns whether the result was applied.
    pub fn apply_drop_zone(&mut self, ticket: SessionTicket, zone: Option<GeoPoint>) -> bool {
        if !self.live || ticket != self.ticket() {
            log::debug!(
                "stale drop zone dropped (generation {} vs {})",
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.drop_zone = zone;
        self.sync_landmarks();
        match zone {
            Some(at) => log::info!("drop zone set at ({:.5}, {:.5})", at.lat, at.lng),
            None => log::warn!("no drop zone could be computed"),
        }
        self.events.push(SimEvent::DropZoneUpdated { zone });
        true
    }

    // --- Teardown ---

    /// Cancel every loop and timer, then release every rendering resource.
    /// Idempotent.
    pub fn teardown(&mut self) {
        if !self.live {
            return;
        }
        self.live = false;
        self.generation += 1;

        let loops = self.scheduler.cancel_all();
        let timers = self.dispatch.abandon_all();
        self.reveals.clear();
        self.command_queue.clear();

        self.evacuee_markers.clear(&mut self.surface);
        self.aircraft_markers.clear(&mut self.surface);
        self.flame_markers.clear(&mut self.surface);
        self.landmarks.clear(&mut self.surface);
        self.shapes.clear(&mut self.surface);

        log::info!("session torn down ({loops} loops, {timers} timers cancelled)");
    }

    // --- Accessors ---

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn drop_zone(&self) -> Option<GeoPoint> {
        self.drop_zone
    }

    pub fn clock(&self) -> FrameClock {
        self.clock
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Number of running loops (frame, cosmetics, reveals).
    pub fn active_loops(&self) -> usize {
        self.scheduler.len()
    }

    pub fn pending_mission_timers(&self) -> usize {
        self.dispatch.pending_timers()
    }

    pub fn evacuee_marker_count(&self) -> usize {
        self.evacuee_markers.len()
    }

    pub fn aircraft_marker_count(&self) -> usize {
        self.aircraft_markers.len()
    }

    /// Whether a reveal of `kind` is currently animating.
    pub fn reveal_active(&self, kind: RevealKind) -> bool {
        self.reveals.contains_key(&kind) && self.shapes.contains(ShapeKey::Reveal(kind))
    }
}

impl<S: RenderSurface> Drop for MapSession<S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
