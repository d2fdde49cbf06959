//! DispatchController: timed mission lifecycle for commandable aircraft.
//!
//! idle (STANDBY / PATROLLING) → EN_ROUTE → drop → grace delay → RETURNING.
//!
//! Mission timers live in the controller's own scheduler, independent of the
//! frame loop. Each timer carries the mission id it was scheduled for, so a
//! timer that outlives its mission (abandoned or superseded) is a no-op.

use std::collections::HashMap;

use thiserror::Error;

use firewiser_core::config::{AircraftConfig, DispatchConfig};
use firewiser_core::enums::MissionStatus;
use firewiser_core::types::{AircraftId, GeoPoint};

use crate::scheduler::{AnimationScheduler, TaskId};
use crate::store::EntityStore;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("aircraft {0} is not in the fleet")]
    UnknownAircraft(AircraftId),
    #[error("aircraft {id} is already on a mission ({status:?})")]
    MissionInProgress {
        id: AircraftId,
        status: MissionStatus,
    },
    #[error("no target available")]
    NoTarget,
}

/// An accepted dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOrder {
    pub aircraft_id: AircraftId,
    pub mission: u64,
    /// Where the aircraft was when the order was accepted.
    pub origin: GeoPoint,
    pub target: GeoPoint,
    /// Time to target in nominal frames (`distance / dispatch_speed`).
    pub eta_frames: f64,
    pub eta_ms: f64,
}

/// Something a mission timer did when it fired.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionOutcome {
    Dropped {
        aircraft_id: AircraftId,
        target: GeoPoint,
    },
    ReturnLegIssued {
        aircraft_id: AircraftId,
        home: GeoPoint,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissionStep {
    Arrival,
    ReturnLeg,
}

#[derive(Debug, Clone, Copy)]
struct MissionTimer {
    aircraft_id: AircraftId,
    mission: u64,
    step: MissionStep,
}

#[derive(Debug, Clone, Copy)]
struct Mission {
    id: u64,
    target: GeoPoint,
    home: GeoPoint,
    timer: TaskId,
}

pub struct DispatchController {
    config: DispatchConfig,
    homes: HashMap<AircraftId, GeoPoint>,
    missions: HashMap<AircraftId, Mission>,
    timers: AnimationScheduler<MissionTimer>,
    next_mission: u64,
}

impl DispatchController {
    /// Home bases are the first waypoint of each configured path.
    pub fn new(config: DispatchConfig, fleet: &[AircraftConfig]) -> Self {
        let homes = fleet
            .iter()
            .filter_map(|aircraft| aircraft.path.first().map(|home| (aircraft.id, *home)))
            .collect();
        Self {
            config,
            homes,
            missions: HashMap::new(),
            timers: AnimationScheduler::new(),
            next_mission: 0,
        }
    }

    /// Whether `status`/`progress` allow a new dispatch. An aircraft parked
    /// at home after a completed return leg counts as idle.
    pub fn can_dispatch(status: MissionStatus, progress: f64) -> bool {
        status.is_idle() || (status == MissionStatus::Returning && progress >= 1.0)
    }

    /// Send an aircraft from its current position to `target`.
    ///
    /// The aircraft flies at the dispatch ground speed, so it reaches the
    /// target exactly when the arrival timer fires.
    pub fn dispatch(
        &mut self,
        store: &mut EntityStore,
        aircraft_id: AircraftId,
        target: GeoPoint,
        now_ms: f64,
    ) -> Result<DispatchOrder, DispatchError> {
        let aircraft = store
            .aircraft(aircraft_id)
            .ok_or(DispatchError::UnknownAircraft(aircraft_id))?;
        if self.missions.contains_key(&aircraft_id)
            || !Self::can_dispatch(aircraft.mission_status, aircraft.progress)
        {
            return Err(DispatchError::MissionInProgress {
                id: aircraft_id,
                status: aircraft.mission_status,
            });
        }

        let origin = aircraft.position;
        let distance = origin.planar_distance_to(&target);
        let (eta_frames, progress_rate) = if distance > 0.0 && self.config.dispatch_speed > 0.0 {
            let eta = distance / self.config.dispatch_speed;
            (eta, (1.0 / eta).min(1.0))
        } else {
            (0.0, 1.0)
        };
        let eta_ms = eta_frames * self.config.frame_ms;

        if !store.assign_path(
            aircraft_id,
            vec![origin, target],
            progress_rate,
            MissionStatus::EnRoute,
        ) {
            return Err(DispatchError::UnknownAircraft(aircraft_id));
        }

        let mission = self.next_mission;
        self.next_mission += 1;
        let timer = self.timers.schedule_once(
            now_ms + eta_ms,
            MissionTimer {
                aircraft_id,
                mission,
                step: MissionStep::Arrival,
            },
        );
        let home = self.homes.get(&aircraft_id).copied().unwrap_or(origin);
        self.missions.insert(
            aircraft_id,
            Mission {
                id: mission,
                target,
                home,
                timer,
            },
        );

        log::info!(
            "aircraft {aircraft_id} dispatched to ({:.5}, {:.5}), eta {eta_ms:.0} ms",
            target.lat,
            target.lng
        );

        Ok(DispatchOrder {
            aircraft_id,
            mission,
            origin,
            target,
            eta_frames,
            eta_ms,
        })
    }

    /// Run every mission timer due at `now_ms`.
    pub fn fire_due(&mut self, store: &mut EntityStore, now_ms: f64) -> Vec<MissionOutcome> {
        let mut outcomes = Vec::new();
        for due in self.timers.due(now_ms) {
            let timer = due.payload;
            let Some(mission) = self.missions.get(&timer.aircraft_id).copied() else {
                log::debug!("timer for abandoned mission {} ignored", timer.mission);
                continue;
            };
            if mission.id != timer.mission || mission.timer != due.id {
                log::debug!("stale timer for mission {} ignored", timer.mission);
                continue;
            }

            match timer.step {
                MissionStep::Arrival => {
                    // Movement is clamped per frame, so after a stall the
                    // aircraft may still be short of the target.
                    store.complete_leg(timer.aircraft_id);
                    log::info!("aircraft {} dropped payload", timer.aircraft_id);
                    outcomes.push(MissionOutcome::Dropped {
                        aircraft_id: timer.aircraft_id,
                        target: mission.target,
                    });
                    let next = self.timers.schedule_once(
                        now_ms + self.config.return_grace_ms,
                        MissionTimer {
                            step: MissionStep::ReturnLeg,
                            ..timer
                        },
                    );
                    if let Some(m) = self.missions.get_mut(&timer.aircraft_id) {
                        m.timer = next;
                    }
                }
                MissionStep::ReturnLeg => {
                    self.missions.remove(&timer.aircraft_id);
                    let Some(current) = store.aircraft(timer.aircraft_id) else {
                        continue;
                    };
                    store.assign_path(
                        timer.aircraft_id,
                        vec![current.position, mission.home],
                        self.config.return_speed,
                        MissionStatus::Returning,
                    );
                    log::info!("aircraft {} returning to base", timer.aircraft_id);
                    outcomes.push(MissionOutcome::ReturnLegIssued {
                        aircraft_id: timer.aircraft_id,
                        home: mission.home,
                    });
                }
            }
        }
        outcomes
    }

    /// Cancel every pending mission timer and forget every mission.
    /// Returns the number of timers cancelled.
    pub fn abandon_all(&mut self) -> usize {
        self.missions.clear();
        self.timers.cancel_all()
    }

    pub fn active_missions(&self) -> usize {
        self.missions.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<f64> {
        self.timers.next_deadline()
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }
}
