//! AnimationScheduler: cooperative, cancellable scheduling on wall-clock time.
//!
//! Two kinds of task share one registry:
//! - **loops** run on every `due` call until cancelled (frame updates,
//!   flicker, pulses, reveal animations);
//! - **one-shots** run once when their deadline has passed (mission timers).
//!
//! Nothing runs by itself: the owner calls [`AnimationScheduler::due`] from
//! its frame callback and executes what comes back. A cancelled task is
//! removed from the registry, so it can never be returned again.

use std::collections::BTreeMap;

/// Cancellation handle for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

#[derive(Debug, Clone)]
enum Schedule {
    Loop,
    Once { at_ms: f64 },
}

#[derive(Debug, Clone)]
struct Task<T> {
    schedule: Schedule,
    payload: T,
}

/// A task that is due in the current frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DueTask<T> {
    pub id: TaskId,
    pub payload: T,
}

#[derive(Debug)]
pub struct AnimationScheduler<T> {
    tasks: BTreeMap<TaskId, Task<T>>,
    next_id: u64,
}

impl<T> Default for AnimationScheduler<T> {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 0,
        }
    }
}

impl<T: Clone> AnimationScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, schedule: Schedule, payload: T) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Task { schedule, payload });
        id
    }

    /// Register a loop that runs on every frame until cancelled.
    pub fn start_loop(&mut self, payload: T) -> TaskId {
        self.insert(Schedule::Loop, payload)
    }

    /// Register a one-shot task that becomes due once `now >= at_ms`.
    pub fn schedule_once(&mut self, at_ms: f64, payload: T) -> TaskId {
        self.insert(Schedule::Once { at_ms }, payload)
    }

    /// Cancel a task. Returns false if it already ran or was cancelled.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        self.tasks.remove(&id).is_some()
    }

    /// Cancel every task. Returns how many were pending.
    pub fn cancel_all(&mut self) -> usize {
        let pending = self.tasks.len();
        self.tasks.clear();
        pending
    }

    pub fn is_scheduled(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks due at `now_ms`: every loop in start order, then every expired
    /// one-shot by deadline (ties in scheduling order). Expired one-shots are
    /// removed from the registry.
    pub fn due(&mut self, now_ms: f64) -> Vec<DueTask<T>> {
        let mut loops = Vec::new();
        let mut expired: Vec<(f64, TaskId)> = Vec::new();
        for (id, task) in &self.tasks {
            match task.schedule {
                Schedule::Loop => loops.push(DueTask {
                    id: *id,
                    payload: task.payload.clone(),
                }),
                Schedule::Once { at_ms } if at_ms <= now_ms => expired.push((at_ms, *id)),
                Schedule::Once { .. } => {}
            }
        }

        expired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (_, id) in expired {
            if let Some(task) = self.tasks.remove(&id) {
                loops.push(DueTask {
                    id,
                    payload: task.payload,
                });
            }
        }
        loops
    }

    /// Earliest pending one-shot deadline, if any.
    pub fn next_deadline(&self) -> Option<f64> {
        self.tasks
            .values()
            .filter_map(|task| match task.schedule {
                Schedule::Once { at_ms } => Some(at_ms),
                Schedule::Loop => None,
            })
            .min_by(f64::total_cmp)
    }
}
