//! State shared between the driver and the session loop thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use firewiser_core::commands::OperatorCommand;
use firewiser_core::state::SessionSnapshot;
use firewiser_services::ResolvedDropZone;

/// Messages sent to the session loop thread.
#[derive(Debug)]
pub enum LoopCommand {
    /// An operator command to forward to the session.
    Operator(OperatorCommand),
    /// A drop zone computed off the loop, applied only if still current.
    DropZoneResolved(ResolvedDropZone),
    /// Tear the session down and stop the thread.
    Shutdown,
}

/// Handles the driver keeps while the loop runs.
///
/// - `command_tx` is `None` until the loop has been spawned.
/// - `latest_snapshot` is written by the loop thread after every frame.
pub struct AppState {
    pub command_tx: Mutex<Option<mpsc::Sender<LoopCommand>>>,
    pub latest_snapshot: Arc<Mutex<Option<SessionSnapshot>>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            command_tx: Mutex::new(None),
            latest_snapshot: Arc::new(Mutex::new(None)),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward a command to the loop. Returns false if no loop is running.
    pub fn send(&self, command: LoopCommand) -> bool {
        match self.command_tx.lock() {
            Ok(guard) => guard
                .as_ref()
                .map(|tx| tx.send(command).is_ok())
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Clone of the most recent snapshot, if any frame has run.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.latest_snapshot
            .lock()
            .ok()
            .and_then(|lock| lock.clone())
    }
}
