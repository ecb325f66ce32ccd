//! Per-session concurrency control.
//!
//! Only one turn runs per session at a time. A second message arriving
//! while a turn is in flight waits for the current turn to finish before
//! its own turn starts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Maps each session id to a `Semaphore(1)` whose permit is held for the
/// duration of a turn.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the run lock for a session, waiting until any in-flight
    /// turn finishes. The permit auto-releases on drop.
    pub async fn acquire(&self, session_id: &str) -> Result<OwnedSemaphorePermit, SessionBusy> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        sem.acquire_owned().await.map_err(|_| SessionBusy)
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop semaphores for sessions with no turn in flight.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

/// The session's lock is no longer usable (its semaphore was closed).
#[derive(Debug)]
pub struct SessionBusy;

impl std::fmt::Display for SessionBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a turn is already in progress for this session")
    }
}

impl std::error::Error for SessionBusy {}
