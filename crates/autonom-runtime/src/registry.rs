//! Single-flight registry of sessions with a phase in progress.
//!
//! A run or resume holds a [`SessionGuard`] for its whole lifetime. A second
//! call for the same session id while the guard is alive is rejected with
//! [`WorkflowError::SessionBusy`]; nothing is queued.
//!
//! [`SessionRegistry::acquire_all`] claims every session at once for a purge.
//! It fails while any session is held, and blocks new claims until dropped.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use autonom_protocols::error::WorkflowError;

const ALL_SESSIONS: &str = "*";

/// Session ids currently being driven.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    in_flight: Arc<DashMap<String, ()>>,
    /// `true` while a [`RegistryLock`] is alive. Claims check it under the
    /// same lock, so a claim and a lock-all never both succeed.
    closed: Arc<Mutex<bool>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `session_id`, or fail if another invocation holds it.
    pub fn acquire(&self, session_id: &str) -> Result<SessionGuard, WorkflowError> {
        let closed = self.closed.lock();
        if *closed {
            return Err(WorkflowError::SessionBusy(session_id.to_string()));
        }
        match self.in_flight.entry(session_id.to_string()) {
            Entry::Occupied(_) => Err(WorkflowError::SessionBusy(session_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
                debug!(session_id, "Session claimed");
                Ok(SessionGuard {
                    session_id: session_id.to_string(),
                    in_flight: self.in_flight.clone(),
                })
            }
        }
    }

    /// Claim every session. Fails with the id of a held session, if any.
    pub fn acquire_all(&self) -> Result<RegistryLock, WorkflowError> {
        let mut closed = self.closed.lock();
        if *closed {
            return Err(WorkflowError::SessionBusy(ALL_SESSIONS.to_string()));
        }
        if let Some(held) = self.in_flight.iter().next() {
            return Err(WorkflowError::SessionBusy(held.key().clone()));
        }
        *closed = true;
        debug!("All sessions claimed");
        Ok(RegistryLock {
            closed: self.closed.clone(),
        })
    }

    pub fn is_busy(&self, session_id: &str) -> bool {
        self.in_flight.contains_key(session_id)
    }

    pub fn len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Releases the session on drop.
pub struct SessionGuard {
    session_id: String,
    in_flight: Arc<DashMap<String, ()>>,
}

impl SessionGuard {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.session_id);
        debug!(session_id = %self.session_id, "Session released");
    }
}

/// Reopens the registry on drop.
pub struct RegistryLock {
    closed: Arc<Mutex<bool>>,
}

impl Drop for RegistryLock {
    fn drop(&mut self) {
        *self.closed.lock() = false;
        debug!("All sessions released");
    }
}
