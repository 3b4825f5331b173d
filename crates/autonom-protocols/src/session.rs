//! Session records and the session store protocol.
//!
//! A session is keyed by the triple (app name, user id, session id) and holds
//! an open JSON state map. Stores treat the map as an opaque blob: every
//! write replaces it wholesale and bumps `update_time`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::status::WorkflowStatus;

/// Open string-keyed state as persisted.
pub type StateMap = serde_json::Map<String, serde_json::Value>;

/// Three-part session identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

/// A persisted session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub app_name: String,
    pub user_id: String,
    #[serde(default)]
    pub state: StateMap,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Session {
    pub fn key(&self) -> SessionKey {
        SessionKey::new(&self.app_name, &self.user_id, &self.id)
    }

    /// The persisted `workflow_status`, if present and recognised.
    pub fn workflow_status(&self) -> Option<WorkflowStatus> {
        self.state
            .get("workflow_status")
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
    }

    /// Active sessions are those whose order has not been confirmed.
    pub fn is_active(&self) -> bool {
        self.workflow_status() != Some(WorkflowStatus::OrderConfirmed)
    }
}

/// Durable session storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create a session. Fails with [`StoreError::DuplicateKey`] if the id is taken.
    async fn create(&self, key: &SessionKey, initial_state: StateMap) -> Result<Session, StoreError>;

    /// Fetch a session by its full identity.
    async fn get(&self, key: &SessionKey) -> Result<Session, StoreError>;

    /// Fetch a session by id alone.
    async fn get_by_id(&self, session_id: &str) -> Result<Session, StoreError>;

    /// Replace the whole state map.
    async fn update_state(&self, key: &SessionKey, state: StateMap) -> Result<Session, StoreError>;

    /// All sessions of a user, most recently updated first.
    async fn list_for_user(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, StoreError>;

    /// Sessions of a user whose order is not yet confirmed.
    async fn list_active_for_user(
        &self,
        app_name: &str,
        user_id: &str,
    ) -> Result<Vec<Session>, StoreError> {
        let sessions = self.list_for_user(app_name, user_id).await?;
        Ok(sessions.into_iter().filter(Session::is_active).collect())
    }

    /// Point lookup of one state key. Unknown sessions and keys are `None`.
    async fn get_state_value(
        &self,
        session_id: &str,
        key: &str,
    ) -> Result<Option<serde_json::Value>, StoreError> {
        match self.get_by_id(session_id).await {
            Ok(session) => Ok(session.state.get(key).cloned()),
            Err(StoreError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Delete a session. Returns whether it existed.
    async fn delete(&self, key: &SessionKey) -> Result<bool, StoreError>;

    /// Administrative purge of every session. Returns the number removed.
    async fn purge(&self) -> Result<usize, StoreError>;
}
