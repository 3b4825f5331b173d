//! In-memory session and profile stores.
//!
//! Same contract as the SQLite stores, including globally unique session
//! ids. Nothing survives a restart.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use autonom_protocols::error::StoreError;
use autonom_protocols::profile::{ProfileStore, UserProfile};
use autonom_protocols::session::{Session, SessionKey, SessionStore, StateMap};

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;

struct Entry {
    /// Write sequence, breaks `update_time` ties when listing.
    seq: u64,
    session: Session,
}

#[derive(Default)]
struct Sessions {
    next_seq: u64,
    by_id: HashMap<String, Entry>,
}

impl Sessions {
    fn bump(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

fn matches_key(session: &Session, key: &SessionKey) -> bool {
    session.app_name == key.app_name && session.user_id == key.user_id
}

/// Sessions held in a map keyed by session id.
#[derive(Default)]
pub struct MemorySessionStore {
    inner: RwLock<Sessions>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, key: &SessionKey, initial_state: StateMap) -> Result<Session, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.by_id.contains_key(&key.session_id) {
            return Err(StoreError::DuplicateKey(format!("session {}", key.session_id)));
        }

        let now = Utc::now();
        let session = Session {
            id: key.session_id.clone(),
            app_name: key.app_name.clone(),
            user_id: key.user_id.clone(),
            state: initial_state,
            create_time: now,
            update_time: now,
        };
        let seq = inner.bump();
        inner.by_id.insert(
            key.session_id.clone(),
            Entry {
                seq,
                session: session.clone(),
            },
        );
        tracing::debug!(session = %key, "Created session");
        Ok(session)
    }

    async fn get(&self, key: &SessionKey) -> Result<Session, StoreError> {
        let inner = self.inner.read().await;
        inner
            .by_id
            .get(&key.session_id)
            .map(|e| &e.session)
            .filter(|s| matches_key(s, key))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("session {}", key)))
    }

    async fn get_by_id(&self, session_id: &str) -> Result<Session, StoreError> {
        let inner = self.inner.read().await;
        inner
            .by_id
            .get(session_id)
            .map(|e| e.session.clone())
            .ok_or_else(|| StoreError::NotFound(format!("session {}", session_id)))
    }

    async fn update_state(&self, key: &SessionKey, state: StateMap) -> Result<Session, StoreError> {
        let mut inner = self.inner.write().await;
        let seq = inner.bump();
        let entry = inner
            .by_id
            .get_mut(&key.session_id)
            .filter(|e| matches_key(&e.session, key))
            .ok_or_else(|| StoreError::NotFound(format!("session {}", key)))?;

        entry.seq = seq;
        entry.session.state = state;
        entry.session.update_time = Utc::now().max(entry.session.update_time);
        Ok(entry.session.clone())
    }

    async fn list_for_user(&self, app_name: &str, user_id: &str) -> Result<Vec<Session>, StoreError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<&Entry> = inner
            .by_id
            .values()
            .filter(|e| e.session.app_name == app_name && e.session.user_id == user_id)
            .collect();
        entries.sort_by(|a, b| {
            b.session
                .update_time
                .cmp(&a.session.update_time)
                .then_with(|| b.seq.cmp(&a.seq))
        });
        Ok(entries.into_iter().map(|e| e.session.clone()).collect())
    }

    async fn delete(&self, key: &SessionKey) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let exists = inner
            .by_id
            .get(&key.session_id)
            .is_some_and(|e| matches_key(&e.session, key));
        if exists {
            inner.by_id.remove(&key.session_id);
        }
        Ok(exists)
    }

    async fn purge(&self) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner.by_id.len();
        inner.by_id.clear();
        tracing::info!(removed, "Purged sessions");
        Ok(removed)
    }
}

/// Profiles held in an id-ordered map.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: RwLock<BTreeMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let map = profiles.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            profiles: RwLock::new(map),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn upsert(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn get(&self, user_id: &str) -> Result<UserProfile, StoreError> {
        self.profiles
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {}", user_id)))
    }

    async fn list_all(&self) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self.profiles.read().await.values().cloned().collect())
    }
}
