use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::state::SessionState;

/// One session's state. Holding the mutex is what makes a session single-threaded:
/// a second request for the same session waits until the first has finished, including
/// any inference call it is making.
pub type SharedSession = Arc<Mutex<SessionState>>;

struct SessionEntry {
    session: SharedSession,
    /// Last time a request looked this session up.
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.last_seen + ttl < now
    }
}

/// In-memory registry of live sessions.
///
/// Sessions never share mutable state; the outer lock only guards the map itself.
/// Idle time is tracked per entry and refreshed under the map lock at lookup time.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(ttl: chrono::Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Creates an empty session, sweeping idle ones first.
    pub async fn create(&self) -> (Uuid, SharedSession) {
        self.purge_expired().await;

        let id = Uuid::new_v4();
        let session = Arc::new(Mutex::new(SessionState::new(id)));
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                session: session.clone(),
                last_seen: Utc::now(),
            },
        );
        info!("Session {id} created");
        (id, session)
    }

    /// Looks a session up and marks it active, so a purge running between this call and
    /// the caller taking the session lock cannot drop it.
    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_seen = Utc::now();
        Some(entry.session.clone())
    }

    /// Ends a session. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {id} ended");
        }
        removed
    }

    /// Drops sessions not looked up for longer than the TTL. Sessions currently locked by
    /// a request are in use and are skipped.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            !entry.is_expired(self.ttl, now) || entry.session.try_lock().is_err()
        });
        let purged = before - sessions.len();
        if purged > 0 {
            debug!("Purged {purged} idle sessions");
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    #[cfg(test)]
    async fn backdate(&self, id: Uuid, by: chrono::Duration) {
        if let Some(entry) = self.sessions.write().await.get_mut(&id) {
            entry.last_seen = entry.last_seen - by;
        }
    }
}
