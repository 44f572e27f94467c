//! Session store — in-memory per-user session table with per-key locking.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::model::Session;

/// Guard that serializes read-modify-write access to one user's session.
///
/// Held by the router for the duration of a flow step; dropping it lets the
/// next request for the same user proceed.
pub struct UserLock {
    _guard: OwnedMutexGuard<()>,
}

/// Backend-agnostic session persistence.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Look up a session without creating one.
    async fn get(&self, user_id: &str) -> Option<Session>;

    /// Return the existing session or a fresh one at the greeting step.
    ///
    /// A freshly created session is not persisted until `save` is called.
    async fn get_or_create(&self, user_id: &str) -> Session;

    /// Persist a session, making it visible to later lookups.
    async fn save(&self, session: Session);

    /// Acquire the per-user lock. Requests for the same user id queue in
    /// arrival order; other users are unaffected.
    async fn lock_user(&self, user_id: &str) -> UserLock;

    /// Number of stored sessions.
    async fn len(&self) -> usize;

    /// Remove sessions idle for longer than `max_idle`. Returns how many were removed.
    async fn evict_idle(&self, max_idle: Duration) -> usize;
}

/// In-memory session store. Sessions live for the lifetime of the process
/// unless evicted.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    #[cfg(test)]
    pub(crate) async fn lock_count(&self) -> usize {
        self.locks.lock().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Option<Session> {
        self.sessions.read().await.get(user_id).cloned()
    }

    async fn get_or_create(&self, user_id: &str) -> Session {
        if let Some(session) = self.get(user_id).await {
            return session;
        }
        debug!(user_id = %user_id, "Creating new session");
        Session::new(user_id)
    }

    async fn save(&self, mut session: Session) {
        session.touch();
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.user_id.clone(), session);
    }

    async fn lock_user(&self, user_id: &str) -> UserLock {
        let lock = {
            let mut locks = self.locks.lock().await;
            Arc::clone(locks.entry(user_id.to_string()).or_default())
        };
        UserLock {
            _guard: lock.lock_owned().await,
        }
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn evict_idle(&self, max_idle: Duration) -> usize {
        let Ok(max_idle) = chrono::Duration::from_std(max_idle) else {
            return 0;
        };
        let cutoff = chrono::Utc::now() - max_idle;

        let removed = {
            let mut sessions = self.sessions.write().await;
            let before = sessions.len();
            sessions.retain(|_, s| s.updated_at >= cutoff);
            before - sessions.len()
        };

        // Drop lock entries nobody is holding or waiting on.
        {
            let sessions = self.sessions.read().await;
            let mut locks = self.locks.lock().await;
            locks.retain(|user_id, lock| {
                Arc::strong_count(lock) > 1 || sessions.contains_key(user_id)
            });
        }

        if removed > 0 {
            info!(removed, "Evicted idle sessions");
        }
        removed
    }
}

/// Spawn a background task that evicts sessions idle longer than `max_idle`.
pub fn spawn_eviction_task(
    store: Arc<dyn SessionStore>,
    max_idle: Duration,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            store.evict_idle(max_idle).await;
        }
    })
}
