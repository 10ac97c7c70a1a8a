//! In-memory session store.
//!
//! Pending sessions live in a mutex-guarded map. Each entry carries its
//! deadline and the handle of a one-shot expiry task; whichever of `take` or
//! the expiry task acquires the lock first removes the entry, and the other
//! becomes a no-op.
//!
//! Memory is bounded only by TTL-driven cleanup. Not shared across processes.

use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tokio::time::Instant;

use crate::domain::chat::ChatSession;
use crate::domain::foundation::StreamSessionId;
use crate::ports::{SessionStore, SessionStoreError, Timer};

/// In-memory, single-process session store.
pub struct InMemorySessionStore {
    entries: Arc<Mutex<HashMap<StreamSessionId, PendingEntry>>>,
    timer: Arc<dyn Timer>,
    ttl: Duration,
}

struct PendingEntry {
    session: ChatSession,
    expires_at: Instant,
    expiry: AbortHandle,
}

impl InMemorySessionStore {
    /// Creates a store whose sessions expire `ttl` after creation.
    pub fn new(timer: Arc<dyn Timer>, ttl: Duration) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            timer,
            ttl,
        }
    }

    /// Number of sessions currently pending.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stores a session under the given identifier.
    async fn insert(
        &self,
        id: StreamSessionId,
        session: ChatSession,
    ) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.lock().await;

        let slot = match entries.entry(id) {
            Entry::Occupied(_) => {
                tracing::error!(session_id = %id, "Session identifier collision");
                return Err(SessionStoreError::IdCollision(id));
            }
            Entry::Vacant(slot) => slot,
        };

        let expires_at = self.timer.now() + self.ttl;
        let sleep = self.timer.sleep_until(expires_at);
        let map = Arc::clone(&self.entries);

        // Blocks on the lock held here until the entry is in place.
        let task = tokio::spawn(async move {
            sleep.await;
            if map.lock().await.remove(&id).is_some() {
                tracing::debug!(session_id = %id, "Session expired before it was consumed");
            }
        });

        slot.insert(PendingEntry {
            session,
            expires_at,
            expiry: task.abort_handle(),
        });

        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: ChatSession) -> Result<StreamSessionId, SessionStoreError> {
        let id = StreamSessionId::new();
        self.insert(id, session).await?;
        tracing::debug!(session_id = %id, ttl_secs = self.ttl.as_secs(), "Session created");
        Ok(id)
    }

    async fn take(&self, id: &StreamSessionId) -> Option<ChatSession> {
        let entry = self.entries.lock().await.remove(id)?;
        entry.expiry.abort();

        if self.timer.now() >= entry.expires_at {
            tracing::debug!(session_id = %id, "Session deadline passed before consumption");
            return None;
        }

        tracing::debug!(session_id = %id, "Session consumed");
        Some(entry.session)
    }
}
