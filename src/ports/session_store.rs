//! Session Store Port - Read-once storage for prepared chat sessions.
//!
//! The store is the only owner of pending sessions. Callers never look up or
//! delete entries directly; they go through `create` and `take`.
//!
//! # Concurrency
//!
//! `take` is the single-consumer boundary: concurrent callers racing on the
//! same identifier see exactly one winner, and an entry that has expired is
//! never returned even if its expiry task has not run yet.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chat::ChatSession;
use crate::domain::foundation::StreamSessionId;

/// Port for storing sessions between the prepare and stream steps.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session under a fresh identifier and arm its expiry.
    ///
    /// Never overwrites an existing entry; an identifier collision is an error.
    async fn create(&self, session: ChatSession) -> Result<StreamSessionId, SessionStoreError>;

    /// Atomically remove and return the session.
    ///
    /// Returns `None` if the identifier is unknown, already consumed, or expired.
    async fn take(&self, id: &StreamSessionId) -> Option<ChatSession>;
}

/// Session store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionStoreError {
    #[error("session identifier collision: {0}")]
    IdCollision(StreamSessionId),
}
