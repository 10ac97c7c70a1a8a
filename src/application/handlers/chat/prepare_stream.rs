//! PrepareStreamHandler - Command handler for registering a conversation.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::chat::{ChatSession, Message, Persona};
use crate::domain::foundation::{StreamSessionId, ValidationError};
use crate::ports::{SessionStore, SessionStoreError};

/// Command to prepare a conversation for streaming.
#[derive(Debug, Clone)]
pub struct PrepareStreamCommand {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub persona: Option<Persona>,
}

/// Result of successful preparation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrepareStreamResult {
    pub session_id: StreamSessionId,
}

/// Errors from preparing a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrepareStreamError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Handler for preparing streams.
pub struct PrepareStreamHandler {
    sessions: Arc<dyn SessionStore>,
}

impl PrepareStreamHandler {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn handle(
        &self,
        cmd: PrepareStreamCommand,
    ) -> Result<PrepareStreamResult, PrepareStreamError> {
        let message_count = cmd.messages.len();
        let session = ChatSession::new(cmd.messages, cmd.model, cmd.persona)?;
        let session_id = self.sessions.create(session).await?;

        tracing::info!(
            session_id = %session_id,
            messages = message_count,
            "Conversation prepared for streaming"
        );

        Ok(PrepareStreamResult { session_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::InMemorySessionStore;
    use crate::adapters::timer::ManualTimer;
    use std::time::Duration;

    fn store() -> Arc<InMemorySessionStore> {
        Arc::new(InMemorySessionStore::new(
            Arc::new(ManualTimer::new()),
            Duration::from_secs(20),
        ))
    }

    #[tokio::test]
    async fn prepares_session_with_model_and_persona() {
        let store = store();
        let handler = PrepareStreamHandler::new(store.clone());

        let result = handler
            .handle(PrepareStreamCommand {
                messages: vec![Message::user("Hello")],
                model: Some("foo/bar:free".to_string()),
                persona: Some(Persona::with_system("Be brief")),
            })
            .await
            .unwrap();

        let session = store.take(&result.session_id).await.unwrap();
        assert_eq!(session.messages(), &[Message::user("Hello")]);
        assert_eq!(session.requested_model(), Some("foo/bar:free"));
        assert_eq!(session.persona(), Some(&Persona::with_system("Be brief")));
    }

    #[tokio::test]
    async fn empty_history_is_rejected_and_nothing_is_stored() {
        let store = store();
        let handler = PrepareStreamHandler::new(store.clone());

        let result = handler
            .handle(PrepareStreamCommand {
                messages: vec![],
                model: None,
                persona: None,
            })
            .await;

        assert_eq!(
            result,
            Err(PrepareStreamError::Validation(ValidationError::empty_field(
                "messages"
            )))
        );
        assert!(store.is_empty().await);
    }
}
