//! OpenStreamHandler - Redeems a prepared session and starts its relay.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::chat::{build_context, ModelGate, ModelSelection};
use crate::domain::foundation::StreamSessionId;
use crate::ports::{AIProvider, CompletionRequest, SessionStore};

use super::StreamRelay;

/// Command to open the stream for a prepared session.
#[derive(Debug, Clone, Copy)]
pub struct OpenStreamCommand {
    pub session_id: StreamSessionId,
}

/// Errors from opening a stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpenStreamError {
    /// Unknown, already consumed, or expired.
    #[error("session not found: {0}")]
    SessionNotFound(StreamSessionId),
}

/// Handler for opening streams.
pub struct OpenStreamHandler {
    sessions: Arc<dyn SessionStore>,
    provider: Arc<dyn AIProvider>,
    gate: ModelGate,
}

impl OpenStreamHandler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        provider: Arc<dyn AIProvider>,
        gate: ModelGate,
    ) -> Self {
        Self {
            sessions,
            provider,
            gate,
        }
    }

    /// Consumes the session and returns a relay ready to be polled.
    pub async fn handle(&self, cmd: OpenStreamCommand) -> Result<StreamRelay, OpenStreamError> {
        let session = self
            .sessions
            .take(&cmd.session_id)
            .await
            .ok_or(OpenStreamError::SessionNotFound(cmd.session_id))?;

        let selection = self.gate.resolve(session.requested_model());
        log_downgrade(&selection);

        let messages = build_context(session.persona(), session.messages());
        let model = selection.into_model();
        let span = tracing::info_span!(
            "chat_stream",
            session_id = %cmd.session_id,
            model = %model
        );

        Ok(StreamRelay::start(
            Arc::clone(&self.provider),
            CompletionRequest::new(model, messages),
            span,
        ))
    }
}

/// Records a rejected model request. Never changes control flow.
pub(super) fn log_downgrade(selection: &ModelSelection) {
    if let ModelSelection::Downgraded { requested, model } = selection {
        tracing::warn!(
            requested_model = %requested,
            default_model = %model,
            "Requested model is not free tier; using default"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::session::InMemorySessionStore;
    use crate::adapters::timer::ManualTimer;
    use crate::domain::chat::{ChatSession, Message, Persona, StreamFrame};
    use futures::StreamExt;
    use std::time::Duration;

    const DEFAULT_MODEL: &str = "default/model:free";

    struct Fixture {
        store: Arc<InMemorySessionStore>,
        provider: MockAIProvider,
        handler: OpenStreamHandler,
    }

    fn fixture(provider: MockAIProvider) -> Fixture {
        let store = Arc::new(InMemorySessionStore::new(
            Arc::new(ManualTimer::new()),
            Duration::from_secs(20),
        ));
        let handler = OpenStreamHandler::new(
            store.clone(),
            Arc::new(provider.clone()),
            ModelGate::new(DEFAULT_MODEL),
        );
        Fixture {
            store,
            provider,
            handler,
        }
    }

    async fn prepare(
        fx: &Fixture,
        model: Option<&str>,
        persona: Option<Persona>,
    ) -> StreamSessionId {
        let session = ChatSession::new(
            vec![Message::user("Hi")],
            model.map(str::to_string),
            persona,
        )
        .unwrap();
        fx.store.create(session).await.unwrap()
    }

    #[tokio::test]
    async fn streams_prepared_session() {
        let fx = fixture(MockAIProvider::new().with_fragments(["Hel", "lo"]));
        let session_id = prepare(&fx, None, None).await;

        let relay = fx
            .handler
            .handle(OpenStreamCommand { session_id })
            .await
            .unwrap();
        let frames: Vec<StreamFrame> = relay.collect().await;

        assert_eq!(
            frames,
            vec![
                StreamFrame::token("Hel"),
                StreamFrame::token("lo"),
                StreamFrame::end()
            ]
        );
    }

    #[tokio::test]
    async fn session_is_single_use() {
        let fx = fixture(MockAIProvider::new());
        let session_id = prepare(&fx, None, None).await;

        assert!(fx.handler.handle(OpenStreamCommand { session_id }).await.is_ok());
        assert_eq!(
            fx.handler
                .handle(OpenStreamCommand { session_id })
                .await
                .err(),
            Some(OpenStreamError::SessionNotFound(session_id))
        );
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let fx = fixture(MockAIProvider::new());
        let session_id = StreamSessionId::new();

        let result = fx.handler.handle(OpenStreamCommand { session_id }).await;

        assert!(matches!(result, Err(OpenStreamError::SessionNotFound(id)) if id == session_id));
    }

    #[tokio::test]
    async fn free_tier_model_is_forwarded() {
        let fx = fixture(MockAIProvider::new());
        let session_id = prepare(&fx, Some("foo/bar:free"), None).await;

        let relay = fx.handler.handle(OpenStreamCommand { session_id }).await.unwrap();
        let _: Vec<StreamFrame> = relay.collect().await;

        assert_eq!(fx.provider.get_calls()[0].model, "foo/bar:free");
    }

    #[tokio::test]
    async fn paid_model_is_downgraded_to_default() {
        let fx = fixture(MockAIProvider::new());
        let session_id = prepare(&fx, Some("foo/bar"), None).await;

        let relay = fx.handler.handle(OpenStreamCommand { session_id }).await.unwrap();
        let _: Vec<StreamFrame> = relay.collect().await;

        assert_eq!(fx.provider.get_calls()[0].model, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn persona_precedes_history_upstream() {
        let fx = fixture(MockAIProvider::new());
        let persona = Persona::with_system("You are Merlin").with_example("Who?", "A wizard.");
        let session_id = prepare(&fx, None, Some(persona)).await;

        let relay = fx.handler.handle(OpenStreamCommand { session_id }).await.unwrap();
        let _: Vec<StreamFrame> = relay.collect().await;

        assert_eq!(
            fx.provider.get_calls()[0].messages,
            vec![
                Message::system("You are Merlin"),
                Message::user("Who?"),
                Message::assistant("A wizard."),
                Message::user("Hi"),
            ]
        );
    }
}
