//! DirectChatHandler - Single-step streaming for older callers.
//!
//! No session indirection: the history arrives with the stream request and a
//! fixed system prompt is always placed in front of it.

use std::sync::Arc;
use thiserror::Error;

use crate::domain::chat::{build_legacy_context, Message, ModelGate};
use crate::domain::foundation::ValidationError;
use crate::ports::{AIProvider, CompletionRequest};

use super::open_stream::log_downgrade;
use super::StreamRelay;

/// Command to stream a reply to an inline history.
#[derive(Debug, Clone)]
pub struct DirectChatCommand {
    pub messages: Vec<Message>,
    pub model: Option<String>,
}

/// Errors from direct chat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectChatError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Handler for the single-step chat stream.
pub struct DirectChatHandler {
    provider: Arc<dyn AIProvider>,
    gate: ModelGate,
    system_prompt: String,
}

impl DirectChatHandler {
    pub fn new(
        provider: Arc<dyn AIProvider>,
        gate: ModelGate,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            gate,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn handle(&self, cmd: DirectChatCommand) -> Result<StreamRelay, DirectChatError> {
        if cmd.messages.is_empty() {
            return Err(ValidationError::empty_field("messages").into());
        }

        let selection = self.gate.resolve(cmd.model.as_deref());
        log_downgrade(&selection);

        let messages = build_legacy_context(&self.system_prompt, &cmd.messages);
        let model = selection.into_model();
        let span = tracing::info_span!("legacy_chat", model = %model);

        Ok(StreamRelay::start(
            Arc::clone(&self.provider),
            CompletionRequest::new(model, messages),
            span,
        ))
    }
}
