//! Pending chat session awaiting its single stream consumption.

use crate::domain::foundation::ValidationError;

use super::{Message, Persona};

/// A prepared conversation waiting to be streamed.
///
/// Immutable once created; the history is guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    messages: Vec<Message>,
    model: Option<String>,
    persona: Option<Persona>,
}

impl ChatSession {
    /// Creates a session, rejecting an empty history.
    pub fn new(
        messages: Vec<Message>,
        model: Option<String>,
        persona: Option<Persona>,
    ) -> Result<Self, ValidationError> {
        if messages.is_empty() {
            return Err(ValidationError::empty_field("messages"));
        }
        Ok(Self {
            messages,
            model,
            persona,
        })
    }

    /// Client-supplied history, in conversation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Model the caller asked for, before gating.
    pub fn requested_model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn persona(&self) -> Option<&Persona> {
        self.persona.as_ref()
    }
}
