//! Data Transfer Objects for chat endpoints.
//!
//! Request bodies are validated by hand from `serde_json::Value` so that every
//! shape problem maps to a 400 with a stable message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::{DirectChatCommand, PrepareStreamCommand, PrepareStreamResult};
use crate::domain::chat::{Message, Persona, PersonaExample};
use crate::domain::foundation::{ErrorCode, ValidationError};

use super::error::ChatApiError;

pub const HISTORY_REQUIRED: &str = "Valid message history (non-empty array) is required.";
pub const LEGACY_MESSAGES_REQUIRED: &str = "Messages parameter is required for /api/chat.";
pub const LEGACY_MESSAGES_NOT_ARRAY: &str =
    "Messages parameter for /api/chat must be a non-empty JSON array string.";
pub const LEGACY_MESSAGES_INVALID: &str =
    "Invalid messages format for /api/chat (must be a URL-encoded JSON array string).";

// ════════════════════════════════════════════════════════════════════════════
// Request types
// ════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/prepare-stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareStreamRequest {
    pub messages: Vec<Message>,
    pub model: Option<String>,
    pub persona: Option<Persona>,
}

impl PrepareStreamRequest {
    /// Validates a decoded JSON body.
    ///
    /// A non-string `model` is ignored. The persona is optional and read
    /// loosely: parts of the wrong type are dropped, never rejected.
    pub fn from_json(body: &Value) -> Result<Self, ChatApiError> {
        let messages = match body.get("messages") {
            Some(Value::Array(items)) if !items.is_empty() => parse_messages(items)?,
            _ => return Err(ChatApiError::bad_request(HISTORY_REQUIRED)),
        };

        let model = body
            .get("model")
            .and_then(Value::as_str)
            .map(str::to_string);

        let persona = body.get("persona").and_then(parse_persona);

        Ok(Self {
            messages,
            model,
            persona,
        })
    }

    pub fn into_command(self) -> PrepareStreamCommand {
        PrepareStreamCommand {
            messages: self.messages,
            model: self.model,
            persona: self.persona,
        }
    }
}

/// Query of `GET /api/chat-stream`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatStreamQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Query of `GET /api/chat`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LegacyChatQuery {
    pub messages: Option<String>,
    pub model: Option<String>,
}

impl LegacyChatQuery {
    /// Parses the URL-encoded JSON history.
    pub fn into_command(self) -> Result<DirectChatCommand, ChatApiError> {
        let raw = match self.messages.as_deref() {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Err(ChatApiError::bad_request(LEGACY_MESSAGES_REQUIRED)),
        };

        let parsed: Value = serde_json::from_str(raw).map_err(|_| ChatApiError::BadRequest {
            message: LEGACY_MESSAGES_INVALID.to_string(),
            code: ErrorCode::InvalidFormat,
        })?;

        let messages = match parsed {
            Value::Array(items) if !items.is_empty() => parse_messages(&items)?,
            _ => return Err(ChatApiError::bad_request(LEGACY_MESSAGES_NOT_ARRAY)),
        };

        Ok(DirectChatCommand {
            messages,
            model: self.model.filter(|m| !m.is_empty()),
        })
    }
}

/// Decodes each `{role, content}` entry, reporting the first bad index.
fn parse_messages(items: &[Value]) -> Result<Vec<Message>, ValidationError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value::<Message>(item.clone()).map_err(|e| {
                ValidationError::invalid_format(format!("messages[{}]", index), e.to_string())
            })
        })
        .collect()
}

/// Keeps the usable parts of a persona value.
///
/// A non-object persona, a non-array `examples`, non-object example entries
/// and non-string or blank fields are all skipped. Returns `None` when nothing
/// usable is left.
fn parse_persona(value: &Value) -> Option<Persona> {
    let fields = value.as_object()?;

    let examples = fields
        .get("examples")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(|example| PersonaExample {
                    user: text_field(example.get("user")),
                    assistant: text_field(example.get("assistant")),
                })
                .filter(|example| example.user.is_some() || example.assistant.is_some())
                .collect()
        })
        .unwrap_or_default();

    let persona = Persona {
        system: text_field(fields.get("system")),
        examples,
    };
    (!persona.is_empty()).then_some(persona)
}

fn text_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ════════════════════════════════════════════════════════════════════════════
// Response types
// ════════════════════════════════════════════════════════════════════════════

/// Response of `POST /api/prepare-stream`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepareStreamResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl From<PrepareStreamResult> for PrepareStreamResponse {
    fn from(result: PrepareStreamResult) -> Self {
        Self {
            session_id: result.session_id.to_string(),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: error.into(),
            code: code.to_string(),
        }
    }
}
