//! Outbound stream frames.
//!
//! Each frame is one server-sent event whose `data:` line carries a JSON
//! object:
//!
//! - `{"token": "<fragment>"}`
//! - `{"end": true}`
//! - `{"error": "<message>", "details": "<diagnostic>"}`

use serde::Serialize;

/// Generic message carried by error frames.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get response from AI";

/// One frame of an outbound stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StreamFrame {
    /// One upstream text fragment.
    Token { token: String },
    /// Normal completion. Always serialized as `true`.
    End { end: bool },
    /// Upstream failure with an optional diagnostic.
    Error {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<String>,
    },
}

impl StreamFrame {
    /// Creates a token frame.
    pub fn token(fragment: impl Into<String>) -> Self {
        StreamFrame::Token {
            token: fragment.into(),
        }
    }

    /// Creates the normal-completion frame.
    pub fn end() -> Self {
        StreamFrame::End { end: true }
    }

    /// Creates an upstream-failure frame with the generic message.
    pub fn upstream_error(details: impl Into<String>) -> Self {
        StreamFrame::Error {
            error: UPSTREAM_FAILURE_MESSAGE.to_string(),
            details: Some(details.into()),
        }
    }

    /// Returns true for end and error frames.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamFrame::Token { .. })
    }

    /// JSON payload of the frame.
    pub fn to_json(&self) -> String {
        // Only string and bool fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Full wire encoding: `data: <json>` followed by a blank line.
    pub fn encode(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }
}
