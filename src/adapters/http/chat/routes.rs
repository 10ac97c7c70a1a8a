//! HTTP routes for chat endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{chat_stream, legacy_chat, prepare_stream, ChatHandlers};

/// Creates the chat router, mounted under `/api`.
pub fn chat_routes(handlers: ChatHandlers) -> Router {
    Router::new()
        .route("/prepare-stream", post(prepare_stream))
        .route("/chat-stream", get(chat_stream))
        .route("/chat", get(legacy_chat))
        .with_state(handlers)
}
