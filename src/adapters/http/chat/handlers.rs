//! HTTP handlers for chat endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header::HeaderName, HeaderValue},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::StreamExt;
use serde_json::Value;

use crate::application::{
    DirectChatHandler, OpenStreamCommand, OpenStreamHandler, PrepareStreamHandler, StreamRelay,
};
use crate::domain::foundation::StreamSessionId;

use super::dto::{ChatStreamQuery, LegacyChatQuery, PrepareStreamRequest, PrepareStreamResponse};
use super::error::{ChatApiError, SESSION_ID_REQUIRED};

// ════════════════════════════════════════════════════════════════════════════
// Handler state
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ChatHandlers {
    prepare_handler: Arc<PrepareStreamHandler>,
    open_handler: Arc<OpenStreamHandler>,
    direct_handler: Arc<DirectChatHandler>,
}

impl ChatHandlers {
    pub fn new(
        prepare_handler: Arc<PrepareStreamHandler>,
        open_handler: Arc<OpenStreamHandler>,
        direct_handler: Arc<DirectChatHandler>,
    ) -> Self {
        Self {
            prepare_handler,
            open_handler,
            direct_handler,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HTTP handlers
// ════════════════════════════════════════════════════════════════════════════

/// POST /api/prepare-stream - Store a conversation and return its session ID
pub async fn prepare_stream(
    State(handlers): State<ChatHandlers>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PrepareStreamResponse>, ChatApiError> {
    let Json(body) = body.map_err(ChatApiError::from_rejection)?;
    let request = PrepareStreamRequest::from_json(&body)?;

    let result = handlers
        .prepare_handler
        .handle(request.into_command())
        .await?;

    Ok(Json(result.into()))
}

/// GET /api/chat-stream?sessionId= - Stream the reply for a prepared session
pub async fn chat_stream(
    State(handlers): State<ChatHandlers>,
    Query(query): Query<ChatStreamQuery>,
) -> Result<Response, ChatApiError> {
    let raw_id = match query.session_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => return Err(ChatApiError::bad_request(SESSION_ID_REQUIRED)),
    };

    // A malformed identifier can never have been issued.
    let session_id: StreamSessionId = raw_id
        .parse()
        .map_err(|_| ChatApiError::session_not_found())?;

    let relay = handlers
        .open_handler
        .handle(OpenStreamCommand { session_id })
        .await?;

    Ok(sse_response(relay))
}

/// GET /api/chat?messages=&model= - Single-step stream for older callers
pub async fn legacy_chat(
    State(handlers): State<ChatHandlers>,
    Query(query): Query<LegacyChatQuery>,
) -> Result<Response, ChatApiError> {
    let cmd = query.into_command()?;
    let relay = handlers.direct_handler.handle(cmd)?;

    Ok(sse_response(relay))
}

/// Wraps a relay in an unbuffered event-stream response.
///
/// Headers go out as soon as the response is returned; the relay (and with it
/// the upstream call) only starts when the body is first polled.
fn sse_response(relay: StreamRelay) -> Response {
    let events = relay.map(|frame| Ok::<_, Infallible>(Event::default().data(frame.to_json())));

    let mut response = Sse::new(events).into_response();
    response.headers_mut().insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    response
}
