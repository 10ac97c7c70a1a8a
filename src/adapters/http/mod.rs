//! HTTP adapters - REST and event-stream endpoints.
//!
//! `build_router` wires the chat handlers to their ports and mounts them
//! under `/api`, next to the liveness check.

pub mod chat;

pub use chat::{chat_routes, ChatApiError, ChatHandlers};

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::application::{DirectChatHandler, OpenStreamHandler, PrepareStreamHandler};
use crate::config::AppConfig;
use crate::domain::chat::ModelGate;
use crate::ports::{AIProvider, SessionStore};

/// Plain-text body of `GET /healthcheck`.
pub const HEALTHCHECK_BODY: &str = "OK from chatbot-relay!";

/// Builds the application router.
///
/// The timeout only bounds the time until response headers; event-stream
/// bodies run for as long as the upstream keeps producing.
pub fn build_router(
    config: &AppConfig,
    provider: Arc<dyn AIProvider>,
    sessions: Arc<dyn SessionStore>,
) -> Router {
    let gate = ModelGate::new(config.upstream.default_model.clone());

    let handlers = ChatHandlers::new(
        Arc::new(PrepareStreamHandler::new(Arc::clone(&sessions))),
        Arc::new(OpenStreamHandler::new(
            sessions,
            Arc::clone(&provider),
            gate.clone(),
        )),
        Arc::new(DirectChatHandler::new(
            provider,
            gate,
            config.chat.legacy_system_prompt.clone(),
        )),
    );

    Router::new()
        .route("/healthcheck", get(healthcheck))
        .nest("/api", chat_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(config.server.request_timeout()))
                .layer(DefaultBodyLimit::max(config.server.body_limit_bytes)),
        )
}

/// GET /healthcheck - Liveness probe
async fn healthcheck() -> &'static str {
    tracing::debug!("Healthcheck hit");
    HEALTHCHECK_BODY
}
