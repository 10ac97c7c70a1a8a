use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

use chatbot_relay::adapters::ai::OpenAIProvider;
use chatbot_relay::adapters::http::build_router;
use chatbot_relay::adapters::session::InMemorySessionStore;
use chatbot_relay::adapters::timer::TokioTimer;
use chatbot_relay::config::AppConfig;
use chatbot_relay::ports::AIProvider;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_tracing(&config);

    if !config.upstream.has_api_key() {
        tracing::warn!("CHATBOT_RELAY__UPSTREAM__API_KEY is not set. AI calls will fail.");
    }

    let provider = OpenAIProvider::new(config.upstream.provider_config())
        .context("Failed to create upstream client")?;
    let info = provider.provider_info();
    let sessions =
        InMemorySessionStore::new(Arc::new(TokioTimer::new()), config.chat.session_ttl());

    let app = build_router(&config, Arc::new(provider), Arc::new(sessions));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!(
        address = %addr,
        upstream = %info.endpoint,
        default_model = %config.upstream.default_model,
        session_ttl_secs = config.chat.session_ttl_secs,
        "Chatbot relay listening"
    );
    tracing::info!("  POST /api/prepare-stream  body: {{ messages, model?, persona? }}");
    tracing::info!("  GET  /api/chat-stream?sessionId=<id>");
    tracing::info!("  GET  /api/chat?messages=<json_array>&model=<id>");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
