//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Upstream completion API clients (OpenAI-compatible, mock)
//! - `http` - axum router and chat endpoints
//! - `session` - In-memory session store
//! - `timer` - Wall-clock and manual timers

pub mod ai;
pub mod http;
pub mod session;
pub mod timer;

pub use ai::{MockAIProvider, OpenAIConfig, OpenAIProvider};
pub use http::build_router;
pub use session::InMemorySessionStore;
pub use timer::{ManualTimer, TokioTimer};
