//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AIProvider` - Streaming completions from the upstream language model
//! - `SessionStore` - Read-once storage for prepared chat sessions
//! - `Timer` - Clock and sleep source used for session expiry

mod ai_provider;
mod session_store;
mod timer;

pub use ai_provider::{
    AIError, AIProvider, ChunkStream, CompletionRequest, FinishReason, ProviderInfo, StreamChunk,
};
pub use session_store::{SessionStore, SessionStoreError};
pub use timer::{Sleep, Timer};
