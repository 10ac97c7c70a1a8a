//! AI Provider Adapters.
//!
//! Implementations of the AIProvider port.
//!
//! ## Available Adapters
//!
//! - `OpenAIProvider` - Any OpenAI-compatible `chat/completions` endpoint (OpenRouter by default)
//! - `MockAIProvider` - Scripted mock for testing

mod mock_provider;
mod openai_provider;

pub use mock_provider::{MockAIProvider, MockError, MockEvent, MockResponse};
pub use openai_provider::{OpenAIConfig, OpenAIProvider};
