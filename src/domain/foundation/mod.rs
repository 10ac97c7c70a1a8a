//! Foundation module - Shared domain primitives.
//!
//! Identifiers and error types shared by the chat domain and the layers
//! built on top of it.

mod errors;
mod ids;

pub use errors::{ErrorCode, ValidationError};
pub use ids::StreamSessionId;
