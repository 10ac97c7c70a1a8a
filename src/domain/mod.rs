//! Domain layer - the chat relay vocabulary.
//!
//! Pure types and functions with no I/O: messages, personas, pending stream
//! sessions, the model gate, the context builder and outbound stream frames.

pub mod chat;
pub mod foundation;
