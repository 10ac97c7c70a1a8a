//! Chatbot Relay - Ephemeral session broker with an SSE streaming relay
//!
//! Callers prepare a conversation with a POST, receive a short-lived session
//! identifier, then consume the model's reply as a server-sent event stream
//! with a plain GET that browser `EventSource` can issue.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
