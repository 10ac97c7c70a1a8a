//! Application handlers.
//!
//! Command handlers that orchestrate domain operations across ports.

pub mod chat;

pub use chat::{
    DirectChatCommand, DirectChatError, DirectChatHandler, OpenStreamCommand, OpenStreamError,
    OpenStreamHandler, PrepareStreamCommand, PrepareStreamError, PrepareStreamHandler,
    PrepareStreamResult, StreamRelay,
};
