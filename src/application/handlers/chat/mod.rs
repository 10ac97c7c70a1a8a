//! Chat streaming handlers.
//!
//! Two-step flow: `PrepareStreamHandler` stores the conversation and returns a
//! session identifier, `OpenStreamHandler` redeems it exactly once. The legacy
//! `DirectChatHandler` streams without a session. All three produce a
//! `StreamRelay`.

mod direct_chat;
mod open_stream;
mod prepare_stream;
mod stream_relay;

pub use direct_chat::{DirectChatCommand, DirectChatError, DirectChatHandler};
pub use open_stream::{OpenStreamCommand, OpenStreamError, OpenStreamHandler};
pub use prepare_stream::{
    PrepareStreamCommand, PrepareStreamError, PrepareStreamHandler, PrepareStreamResult,
};
pub use stream_relay::StreamRelay;
