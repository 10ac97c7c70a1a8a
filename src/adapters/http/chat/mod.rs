//! HTTP adapter for chat endpoints.

mod dto;
mod error;
mod handlers;
mod routes;

pub use dto::{
    ChatStreamQuery, ErrorResponse, LegacyChatQuery, PrepareStreamRequest, PrepareStreamResponse,
};
pub use error::ChatApiError;
pub use handlers::ChatHandlers;
pub use routes::chat_routes;
