//! Chat domain - conversations, personas and the frames relayed to callers.
//!
//! # Flow
//!
//! 1. A caller prepares a [`ChatSession`] (history, optional model, optional persona)
//! 2. On redemption the [`ModelGate`] picks the model actually sent upstream
//! 3. [`build_context`] materializes the effective message sequence
//! 4. Upstream fragments are relayed as [`StreamFrame`]s

mod context;
mod frame;
mod message;
mod model_gate;
mod persona;
mod session;

pub use context::{build_context, build_legacy_context};
pub use frame::{StreamFrame, UPSTREAM_FAILURE_MESSAGE};
pub use message::{Message, MessageRole};
pub use model_gate::{ModelGate, ModelSelection, FREE_TIER_SUFFIX};
pub use persona::{Persona, PersonaExample};
pub use session::ChatSession;
