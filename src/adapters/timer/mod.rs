//! Timer adapters.
//!
//! - `TokioTimer` - Wall-clock timer backed by `tokio::time`
//! - `ManualTimer` - Virtual clock advanced explicitly, for tests

mod manual;
mod tokio_timer;

pub use manual::ManualTimer;
pub use tokio_timer::TokioTimer;
