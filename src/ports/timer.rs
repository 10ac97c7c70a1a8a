//! Timer Port - Clock and sleep source.
//!
//! Session expiry is driven through this port so tests can advance virtual
//! time instead of waiting on the wall clock.

use std::future::Future;
use std::pin::Pin;
use tokio::time::Instant;

/// A pending sleep.
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Port for reading the current time and sleeping until a deadline.
pub trait Timer: Send + Sync {
    /// Current instant on this timer's clock.
    fn now(&self) -> Instant;

    /// Future that resolves once `deadline` has been reached.
    fn sleep_until(&self, deadline: Instant) -> Sleep;
}
