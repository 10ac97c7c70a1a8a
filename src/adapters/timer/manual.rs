//! Manual timer for testing.
//!
//! Time only moves when [`ManualTimer::advance`] is called. Sleeps whose
//! deadline is reached are released in deadline order.
//!
//! # Example
//!
//! ```ignore
//! let timer = ManualTimer::new();
//! let store = InMemorySessionStore::new(Arc::new(timer.clone()), Duration::from_secs(20));
//!
//! let id = store.create(session).await?;
//! timer.advance(Duration::from_secs(20));
//! assert!(store.take(&id).await.is_none());
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

use crate::ports::{Sleep, Timer};

/// Virtual clock with explicitly advanced time.
#[derive(Debug, Clone)]
pub struct ManualTimer {
    clock: Arc<Mutex<ManualClock>>,
}

#[derive(Debug)]
struct ManualClock {
    now: Instant,
    sleepers: Vec<(Instant, oneshot::Sender<()>)>,
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualTimer {
    /// Creates a timer starting at the current instant.
    pub fn new() -> Self {
        Self {
            clock: Arc::new(Mutex::new(ManualClock {
                now: Instant::now(),
                sleepers: Vec::new(),
            })),
        }
    }

    /// Moves time forward and wakes every sleep whose deadline has passed.
    pub fn advance(&self, by: Duration) {
        let mut clock = self.clock.lock().unwrap();
        clock.now += by;
        let now = clock.now;

        let (mut due, pending): (Vec<_>, Vec<_>) = clock
            .sleepers
            .drain(..)
            .partition(|(deadline, _)| *deadline <= now);
        clock.sleepers = pending;
        drop(clock);

        due.sort_by_key(|(deadline, _)| *deadline);
        for (_, waker) in due {
            let _ = waker.send(());
        }
    }

    /// Number of sleeps still waiting (cancelled sleeps are not counted).
    pub fn pending_sleeps(&self) -> usize {
        let mut clock = self.clock.lock().unwrap();
        clock.sleepers.retain(|(_, waker)| !waker.is_closed());
        clock.sleepers.len()
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> Instant {
        self.clock.lock().unwrap().now
    }

    fn sleep_until(&self, deadline: Instant) -> Sleep {
        let mut clock = self.clock.lock().unwrap();
        if deadline <= clock.now {
            return Box::pin(async {});
        }

        let (tx, rx) = oneshot::channel();
        clock.sleepers.push((deadline, tx));

        Box::pin(async move {
            // A dropped timer never fires.
            if rx.await.is_err() {
                futures::future::pending::<()>().await;
            }
        })
    }
}
