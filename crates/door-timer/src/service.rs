//! Timer Service - waits out a delay, then notifies one listener

use std::sync::Arc;
use std::time::Duration;

use door_core::{DoorResult, TimeoutListener};
use parking_lot::Mutex;

use crate::{Sleeper, ThreadSleeper};

/// One-shot timer.
///
/// `register` stores the listener, waits through the configured `Sleeper`
/// and then invokes `on_timeout` exactly once, returning its result. The
/// call blocks for the whole delay; callers that must not block run it on a
/// thread of their own.
pub struct TimerService {
    /// Waiting strategy
    sleeper: Arc<dyn Sleeper>,
    /// Listener of the latest registration
    client: Mutex<Option<Arc<dyn TimeoutListener>>>,
}

impl TimerService {
    /// Create a timer that waits in real time
    pub fn new() -> Self {
        Self::with_sleeper(Arc::new(ThreadSleeper))
    }

    /// Create a timer with a custom waiting strategy
    pub fn with_sleeper(sleeper: Arc<dyn Sleeper>) -> Self {
        TimerService {
            sleeper,
            client: Mutex::new(None),
        }
    }

    /// Wait `delay`, then notify `listener` once.
    /// The listener's error, if any, is returned to the caller.
    pub fn register(&self, delay: Duration, listener: Arc<dyn TimeoutListener>) -> DoorResult<()> {
        *self.client.lock() = Some(Arc::clone(&listener));

        tracing::trace!(?delay, "timer registered, waiting");
        self.sleeper.sleep(delay);
        tracing::trace!(?delay, "timer elapsed, notifying listener");

        listener.on_timeout()
    }

    /// Listener of the latest registration, if any
    pub fn current_listener(&self) -> Option<Arc<dyn TimeoutListener>> {
        self.client.lock().clone()
    }
}

impl Default for TimerService {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerService")
            .field("has_listener", &self.client.lock().is_some())
            .finish_non_exhaustive()
    }
}
