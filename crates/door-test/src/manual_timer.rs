//! Manually triggered timer
//!
//! Wraps a real `TimerService` whose wait is a `ManualSleeper`, so the
//! dispatch path under test is the production one and only the passage of
//! time is faked.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use door_core::{DoorError, DoorResult, TimeoutListener};
use door_timer::{ManualSleeper, TimerService};
use parking_lot::Mutex;

/// How long `register` waits for the timer thread to reach its wait
const PARK_TIMEOUT: Duration = Duration::from_secs(5);

/// Timer whose notification is delivered by `trigger`, not by elapsed time
pub struct ManualTimer {
    sleeper: Arc<ManualSleeper>,
    timer: Arc<TimerService>,
    pending: Mutex<Option<JoinHandle<DoorResult<()>>>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        let sleeper = Arc::new(ManualSleeper::new());
        ManualTimer {
            timer: Arc::new(TimerService::with_sleeper(sleeper.clone())),
            sleeper,
            pending: Mutex::new(None),
        }
    }

    /// Register `listener` and return once the timer is waiting.
    /// A manual timer carries one notification at a time.
    pub fn register(&self, delay: Duration, listener: Arc<dyn TimeoutListener>) -> DoorResult<()> {
        let mut pending = self.pending.lock();
        if pending.is_some() {
            return Err(DoorError::TimerThread(
                "manual timer already has a pending notification".to_string(),
            ));
        }

        let timer = Arc::clone(&self.timer);
        let handle = thread::Builder::new()
            .name("manual-timer".to_string())
            .spawn(move || timer.register(delay, listener))
            .map_err(|e| DoorError::TimerThread(e.to_string()))?;
        *pending = Some(handle);

        if !self.sleeper.wait_for_sleepers(1, PARK_TIMEOUT) {
            return Err(DoorError::TimerThread(
                "timer thread never reached its wait".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether a registered notification is waiting for `trigger`
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }

    pub fn current_listener(&self) -> Option<Arc<dyn TimeoutListener>> {
        self.timer.current_listener()
    }

    /// Deliver the pending notification and return the listener's result.
    /// Without a pending notification this does nothing.
    pub fn trigger(&self) -> DoorResult<()> {
        let Some(handle) = self.pending.lock().take() else {
            return Ok(());
        };

        self.sleeper.release();
        handle
            .join()
            .map_err(|_| DoorError::TimerThread("manual timer thread panicked".to_string()))?
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ManualTimer {
    fn drop(&mut self) {
        // Untriggered notifications are delivered so the thread can exit
        if self.pending.get_mut().is_some() {
            self.sleeper.release();
        }
    }
}
