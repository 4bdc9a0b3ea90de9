//! Waiting strategies for the timer service

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// The waiting step of a timer, kept separate from notification so that
/// tests can replace real elapsed time without touching dispatch.
pub trait Sleeper: Send + Sync {
    /// Block the calling thread for (at least) `duration`
    fn sleep(&self, duration: Duration);
}

impl<S: Sleeper + ?Sized> Sleeper for Arc<S> {
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

/// Real elapsed-time waiting
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Returns immediately, remembering what it was asked to wait for
#[derive(Debug, Default)]
pub struct InstantSleeper {
    calls: AtomicU64,
    last_requested: Mutex<Option<Duration>>,
}

impl InstantSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of waits requested so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }

    /// Delay of the most recent wait
    pub fn last_requested(&self) -> Option<Duration> {
        *self.last_requested.lock()
    }
}

impl Sleeper for InstantSleeper {
    fn sleep(&self, duration: Duration) {
        *self.last_requested.lock() = Some(duration);
        self.calls.fetch_add(1, Ordering::AcqRel);
    }
}

/// Blocks every wait until a test hands out a permit with `release`.
/// The requested duration is ignored.
#[derive(Debug, Default)]
pub struct ManualSleeper {
    state: Mutex<ManualState>,
    cond: Condvar,
}

#[derive(Debug, Default)]
struct ManualState {
    permits: usize,
    waiting: usize,
}

impl ManualSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let one pending or future wait complete
    pub fn release(&self) {
        let mut state = self.state.lock();
        state.permits += 1;
        // The condvar is shared with wait_for_sleepers, so wake everyone
        self.cond.notify_all();
    }

    /// Number of threads currently parked in `sleep`
    pub fn waiting(&self) -> usize {
        self.state.lock().waiting
    }

    /// Block until at least `count` threads are parked, or `timeout` passes.
    /// Returns whether the count was reached.
    pub fn wait_for_sleepers(&self, count: usize, timeout: Duration) -> bool {
        let mut state = self.state.lock();
        let Some(deadline) = std::time::Instant::now().checked_add(timeout) else {
            // Deadline past the end of the clock: wait without one
            while state.waiting < count {
                self.cond.wait(&mut state);
            }
            return true;
        };
        while state.waiting < count {
            if self.cond.wait_until(&mut state, deadline).timed_out() {
                return state.waiting >= count;
            }
        }
        true
    }
}

impl Sleeper for ManualSleeper {
    fn sleep(&self, _duration: Duration) {
        let mut state = self.state.lock();
        state.waiting += 1;
        // Wake anyone blocked in wait_for_sleepers
        self.cond.notify_all();
        while state.permits == 0 {
            self.cond.wait(&mut state);
        }
        state.permits -= 1;
        state.waiting -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_thread_sleeper_waits() {
        let start = Instant::now();
        ThreadSleeper.sleep(Duration::from_millis(20));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_instant_sleeper_records() {
        let sleeper = InstantSleeper::new();
        assert_eq!(sleeper.calls(), 0);
        assert_eq!(sleeper.last_requested(), None);

        sleeper.sleep(Duration::from_secs(3600));
        sleeper.sleep(Duration::ZERO);

        assert_eq!(sleeper.calls(), 2);
        assert_eq!(sleeper.last_requested(), Some(Duration::ZERO));
    }

    #[test]
    fn test_manual_sleeper_blocks_until_release() {
        let sleeper = Arc::new(ManualSleeper::new());

        let worker = {
            let sleeper = Arc::clone(&sleeper);
            std::thread::spawn(move || sleeper.sleep(Duration::from_secs(3600)))
        };

        assert!(sleeper.wait_for_sleepers(1, Duration::from_secs(5)));
        assert!(!worker.is_finished());

        sleeper.release();
        worker.join().unwrap();
        assert_eq!(sleeper.waiting(), 0);
    }

    #[test]
    fn test_manual_sleeper_permit_before_sleep() {
        let sleeper = ManualSleeper::new();
        sleeper.release();
        // Permit already available, returns at once
        sleeper.sleep(Duration::from_secs(3600));
        assert_eq!(sleeper.waiting(), 0);
    }

    #[test]
    fn test_wait_for_sleepers_unbounded_timeout() {
        let sleeper = Arc::new(ManualSleeper::new());

        let worker = {
            let sleeper = Arc::clone(&sleeper);
            std::thread::spawn(move || sleeper.sleep(Duration::ZERO))
        };

        assert!(sleeper.wait_for_sleepers(1, Duration::MAX));
        sleeper.release();
        worker.join().unwrap();
    }

    #[test]
    fn test_wait_for_sleepers_times_out() {
        let sleeper = ManualSleeper::new();
        assert!(!sleeper.wait_for_sleepers(1, Duration::from_millis(10)));
    }
}
