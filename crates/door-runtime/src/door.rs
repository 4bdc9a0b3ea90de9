//! Timed Door - a door that must not stay open past its grace period

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use door_core::{DoorError, DoorResult, DoorState, StateCell, TimeoutListener};
use door_timer::{Sleeper, ThreadSleeper, TimerService};

use crate::{DoorConfig, DoorTimerAdapter, GuardedResource};

/// State shared between a door and the timers armed on it.
/// Owned by the `TimedDoor`; timers reach it only through a weak handle.
#[derive(Debug)]
pub struct SharedDoor {
    state: StateCell,
    grace_period: Duration,
    violations: AtomicU64,
}

impl SharedDoor {
    fn new(grace_period: Duration) -> Self {
        SharedDoor {
            state: StateCell::new(),
            grace_period,
            violations: AtomicU64::new(0),
        }
    }
}

impl GuardedResource for SharedDoor {
    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn signal_violation(&self) -> DoorResult<()> {
        self.violations.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(grace_period = ?self.grace_period, "door held open past its grace period");
        Err(DoorError::GracePeriodExceeded {
            grace_period: self.grace_period,
        })
    }
}

/// Door with grace-period enforcement.
///
/// INVARIANT: closed after construction and after every `close()`.
pub struct TimedDoor {
    shared: Arc<SharedDoor>,
    adapter: Arc<DoorTimerAdapter<SharedDoor>>,
    sleeper: Arc<dyn Sleeper>,
    config: DoorConfig,
}

impl TimedDoor {
    /// Create a door with the given grace period, arming real-time timers
    pub fn new(grace_period: Duration) -> Self {
        Self::with_config(DoorConfig::with_grace_period(grace_period))
    }

    /// Create a door from a configuration, arming real-time timers
    pub fn with_config(config: DoorConfig) -> Self {
        Self::with_sleeper(config, Arc::new(ThreadSleeper))
    }

    /// Create a door whose timers wait through `sleeper`
    pub fn with_sleeper(config: DoorConfig, sleeper: Arc<dyn Sleeper>) -> Self {
        let shared = Arc::new(SharedDoor::new(config.grace_period));
        let adapter = Arc::new(DoorTimerAdapter::new(&shared));

        TimedDoor {
            shared,
            adapter,
            sleeper,
            config,
        }
    }

    /// Open (unlock) the door.
    ///
    /// Arms an independent timer for the grace period unless the config
    /// disables arming. Opening an open door arms another timer; earlier ones
    /// stay in flight. The returned handle may be dropped to detach.
    ///
    /// If the timer thread cannot be spawned the door is still open but
    /// nothing is armed. The failure is logged and `join()` on the returned
    /// handle reports `DoorError::TimerThread`; a caller that drops the
    /// handle sees only the log line.
    pub fn open(&self) -> ArmedTimeout {
        let previous = self.shared.state.open();
        tracing::debug!(from = %previous, grace_period = ?self.shared.grace_period, "door opened");

        if !self.config.arm_on_open {
            return ArmedTimeout::disarmed();
        }
        self.arm()
    }

    /// Close (lock) the door. Armed timers are not cancelled.
    pub fn close(&self) {
        let previous = self.shared.state.close();
        tracing::debug!(from = %previous, "door closed");
    }

    pub fn is_open(&self) -> bool {
        self.shared.state.is_open()
    }

    pub fn state(&self) -> DoorState {
        self.shared.state.state()
    }

    pub fn grace_period(&self) -> Duration {
        self.shared.grace_period
    }

    /// Raise the grace-period violation. Always an error.
    pub fn signal_violation(&self) -> DoorResult<()> {
        self.shared.signal_violation()
    }

    /// Listener to register on externally driven timers
    pub fn adapter(&self) -> Arc<DoorTimerAdapter<SharedDoor>> {
        Arc::clone(&self.adapter)
    }

    /// Violations signalled so far, whether or not anyone joined the timer
    pub fn violation_count(&self) -> u64 {
        self.shared.violations.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &DoorConfig {
        &self.config
    }

    fn arm(&self) -> ArmedTimeout {
        let timer = TimerService::with_sleeper(Arc::clone(&self.sleeper));
        let listener: Arc<dyn TimeoutListener> = self.adapter.clone();
        let grace_period = self.shared.grace_period;

        let spawned = thread::Builder::new()
            .name(self.config.timer_thread_name.clone())
            .spawn(move || {
                let result = timer.register(grace_period, listener);
                if let Err(e) = &result {
                    tracing::error!(error = %e, "armed timeout reported a violation");
                }
                result
            });

        match spawned {
            Ok(handle) => {
                tracing::debug!(?grace_period, "timeout armed");
                ArmedTimeout {
                    inner: Armed::Running(handle),
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn timer thread");
                ArmedTimeout {
                    inner: Armed::Failed(DoorError::TimerThread(e.to_string())),
                }
            }
        }
    }
}

impl GuardedResource for TimedDoor {
    fn is_open(&self) -> bool {
        TimedDoor::is_open(self)
    }

    fn signal_violation(&self) -> DoorResult<()> {
        TimedDoor::signal_violation(self)
    }
}

impl std::fmt::Debug for TimedDoor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimedDoor")
            .field("state", &self.state())
            .field("grace_period", &self.shared.grace_period)
            .field("violations", &self.violation_count())
            .finish()
    }
}

/// Handle to the timer armed by one `open()`
#[derive(Debug)]
pub struct ArmedTimeout {
    inner: Armed,
}

#[derive(Debug)]
enum Armed {
    Disarmed,
    Running(JoinHandle<DoorResult<()>>),
    Failed(DoorError),
}

impl ArmedTimeout {
    fn disarmed() -> Self {
        ArmedTimeout {
            inner: Armed::Disarmed,
        }
    }

    /// Whether a timer thread was started
    pub fn is_armed(&self) -> bool {
        matches!(self.inner, Armed::Running(_))
    }

    /// Whether the notification has been delivered (always true when
    /// nothing was armed)
    pub fn is_finished(&self) -> bool {
        match &self.inner {
            Armed::Running(handle) => handle.is_finished(),
            Armed::Disarmed | Armed::Failed(_) => true,
        }
    }

    /// Block until the timer fires and return the notification result
    pub fn join(self) -> DoorResult<()> {
        match self.inner {
            Armed::Disarmed => Ok(()),
            Armed::Failed(e) => Err(e),
            Armed::Running(handle) => handle
                .join()
                .map_err(|_| DoorError::TimerThread("timer thread panicked".to_string()))?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use door_timer::{InstantSleeper, ManualSleeper};
    use proptest::prelude::*;

    const WAIT: Duration = Duration::from_secs(5);

    fn manual_door(grace_period: Duration) -> (TimedDoor, Arc<ManualSleeper>) {
        let sleeper = Arc::new(ManualSleeper::new());
        let door = TimedDoor::with_sleeper(
            DoorConfig::with_grace_period(grace_period),
            sleeper.clone(),
        );
        (door, sleeper)
    }

    #[test]
    fn test_initial_state() {
        let door = TimedDoor::with_config(DoorConfig::disarmed());
        assert!(!door.is_open());
        assert_eq!(door.state(), DoorState::Closed);
        assert_eq!(door.grace_period(), Duration::from_secs(5));
        assert_eq!(door.violation_count(), 0);
    }

    #[test]
    fn test_open_then_close() {
        let door = TimedDoor::with_config(DoorConfig::disarmed());

        let armed = door.open();
        assert!(!armed.is_armed());
        assert!(door.is_open());

        door.close();
        assert!(!door.is_open());

        door.close();
        assert!(!door.is_open());
    }

    #[test]
    fn test_signal_violation_always_fails() {
        let door = TimedDoor::with_config(DoorConfig::disarmed());
        let err = door.signal_violation().unwrap_err();
        assert_eq!(
            err,
            DoorError::GracePeriodExceeded {
                grace_period: Duration::from_secs(5)
            }
        );
        assert_eq!(door.violation_count(), 1);
    }

    #[test]
    fn test_open_does_not_block() {
        let (door, sleeper) = manual_door(Duration::from_secs(3600));

        let armed = door.open();
        assert!(armed.is_armed());
        assert!(door.is_open());

        assert!(sleeper.wait_for_sleepers(1, WAIT));
        assert!(!armed.is_finished());

        door.close();
        sleeper.release();
        assert!(armed.join().is_ok());
    }

    #[test]
    fn test_violation_when_left_open() {
        let (door, sleeper) = manual_door(Duration::from_secs(1));

        let armed = door.open();
        sleeper.release();

        let err = armed.join().unwrap_err();
        assert!(err.is_violation());
        assert_eq!(door.violation_count(), 1);
        // Violation is an event, not a state
        assert!(door.is_open());
    }

    #[test]
    fn test_close_does_not_cancel_timer() {
        let (door, sleeper) = manual_door(Duration::from_secs(1));

        let armed = door.open();
        assert!(sleeper.wait_for_sleepers(1, WAIT));
        door.close();

        // Timer is still pending after close
        assert!(!armed.is_finished());
        sleeper.release();

        assert!(armed.join().is_ok());
        assert_eq!(door.violation_count(), 0);
    }

    #[test]
    fn test_reopen_arms_independent_timers() {
        let (door, sleeper) = manual_door(Duration::from_secs(1));

        let first = door.open();
        let second = door.open();
        assert!(sleeper.wait_for_sleepers(2, WAIT));

        sleeper.release();
        sleeper.release();

        assert!(first.join().is_err());
        assert!(second.join().is_err());
        assert_eq!(door.violation_count(), 2);
    }

    #[test]
    fn test_dropped_door_timer_is_noop() {
        let (door, sleeper) = manual_door(Duration::from_secs(1));

        let armed = door.open();
        let adapter = door.adapter();
        drop(door);

        assert!(!adapter.is_bound());
        sleeper.release();
        assert!(armed.join().is_ok());
    }

    #[test]
    fn test_zero_grace_period_fails_immediately() {
        let door = TimedDoor::with_sleeper(
            DoorConfig::with_grace_period(Duration::ZERO),
            Arc::new(InstantSleeper::new()),
        );

        assert!(door.open().join().unwrap_err().is_violation());
    }

    #[test]
    fn test_real_timer_thread() {
        let door = TimedDoor::new(Duration::from_millis(20));

        let armed = door.open();
        assert!(armed.join().unwrap_err().is_violation());

        let door = TimedDoor::new(Duration::from_millis(200));
        let armed = door.open();
        door.close();
        assert!(armed.join().is_ok());
    }

    #[test]
    fn test_adapter_drives_external_timer() {
        let door = TimedDoor::with_config(DoorConfig::disarmed());
        let timer = TimerService::with_sleeper(Arc::new(InstantSleeper::new()));

        door.open();
        assert!(timer.register(Duration::ZERO, door.adapter()).is_err());

        door.close();
        assert!(timer.register(Duration::ZERO, door.adapter()).is_ok());
    }

    #[test]
    fn test_adapter_bound_to_door_itself() {
        let door = Arc::new(TimedDoor::with_config(DoorConfig::disarmed()));
        let adapter = DoorTimerAdapter::new(&door);

        door.open();
        assert!(adapter.on_timeout().unwrap_err().is_violation());
        assert_eq!(door.violation_count(), 1);

        door.close();
        assert!(adapter.on_timeout().is_ok());
        assert_eq!(door.violation_count(), 1);

        drop(door);
        assert!(!adapter.is_bound());
        assert!(adapter.on_timeout().is_ok());
    }

    proptest! {
        #[test]
        fn prop_state_matches_last_call(ops in proptest::collection::vec(any::<bool>(), 0..32)) {
            let door = TimedDoor::with_config(DoorConfig::disarmed());
            for &open in &ops {
                if open {
                    door.open();
                } else {
                    door.close();
                }
            }
            prop_assert_eq!(door.is_open(), ops.last().copied().unwrap_or(false));
        }
    }
}
