//! Test doubles for listeners and guarded resources

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use door_core::{DoorError, DoorResult, TimeoutListener};
use door_runtime::GuardedResource;

/// Listener that counts notifications and answers with a fixed outcome
#[derive(Debug, Default)]
pub struct RecordingListener {
    calls: AtomicUsize,
    fail_with: Option<DoorError>,
}

impl RecordingListener {
    /// Listener that accepts every notification
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Listener that answers every notification with `error`
    pub fn failing(error: DoorError) -> Arc<Self> {
        Arc::new(RecordingListener {
            calls: AtomicUsize::new(0),
            fail_with: Some(error),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TimeoutListener for RecordingListener {
    fn on_timeout(&self) -> DoorResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}

/// Guarded resource whose open/closed answer is set by the test.
/// Counts how often it was queried and how often it signalled.
#[derive(Debug)]
pub struct ScriptedDoor {
    open: AtomicBool,
    grace_period: Duration,
    queries: AtomicUsize,
    violations: AtomicUsize,
}

impl ScriptedDoor {
    pub fn new(open: bool) -> Arc<Self> {
        Arc::new(ScriptedDoor {
            open: AtomicBool::new(open),
            grace_period: Duration::from_secs(5),
            queries: AtomicUsize::new(0),
            violations: AtomicUsize::new(0),
        })
    }

    pub fn set_open(&self, open: bool) {
        self.open.store(open, Ordering::SeqCst);
    }

    /// Number of `is_open` queries
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of `signal_violation` calls
    pub fn violations(&self) -> usize {
        self.violations.load(Ordering::SeqCst)
    }
}

impl GuardedResource for ScriptedDoor {
    fn is_open(&self) -> bool {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.open.load(Ordering::SeqCst)
    }

    fn signal_violation(&self) -> DoorResult<()> {
        self.violations.fetch_add(1, Ordering::SeqCst);
        Err(DoorError::GracePeriodExceeded {
            grace_period: self.grace_period,
        })
    }
}
