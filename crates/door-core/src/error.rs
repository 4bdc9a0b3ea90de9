//! Error types for the timed door

use std::time::Duration;

use thiserror::Error;

/// Timed door errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DoorError {
    /// A timeout notification found the door still open
    #[error("Door has been open for too long: grace period of {grace_period:?} exceeded")]
    GracePeriodExceeded { grace_period: Duration },

    /// The timer thread could not be started or died without a result
    #[error("Timer thread error: {0}")]
    TimerThread(String),
}

impl DoorError {
    /// True for the grace-period violation, false for infrastructure failures
    pub fn is_violation(&self) -> bool {
        matches!(self, DoorError::GracePeriodExceeded { .. })
    }
}

/// Result type for timed door operations
pub type DoorResult<T> = Result<T, DoorError>;
