//! Timeout listener contract

use std::sync::Arc;

use crate::DoorResult;

/// Receives the one-shot notification of a timer.
///
/// The listener's result is handed back to whoever drove the timer, so a
/// violation detected inside `on_timeout` surfaces at the timer's call site.
pub trait TimeoutListener: Send + Sync {
    fn on_timeout(&self) -> DoorResult<()>;
}

impl<L: TimeoutListener + ?Sized> TimeoutListener for Arc<L> {
    fn on_timeout(&self) -> DoorResult<()> {
        (**self).on_timeout()
    }
}
