//! Timed Door Runtime - grace-period enforcement
//!
//! Opening a `TimedDoor` arms a one-shot timer on its own thread. When the
//! grace period elapses the timer notifies the door's `DoorTimerAdapter`,
//! which checks the live door state and raises
//! `DoorError::GracePeriodExceeded` if the door is still open.
//!
//! Closing a door never cancels an armed timer; the timer still fires and
//! simply finds the door closed.

pub mod adapter;
pub mod config;
pub mod door;

pub use adapter::*;
pub use config::*;
pub use door::*;
