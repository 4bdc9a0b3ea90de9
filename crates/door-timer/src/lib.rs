//! Timed Door Timer - one-shot delayed notifications
//!
//! This crate implements the timer side of the system:
//! - `Sleeper`: the waiting step, swappable for test doubles
//! - `TimerService`: waits, then notifies a single listener exactly once

pub mod service;
pub mod sleeper;

pub use service::*;
pub use sleeper::*;
