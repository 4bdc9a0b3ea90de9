//! Timed Door Core - Fundamental types and contracts
//!
//! This crate defines the pieces shared by every layer of the system:
//! - Door state (`DoorState`) and its thread-visible cell (`StateCell`)
//! - The timeout listener contract (`TimeoutListener`)
//! - The error type raised when a door outlives its grace period

pub mod error;
pub mod listener;
pub mod state;

pub use error::*;
pub use listener::*;
pub use state::*;
