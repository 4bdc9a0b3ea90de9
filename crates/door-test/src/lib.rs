//! Timed Door Test Harness
//!
//! This crate provides:
//! - Test doubles for listeners and guarded resources
//! - A manually triggered timer
//! - End-to-end door scenarios

pub mod doubles;
pub mod integration;
pub mod manual_timer;

pub use doubles::*;
pub use integration::*;
pub use manual_timer::*;
