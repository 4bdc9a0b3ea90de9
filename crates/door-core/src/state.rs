//! Door state primitives
//!
//! A door is either closed or open. The violation that fires when a door
//! stays open too long is an emitted error, never a stored state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Two-state view of a door
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum DoorState {
    #[default]
    Closed,
    Open,
}

impl DoorState {
    #[inline]
    pub fn from_open(open: bool) -> Self {
        if open {
            DoorState::Open
        } else {
            DoorState::Closed
        }
    }

    #[inline]
    pub fn is_open(self) -> bool {
        self == DoorState::Open
    }
}

impl fmt::Display for DoorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DoorState::Closed => f.write_str("closed"),
            DoorState::Open => f.write_str("open"),
        }
    }
}

/// Open/closed flag shared between the door owner and timer threads.
/// INVARIANT: a read on any thread observes the latest completed write.
#[derive(Debug, Default)]
pub struct StateCell {
    open: AtomicBool,
}

impl StateCell {
    /// Create a closed cell
    pub const fn new() -> Self {
        StateCell {
            open: AtomicBool::new(false),
        }
    }

    /// Mark open, returning the previous state
    #[inline]
    pub fn open(&self) -> DoorState {
        DoorState::from_open(self.open.swap(true, Ordering::AcqRel))
    }

    /// Mark closed, returning the previous state
    #[inline]
    pub fn close(&self) -> DoorState {
        DoorState::from_open(self.open.swap(false, Ordering::AcqRel))
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    #[inline]
    pub fn state(&self) -> DoorState {
        DoorState::from_open(self.is_open())
    }
}
