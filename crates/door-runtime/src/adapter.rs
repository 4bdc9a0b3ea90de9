//! Adapter from timer notifications to door checks

use std::sync::{Arc, Weak};

use door_core::{DoorResult, TimeoutListener};

/// What the adapter needs from the thing it guards
pub trait GuardedResource: Send + Sync {
    fn is_open(&self) -> bool;

    /// Produce the grace-period violation
    fn signal_violation(&self) -> DoorResult<()>;
}

/// Timeout listener bound to one guarded resource.
///
/// Holds only a weak handle: a resource dropped before the timer fires is
/// never kept alive by it, and the notification becomes a no-op.
pub struct DoorTimerAdapter<R: ?Sized> {
    resource: Weak<R>,
}

impl<R: GuardedResource + ?Sized> DoorTimerAdapter<R> {
    pub fn new(resource: &Arc<R>) -> Self {
        DoorTimerAdapter {
            resource: Arc::downgrade(resource),
        }
    }

    /// Whether the guarded resource is still alive
    pub fn is_bound(&self) -> bool {
        self.resource.strong_count() > 0
    }

    /// Live state of the guarded resource, `None` once it has been dropped
    pub fn resource_open(&self) -> Option<bool> {
        self.resource.upgrade().map(|resource| resource.is_open())
    }
}

impl<R: GuardedResource + ?Sized> TimeoutListener for DoorTimerAdapter<R> {
    fn on_timeout(&self) -> DoorResult<()> {
        let Some(resource) = self.resource.upgrade() else {
            tracing::debug!("timeout fired after the door was dropped");
            return Ok(());
        };

        if resource.is_open() {
            resource.signal_violation()
        } else {
            tracing::trace!("timeout fired on a closed door");
            Ok(())
        }
    }
}

impl<R: ?Sized> std::fmt::Debug for DoorTimerAdapter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DoorTimerAdapter")
            .field("bound", &(self.resource.strong_count() > 0))
            .finish()
    }
}
