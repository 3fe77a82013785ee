//! Shared user-facing fault slot
//!
//! One slot for the whole app surface: the most recent sync fault, or `None`.
//! Coordinators record here instead of returning errors, and the next
//! successful remote operation clears the slot. The UI watches it the same
//! way it watches any collection.

use hearth_core::{Observable, SyncError};
use tracing::warn;

/// The shared last-error observable
#[derive(Clone)]
pub struct FaultSink {
    slot: Observable<Option<SyncError>>,
}

impl FaultSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self {
            slot: Observable::new(None),
        }
    }

    /// Record a fault, replacing any previous one
    pub fn record(&self, error: SyncError) {
        warn!(%error, "sync fault recorded");
        self.slot.set(Some(error));
    }

    /// Clear the slot after a successful remote operation
    pub fn clear(&self) {
        if self.slot.get().is_some() {
            self.slot.set(None);
        }
    }

    /// The current fault, if any
    pub fn current(&self) -> Option<SyncError> {
        self.slot.get()
    }

    /// The underlying observable, for UI subscriptions
    pub fn observe(&self) -> &Observable<Option<SyncError>> {
        &self.slot
    }
}

impl Default for FaultSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FaultSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaultSink")
            .field("current", &self.current())
            .finish()
    }
}
