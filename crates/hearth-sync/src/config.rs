//! Sync tuning knobs

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by every coordinator in a workspace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet window before a debounced field edit is written remotely
    pub debounce_delay: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(500),
        }
    }
}
