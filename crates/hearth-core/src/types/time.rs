//! Wall-clock timestamps as epoch milliseconds
//!
//! The remote store speaks integer milliseconds since the Unix epoch, so
//! record fields use the same representation end to end.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch
pub type EpochMs = u64;

/// Current wall-clock time in epoch milliseconds
pub fn now_ms() -> EpochMs {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}
