//! Per-record debounce timers for coalesced field writes
//!
//! Each coordinator owns one `WriteDebouncer`. Scheduling under a key that
//! already has a pending timer replaces it, so from N rapid edits only the
//! last armed timer fires. Timers are real task handles: cancellation aborts the
//! task, and dropping the debouncer cancels everything still pending, which
//! is what guarantees no write fires after its collection is gone.

use hearth_core::RecordId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// A pending timer: the task handle plus the generation that armed it.
struct TimerSlot {
    seq: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct TimerRegistry {
    timers: Mutex<HashMap<RecordId, TimerSlot>>,
}

impl TimerRegistry {
    /// A fired timer claims its slot before running. The claim fails if the
    /// slot was replaced or cancelled while the timer slept, in which case
    /// the action must not run.
    fn claim(&self, key: &RecordId, seq: u64) -> bool {
        let mut timers = self.timers.lock();
        match timers.get(key) {
            Some(slot) if slot.seq == seq => {
                timers.remove(key);
                true
            }
            _ => false,
        }
    }
}

/// Replace-not-stack debounce timers keyed by record id
pub struct WriteDebouncer {
    registry: Arc<TimerRegistry>,
    next_seq: AtomicU64,
}

impl WriteDebouncer {
    /// Create an empty timer registry
    pub fn new() -> Self {
        Self {
            registry: Arc::new(TimerRegistry::default()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Arm (or re-arm) the timer for `key`.
    ///
    /// Any previously pending timer for the same key is aborted; `action`
    /// runs once `delay` passes without another `schedule` or `cancel` for
    /// the key.
    pub fn schedule<F>(&self, key: RecordId, delay: Duration, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.registry);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if registry.claim(&task_key, seq) {
                action.await;
            }
        });

        let mut timers = self.registry.timers.lock();
        if let Some(previous) = timers.insert(key.clone(), TimerSlot { seq, handle }) {
            trace!(%key, "debounce timer re-armed");
            previous.handle.abort();
        }
    }

    /// Cancel the pending timer for `key`, if any.
    ///
    /// Returns `true` if a timer was pending. A timer that already claimed
    /// its slot is past cancellation; its write is in flight.
    pub fn cancel(&self, key: &RecordId) -> bool {
        let removed = self.registry.timers.lock().remove(key);
        match removed {
            Some(slot) => {
                trace!(%key, "debounce timer cancelled");
                slot.handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer.
    pub fn cancel_all(&self) {
        let mut timers = self.registry.timers.lock();
        for (_, slot) in timers.drain() {
            slot.handle.abort();
        }
    }

    /// Number of timers currently pending
    pub fn pending(&self) -> usize {
        self.registry.timers.lock().len()
    }

    /// True if a timer is pending for `key`
    pub fn is_scheduled(&self, key: &RecordId) -> bool {
        self.registry.timers.lock().contains_key(key)
    }
}

impl Default for WriteDebouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for WriteDebouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for WriteDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteDebouncer")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn key() -> RecordId {
        RecordId::fresh()
    }

    #[tokio::test(start_paused = true)]
    async fn last_schedule_wins() {
        let debouncer = WriteDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let k = key();

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(k.clone(), Duration::from_millis(100), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(debouncer.pending(), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_firing() {
        let debouncer = WriteDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let k = key();

        {
            let fired = Arc::clone(&fired);
            debouncer.schedule(k.clone(), Duration::from_millis(100), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(debouncer.cancel(&k));
        assert!(!debouncer.is_scheduled(&k));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let debouncer = WriteDebouncer::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let fired = Arc::clone(&fired);
            debouncer.schedule(key(), Duration::from_millis(50), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(debouncer.pending(), 2);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels_pending_timers() {
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let debouncer = WriteDebouncer::new();
            let fired = Arc::clone(&fired);
            debouncer.schedule(key(), Duration::from_millis(100), async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
