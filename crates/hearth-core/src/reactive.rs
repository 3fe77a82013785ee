//! Observable<T> - A reactive value with change notifications
//!
//! `Observable<T>` wraps a value and provides subscription-based change
//! notification. It is the primitive beneath every synced collection: the UI
//! polls subscriptions, and the sync layer uses the version counter to detect
//! when a reload lost a race to a local write.
//!
//! # Runtime Agnostic Design
//!
//! This module uses only std primitives (RwLock, AtomicU64) to remain
//! runtime-agnostic. Higher layers wrap subscriptions in async adapters if
//! needed.

// RwLock poisoning only follows a panic elsewhere and has no recovery path.
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Inner state of an Observable value.
struct ObservableInner<T> {
    /// The current value, protected by RwLock for sync access.
    value: RwLock<T>,
    /// Version counter incremented on each committed write.
    version: AtomicU64,
}

/// A reactive value that can be observed for changes.
///
/// `Observable<T>` provides:
/// - `get()`: Synchronously read the current value
/// - `set()` / `modify()`: Commit a new value and bump the version
/// - `set_if_version()`: Commit only if no write landed in between
/// - `subscribe()`: Get a `Subscription` for polling changes
///
/// # Thread Safety
///
/// `Observable<T>` is `Send + Sync` and can be safely shared across threads.
/// Clones share the same underlying value.
///
/// # Versioning
///
/// Every committed write increments the version exactly once. A reader that
/// captures the version before an async gap can hand it to
/// `set_if_version()` afterwards: the write is applied only if nothing else
/// committed in the meantime, which is how stale collection reloads are
/// detected and discarded.
#[derive(Clone)]
pub struct Observable<T> {
    inner: Arc<ObservableInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
    /// Create a new Observable with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(ObservableInner {
                value: RwLock::new(value),
                version: AtomicU64::new(0),
            }),
        }
    }

    /// Get the current value.
    ///
    /// This is a synchronous operation that clones the value.
    pub fn get(&self) -> T {
        self.inner
            .value
            .read()
            .expect("Observable lock poisoned")
            .clone()
    }

    /// Get the current version number.
    pub fn version(&self) -> u64 {
        self.inner.version.load(Ordering::Acquire)
    }

    /// Set a new value and increment the version.
    ///
    /// Subscriptions will see the new value on their next `poll()` call.
    pub fn set(&self, value: T) {
        let mut guard = self.inner.value.write().expect("Observable lock poisoned");
        *guard = value;
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Mutate the value in place under the write lock.
    ///
    /// The whole read-modify-write is one atomic step with a single version
    /// bump; no intermediate state is observable. This is what coordinators
    /// use to apply an optimistic mutation before awaiting the remote call.
    pub fn modify<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let mut guard = self.inner.value.write().expect("Observable lock poisoned");
        f(&mut guard);
        self.inner.version.fetch_add(1, Ordering::Release);
    }

    /// Set the value only if the version still equals `expected`.
    ///
    /// Returns `true` if the write was applied. A `false` return means some
    /// other write committed after `expected` was captured; the caller's
    /// value is stale and is dropped.
    pub fn set_if_version(&self, expected: u64, value: T) -> bool {
        let mut guard = self.inner.value.write().expect("Observable lock poisoned");
        if self.inner.version.load(Ordering::Acquire) != expected {
            return false;
        }
        *guard = value;
        self.inner.version.fetch_add(1, Ordering::Release);
        true
    }

    /// Subscribe to value changes.
    ///
    /// Returns a `Subscription` that can poll for changes. The subscription
    /// tracks the version it last saw and returns new values when the
    /// Observable has been updated.
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            source: self.inner.clone(),
            last_version: self.inner.version.load(Ordering::Acquire),
        }
    }
}

impl<T: Clone + Send + Sync + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + Send + Sync + std::fmt::Debug + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.get())
            .field("version", &self.version())
            .finish()
    }
}

/// A subscription to an Observable value for polling changes.
///
/// `Subscription` tracks the version it last observed and provides
/// polling-based change detection. Rapid writes coalesce: a poll after
/// several writes returns only the latest value.
pub struct Subscription<T> {
    source: Arc<ObservableInner<T>>,
    last_version: u64,
}

impl<T: Clone + Send + Sync + 'static> Subscription<T> {
    /// Check if the source has changed since the last poll.
    pub fn has_changed(&self) -> bool {
        self.source.version.load(Ordering::Acquire) > self.last_version
    }

    /// Poll for a new value.
    ///
    /// Returns `Some(value)` if the source has been updated since the last
    /// poll, updating the subscription's tracked version. Returns `None` if
    /// no change.
    pub fn poll(&mut self) -> Option<T> {
        let current_version = self.source.version.load(Ordering::Acquire);
        if current_version > self.last_version {
            self.last_version = current_version;
            Some(
                self.source
                    .value
                    .read()
                    .expect("Observable lock poisoned")
                    .clone(),
            )
        } else {
            None
        }
    }

    /// Get the current value regardless of whether it changed.
    pub fn get(&self) -> T {
        self.source
            .value
            .read()
            .expect("Observable lock poisoned")
            .clone()
    }
}
