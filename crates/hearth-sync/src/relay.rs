//! Change-feed bindings that turn remote notices into reloads
//!
//! A `ChangeRelay` holds at most one subscription per topic. Each binding is
//! a spawned task that drains the topic's [`ChangeFeed`] and runs the bound
//! callback once per notice. Notices are payload-free, so the only sensible
//! callback is "re-fetch"; the coordinator's versioned reload makes
//! overlapping or raced fetches harmless.
//!
//! Unbinding (or dropping the relay) aborts the task, which drops the feed,
//! which is the unsubscribe.

use crate::coordinator::MutationCoordinator;
use hearth_core::{ChangeStream, ChangeTopic, HouseholdRecord, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Routes change notices to per-collection reload callbacks
pub struct ChangeRelay {
    stream: Arc<dyn ChangeStream>,
    bindings: Mutex<HashMap<ChangeTopic, JoinHandle<()>>>,
}

impl ChangeRelay {
    /// Create a relay over a change-notification channel
    pub fn new(stream: Arc<dyn ChangeStream>) -> Self {
        Self {
            stream,
            bindings: Mutex::new(HashMap::new()),
        }
    }

    /// Subscribe to `topic` and run `on_change` once per notice.
    ///
    /// Idempotent per topic: a topic that is already bound keeps its
    /// existing binding and this call does nothing.
    pub async fn bind<F, Fut>(&self, topic: ChangeTopic, on_change: F) -> Result<(), StoreError>
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.bindings.lock().contains_key(&topic) {
            trace!(%topic, "topic already bound");
            return Ok(());
        }

        let mut feed = self.stream.subscribe(topic).await?;
        debug!(%topic, "bound change feed");
        let task = tokio::spawn(async move {
            while feed.next().await.is_some() {
                trace!(%topic, "change notice");
                on_change().await;
            }
            debug!(%topic, "change feed closed");
        });

        let mut bindings = self.bindings.lock();
        if bindings.contains_key(&topic) {
            // Lost a bind race for the same topic; the first binding stays.
            task.abort();
        } else {
            bindings.insert(topic, task);
        }
        Ok(())
    }

    /// Bind a coordinator's table: every notice triggers a reload.
    pub async fn bind_collection<R: HouseholdRecord>(
        &self,
        coordinator: &MutationCoordinator<R>,
    ) -> Result<(), StoreError> {
        let topic = ChangeTopic::of::<R>(coordinator.household());
        let reloader = coordinator.reloader();
        self.bind(topic, move || {
            let reloader = reloader.clone();
            async move { reloader.reload().await }
        })
        .await
    }

    /// Drop the binding for `topic`, aborting its task and feed.
    ///
    /// Returns `true` if a binding existed.
    pub fn unbind(&self, topic: ChangeTopic) -> bool {
        match self.bindings.lock().remove(&topic) {
            Some(task) => {
                debug!(%topic, "unbound change feed");
                task.abort();
                true
            }
            None => false,
        }
    }

    /// Drop every binding.
    pub fn unbind_all(&self) {
        let mut bindings = self.bindings.lock();
        for (topic, task) in bindings.drain() {
            trace!(%topic, "unbound change feed");
            task.abort();
        }
    }

    /// True if `topic` currently has a binding
    pub fn is_bound(&self, topic: ChangeTopic) -> bool {
        self.bindings.lock().contains_key(&topic)
    }

    /// Number of live bindings
    pub fn bound(&self) -> usize {
        self.bindings.lock().len()
    }
}

impl Drop for ChangeRelay {
    fn drop(&mut self) {
        self.unbind_all();
    }
}

impl std::fmt::Debug for ChangeRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeRelay")
            .field("bound", &self.bound())
            .finish_non_exhaustive()
    }
}
