//! In-memory change-notice fan-out

use async_trait::async_trait;
use hearth_core::{ChangeFeed, ChangeNotice, ChangeStream, ChangeTopic, StoreError};
use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::trace;

/// Notice buffer per feed; notices are edge signals, so small is plenty.
const FEED_BUFFER: usize = 16;

/// An in-memory [`ChangeStream`]: subscribers per topic, fan-out on notify
///
/// Closed feeds are swept on the next notify, which matches the contract
/// that dropping a feed is the unsubscribe.
#[derive(Default)]
pub struct MemoryHub {
    topics: Mutex<HashMap<ChangeTopic, Vec<mpsc::Sender<ChangeNotice>>>>,
}

impl MemoryHub {
    /// An empty hub
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one notice to every live subscriber of `topic`.
    pub fn notify(&self, topic: ChangeTopic) {
        let mut topics = self.topics.lock();
        if let Some(senders) = topics.get_mut(&topic) {
            senders.retain(|tx| !tx.is_closed());
            trace!(%topic, listeners = senders.len(), "notify");
            for tx in senders.iter() {
                // A full buffer already has a notice queued; the signal is
                // level-less, so the extra one carries no information.
                let _ = tx.try_send(ChangeNotice);
            }
        }
    }

    /// Number of live subscribers for `topic`
    pub fn listeners(&self, topic: ChangeTopic) -> usize {
        let mut topics = self.topics.lock();
        match topics.get_mut(&topic) {
            Some(senders) => {
                senders.retain(|tx| !tx.is_closed());
                senders.len()
            }
            None => 0,
        }
    }
}

#[async_trait]
impl ChangeStream for MemoryHub {
    async fn subscribe(&self, topic: ChangeTopic) -> Result<ChangeFeed, StoreError> {
        let (tx, rx) = mpsc::channel(FEED_BUFFER);
        self.topics.lock().entry(topic).or_default().push(tx);
        Ok(ChangeFeed::new(rx))
    }
}

impl std::fmt::Debug for MemoryHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryHub")
            .field("topics", &self.topics.lock().len())
            .finish()
    }
}
