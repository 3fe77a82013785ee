//! Interfaces to the remote authoritative store
//!
//! Three seams, all implemented outside this crate: typed row access per
//! table (`CollectionStore`), named procedures for cross-entity reads
//! (`ProcedureStore`), and the change-notification channel (`ChangeStream`).
//! The in-memory versions live in `hearth-testkit`; a production backend
//! would wrap its client in the same traits.

use crate::errors::StoreError;
use crate::record::HouseholdRecord;
use crate::types::identifiers::{HouseholdId, RemoteId};
use async_trait::async_trait;
use std::fmt;
use tokio::sync::mpsc;

/// Typed row access for one remote table
///
/// `insert` returns the stored record as the server sees it, carrying the
/// server-assigned id; the coordinator uses it to promote the local
/// placeholder. `delete` takes a slice so bulk clears are one round trip.
#[async_trait]
pub trait CollectionStore<R: HouseholdRecord>: Send + Sync {
    /// Fetch every row belonging to a household
    async fn select(&self, household: HouseholdId) -> Result<Vec<R>, StoreError>;

    /// Insert a row; the returned record carries the server-assigned id
    async fn insert(&self, record: R) -> Result<R, StoreError>;

    /// Apply a partial update to one row
    async fn update(&self, id: &RemoteId, patch: R::Patch) -> Result<(), StoreError>;

    /// Delete one or more rows
    async fn delete(&self, ids: &[RemoteId]) -> Result<(), StoreError>;
}

/// Named remote procedures for reads that span tables
///
/// Arguments and results are JSON values; callers deserialize into their own
/// types. Used for the member roster and household maintenance calls.
#[async_trait]
pub trait ProcedureStore: Send + Sync {
    /// Invoke a named procedure with JSON arguments
    async fn call(
        &self,
        procedure: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, StoreError>;
}

/// A change-notification subscription scope: one table in one household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeTopic {
    /// Remote table name
    pub table: &'static str,
    /// Household whose rows are watched
    pub household: HouseholdId,
}

impl ChangeTopic {
    /// Topic for a record type's table
    pub fn of<R: HouseholdRecord>(household: HouseholdId) -> Self {
        Self {
            table: R::TABLE,
            household,
        }
    }

    /// Topic for an explicitly named table
    pub fn table(table: &'static str, household: HouseholdId) -> Self {
        Self { table, household }
    }
}

impl fmt::Display for ChangeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.table, self.household)
    }
}

/// A payload-free change signal
///
/// Notices carry no row data; every notice means "something in this topic
/// changed, re-fetch if you care". Writers do not learn what changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeNotice;

/// A stream of change notices for one topic
///
/// Wraps a bounded channel. Dropping the feed is the unsubscribe: senders
/// observe the closed channel and remove the subscription.
pub struct ChangeFeed {
    rx: mpsc::Receiver<ChangeNotice>,
}

impl ChangeFeed {
    /// Wrap a receiver handed out by a `ChangeStream` implementation
    pub fn new(rx: mpsc::Receiver<ChangeNotice>) -> Self {
        Self { rx }
    }

    /// Wait for the next notice; `None` when the stream side shut down
    pub async fn next(&mut self) -> Option<ChangeNotice> {
        self.rx.recv().await
    }
}

impl fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeFeed").finish_non_exhaustive()
    }
}

/// The change-notification channel
#[async_trait]
pub trait ChangeStream: Send + Sync {
    /// Open a feed of notices for one topic
    async fn subscribe(&self, topic: ChangeTopic) -> Result<ChangeFeed, StoreError>;
}
