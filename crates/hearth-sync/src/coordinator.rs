//! Optimistic mutation coordinator for one synced collection
//!
//! A `MutationCoordinator<R>` owns the `Observable<Vec<R>>` for a single
//! table scoped to one household. Every mutation applies to the local
//! collection first, in one atomic step before the remote call is awaited,
//! then reconciles with the remote outcome:
//!
//! - `create` appends under a temporary `RecordId::Local` and swaps the
//!   server-returned record into the same slot on success;
//! - `update` applies the patch at once and either writes through
//!   immediately or coalesces into a per-record debounced write;
//! - `remove` drops the rows and restores the exact prior collection if the
//!   remote delete is rejected;
//! - `reload` is a versioned read: a fetch that lost a race to any local
//!   write is discarded as stale instead of clobbering it.
//!
//! Failures never surface as return values. They roll the local state back
//! and land in the shared [`FaultSink`] for the UI to present.

use crate::config::SyncConfig;
use crate::debounce::WriteDebouncer;
use crate::faults::FaultSink;
use hearth_core::{
    CollectionStore, HouseholdId, HouseholdRecord, Observable, RecordId, RecordPatch, RemoteId,
    RemoteOp, SyncError,
};
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// State carried for a record with a debounced write pending.
///
/// `revert` is the pre-image captured when the burst began and only grows to
/// cover newly touched fields; `fields` marks which fields the flushed write
/// must carry (their values are re-read from the record at fire time).
struct PendingWrite<R: HouseholdRecord> {
    revert: R::Patch,
    fields: R::Patch,
}

struct CoordinatorInner<R: HouseholdRecord> {
    household: HouseholdId,
    store: Arc<dyn CollectionStore<R>>,
    records: Observable<Vec<R>>,
    pending: Mutex<HashMap<RecordId, PendingWrite<R>>>,
    debouncer: WriteDebouncer,
    faults: FaultSink,
    config: SyncConfig,
}

/// Coordinates optimistic local mutations with a remote collection store.
///
/// The coordinator is owned by the workspace that created it and is not
/// `Clone`; cheap reload handles for change-feed bindings come from
/// [`MutationCoordinator::reloader`]. Dropping the coordinator cancels every
/// pending debounce timer.
pub struct MutationCoordinator<R: HouseholdRecord> {
    inner: Arc<CoordinatorInner<R>>,
}

impl<R: HouseholdRecord> MutationCoordinator<R> {
    /// Create a coordinator for one table of one household.
    ///
    /// The collection starts empty; the caller triggers the initial
    /// [`reload`](Self::reload).
    pub fn new(
        store: Arc<dyn CollectionStore<R>>,
        household: HouseholdId,
        faults: FaultSink,
        config: SyncConfig,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                household,
                store,
                records: Observable::new(Vec::new()),
                pending: Mutex::new(HashMap::new()),
                debouncer: WriteDebouncer::new(),
                faults,
                config,
            }),
        }
    }

    /// The observable collection this coordinator maintains
    pub fn records(&self) -> &Observable<Vec<R>> {
        &self.inner.records
    }

    /// Clone of the current collection contents
    pub fn snapshot(&self) -> Vec<R> {
        self.inner.records.get()
    }

    /// The household this coordinator is scoped to
    pub fn household(&self) -> HouseholdId {
        self.inner.household
    }

    /// A cloneable handle that can trigger reloads without owning the
    /// coordinator. Used by change-feed bindings.
    pub fn reloader(&self) -> CollectionReloader<R> {
        CollectionReloader {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Create a record optimistically.
    ///
    /// The record becomes visible under a temporary local id before the
    /// remote insert is awaited. On success the stored record replaces the
    /// placeholder in its slot, matched by the temporary id so reordering
    /// cannot misattach it. On failure the placeholder is removed.
    pub async fn create(&self, mut record: R) {
        debug_assert_eq!(record.household(), self.inner.household);
        let temp = RecordId::fresh();
        record.set_id(temp.clone());
        self.inner.records.modify(|rows| rows.push(record.clone()));
        debug!(table = R::TABLE, id = %temp, "optimistic create");

        match self.inner.store.insert(record).await {
            Ok(stored) => {
                self.inner.records.modify(|rows| {
                    if let Some(row) = rows.iter_mut().find(|r| r.id() == &temp) {
                        *row = stored;
                    }
                });
                self.discard_pending(&temp);
                self.inner.faults.clear();
            }
            Err(error) => {
                warn!(table = R::TABLE, id = %temp, %error, "create rejected, rolling back");
                self.inner.records.modify(|rows| rows.retain(|r| r.id() != &temp));
                self.discard_pending(&temp);
                self.inner
                    .faults
                    .record(SyncError::remote_rejected(RemoteOp::Insert, &error));
            }
        }
    }

    /// Patch a record optimistically.
    ///
    /// The patch applies to the local record at once. Debounce-eligible
    /// patches coalesce per record id and flush after the configured delay
    /// with values re-read from current local state, so out of a burst of
    /// edits exactly one remote write fires and it carries the final values.
    /// Everything else writes through immediately.
    pub async fn update(&self, id: &RecordId, patch: R::Patch) {
        if patch.is_empty() {
            return;
        }

        let mut pre_image: Option<R::Patch> = None;
        self.inner.records.modify(|rows| {
            if let Some(row) = rows.iter_mut().find(|r| r.id() == id) {
                pre_image = Some(patch.snapshot(row));
                patch.apply(row);
            }
        });
        let Some(revert) = pre_image else {
            debug!(table = R::TABLE, %id, "update for unknown record dropped");
            return;
        };

        if patch.is_debounced() {
            {
                let mut pending = self.inner.pending.lock();
                match pending.entry(id.clone()) {
                    Entry::Occupied(mut slot) => {
                        let entry = slot.get_mut();
                        // The snapshot taken when the burst began wins for
                        // fields both cover; new fields extend it.
                        let mut merged = revert;
                        merged.merge(entry.revert.clone());
                        entry.revert = merged;
                        entry.fields.merge(patch);
                    }
                    Entry::Vacant(slot) => {
                        slot.insert(PendingWrite {
                            revert,
                            fields: patch,
                        });
                    }
                }
            }
            let inner = Arc::clone(&self.inner);
            let flush_key = id.clone();
            self.inner.debouncer.schedule(
                id.clone(),
                self.inner.config.debounce_delay,
                async move {
                    CoordinatorInner::flush_pending(inner, flush_key).await;
                },
            );
            trace!(table = R::TABLE, %id, "debounced update armed");
        } else {
            self.send_update(id, revert, &patch).await;
        }
    }

    /// Remove one record. See [`remove_many`](Self::remove_many).
    pub async fn remove(&self, id: &RecordId) {
        self.remove_many(std::slice::from_ref(id)).await;
    }

    /// Remove records optimistically.
    ///
    /// The rows disappear at once and any debounced write pending for them
    /// is cancelled. If the remote delete is rejected the exact prior
    /// collection is restored, order included. Ids that are still local have
    /// nothing durable to delete; removing only those never calls out.
    pub async fn remove_many(&self, ids: &[RecordId]) {
        if ids.is_empty() {
            return;
        }
        for id in ids {
            self.discard_pending(id);
        }

        let mut prior: Vec<R> = Vec::new();
        self.inner.records.modify(|rows| {
            prior = rows.clone();
            rows.retain(|r| !ids.contains(r.id()));
        });
        debug!(table = R::TABLE, count = ids.len(), "optimistic remove");

        let remote_ids: Vec<RemoteId> =
            ids.iter().filter_map(|id| id.as_remote().cloned()).collect();
        if remote_ids.is_empty() {
            trace!(table = R::TABLE, "removal touched only unsynced records");
            return;
        }

        match self.inner.store.delete(&remote_ids).await {
            Ok(()) => self.inner.faults.clear(),
            Err(error) => {
                warn!(table = R::TABLE, %error, "delete rejected, restoring collection");
                self.inner.records.set(prior);
                self.inner
                    .faults
                    .record(SyncError::remote_rejected(RemoteOp::Delete, &error));
            }
        }
    }

    /// Re-fetch the collection from the remote store.
    ///
    /// The fetch is versioned: if any local write commits while it is in
    /// flight the result is discarded as stale. An applied reload keeps
    /// records that only exist locally, appended after the fresh rows.
    pub async fn reload(&self) {
        self.inner.reload().await;
    }

    /// Cancel every pending debounced write and drop their pending state.
    ///
    /// Called on workspace teardown so no write fires after the owning view
    /// is gone. Dropping the coordinator does the same.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Immediate write-through path for non-debounced patches.
    async fn send_update(&self, id: &RecordId, revert: R::Patch, patch: &R::Patch) {
        let RecordId::Remote(remote) = id else {
            trace!(table = R::TABLE, %id, "update for unsynced record stays local");
            return;
        };
        match self.inner.store.update(remote, patch.clone()).await {
            Ok(()) => self.inner.faults.clear(),
            Err(error) => {
                warn!(table = R::TABLE, %id, %error, "update rejected, reverting fields");
                self.inner.records.modify(|rows| {
                    if let Some(row) = rows.iter_mut().find(|r| r.id() == id) {
                        revert.apply(row);
                    }
                });
                self.inner
                    .faults
                    .record(SyncError::remote_rejected(RemoteOp::Update, &error));
            }
        }
    }

    fn discard_pending(&self, id: &RecordId) {
        self.inner.debouncer.cancel(id);
        self.inner.pending.lock().remove(id);
    }
}

impl<R: HouseholdRecord> CoordinatorInner<R> {
    /// Flush the coalesced write for `key`, invoked by its debounce timer.
    async fn flush_pending(inner: Arc<Self>, key: RecordId) {
        let Some(entry) = inner.pending.lock().remove(&key) else {
            return;
        };
        let Some(record) = inner.records.get().into_iter().find(|r| r.id() == &key) else {
            return;
        };
        let RecordId::Remote(remote) = &key else {
            trace!(table = R::TABLE, id = %key, "debounced write for unsynced record skipped");
            return;
        };

        // Values come from the record as it is now, not as it was when the
        // burst began, so the latest edits win.
        let payload = entry.fields.snapshot(&record);
        match inner.store.update(remote, payload).await {
            Ok(()) => inner.faults.clear(),
            Err(error) => {
                warn!(
                    table = R::TABLE,
                    id = %key,
                    %error,
                    "debounced update rejected, reverting fields"
                );
                inner.records.modify(|rows| {
                    if let Some(row) = rows.iter_mut().find(|r| r.id() == &key) {
                        entry.revert.apply(row);
                    }
                });
                inner
                    .faults
                    .record(SyncError::remote_rejected(RemoteOp::Update, &error));
            }
        }
    }

    async fn reload(&self) {
        let basis = self.records.version();
        debug!(table = R::TABLE, household = %self.household, "reload");
        match self.store.select(self.household).await {
            Ok(fresh) => {
                self.faults.clear();
                let mut merged = fresh;
                let locals: Vec<R> = self
                    .records
                    .get()
                    .into_iter()
                    .filter(|r| r.id().is_local())
                    .collect();
                merged.extend(locals);
                if !self.records.set_if_version(basis, merged) {
                    debug!(table = R::TABLE, "stale reload discarded");
                }
            }
            Err(error) => {
                warn!(table = R::TABLE, %error, "reload failed");
                self.faults
                    .record(SyncError::remote_rejected(RemoteOp::Select, &error));
            }
        }
    }

    fn shutdown(&self) {
        self.debouncer.cancel_all();
        self.pending.lock().clear();
    }
}

impl<R: HouseholdRecord> Drop for MutationCoordinator<R> {
    fn drop(&mut self) {
        self.inner.shutdown();
    }
}

impl<R: HouseholdRecord> std::fmt::Debug for MutationCoordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationCoordinator")
            .field("table", &R::TABLE)
            .field("household", &self.inner.household)
            .field("records", &self.inner.records.get().len())
            .field("pending", &self.inner.pending.lock().len())
            .finish()
    }
}

/// Cloneable handle that triggers reloads on a coordinator's collection.
///
/// Change-feed bindings hold one of these instead of the coordinator itself;
/// the coordinator stays solely owned by its workspace.
pub struct CollectionReloader<R: HouseholdRecord> {
    inner: Arc<CoordinatorInner<R>>,
}

impl<R: HouseholdRecord> CollectionReloader<R> {
    /// See [`MutationCoordinator::reload`].
    pub async fn reload(&self) {
        self.inner.reload().await;
    }

    /// The household the underlying collection is scoped to
    pub fn household(&self) -> HouseholdId {
        self.inner.household
    }
}

impl<R: HouseholdRecord> Clone for CollectionReloader<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: HouseholdRecord> std::fmt::Debug for CollectionReloader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionReloader")
            .field("table", &R::TABLE)
            .field("household", &self.inner.household)
            .finish()
    }
}
