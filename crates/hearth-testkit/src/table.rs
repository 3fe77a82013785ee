//! In-memory collection store with test instrumentation
//!
//! `MemoryTable<R>` behaves like the authoritative remote table: it assigns
//! remote ids on insert, applies patches, and (when wired to a hub) emits a
//! change notice after every committed write. On top of that it is
//! instrumented for tests: per-operation call counters, fail switches, and
//! hold gates that park an operation mid-flight so optimistic local state
//! can be observed before the remote answers.

use crate::hub::MemoryHub;
use async_trait::async_trait;
use hearth_core::{
    ChangeTopic, CollectionStore, HouseholdId, HouseholdRecord, RecordId, RecordPatch, RemoteId,
    RemoteOp, StoreError,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Which operations are currently held at the gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct GateState {
    select: bool,
    insert: bool,
    update: bool,
    delete: bool,
}

impl GateState {
    fn held(self, op: RemoteOp) -> bool {
        match op {
            RemoteOp::Select => self.select,
            RemoteOp::Insert => self.insert,
            RemoteOp::Update => self.update,
            RemoteOp::Delete => self.delete,
            RemoteOp::Call | RemoteOp::Subscribe => false,
        }
    }

    fn set(&mut self, op: RemoteOp, held: bool) {
        match op {
            RemoteOp::Select => self.select = held,
            RemoteOp::Insert => self.insert = held,
            RemoteOp::Update => self.update = held,
            RemoteOp::Delete => self.delete = held,
            RemoteOp::Call | RemoteOp::Subscribe => {}
        }
    }
}

/// An in-memory [`CollectionStore`] for one record type
pub struct MemoryTable<R: HouseholdRecord> {
    rows: Mutex<Vec<R>>,
    next_id: AtomicU64,
    gate: watch::Sender<GateState>,
    hub: Option<Arc<MemoryHub>>,
    fail_select: AtomicBool,
    fail_insert: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
    select_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    update_calls: AtomicUsize,
    delete_calls: AtomicUsize,
}

impl<R: HouseholdRecord> MemoryTable<R> {
    /// An empty table with no hub wired
    pub fn new() -> Self {
        let (gate, _) = watch::channel(GateState::default());
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            gate,
            hub: None,
            fail_select: AtomicBool::new(false),
            fail_insert: AtomicBool::new(false),
            fail_update: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            select_calls: AtomicUsize::new(0),
            insert_calls: AtomicUsize::new(0),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// An empty table that notifies `hub` after every committed write
    pub fn with_hub(hub: Arc<MemoryHub>) -> Self {
        Self {
            hub: Some(hub),
            ..Self::new()
        }
    }

    /// Park calls of `op` at the gate until [`release`](Self::release)
    pub fn hold(&self, op: RemoteOp) {
        self.gate.send_modify(|g| g.set(op, true));
    }

    /// Let parked and future calls of `op` proceed
    pub fn release(&self, op: RemoteOp) {
        self.gate.send_modify(|g| g.set(op, false));
    }

    /// Make select calls fail with a rejection
    pub fn fail_selects(&self, fail: bool) {
        self.fail_select.store(fail, Ordering::SeqCst);
    }

    /// Make insert calls fail with a rejection
    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    /// Make update calls fail with a rejection
    pub fn fail_updates(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    /// Make delete calls fail with a rejection
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    /// Select calls received so far
    pub fn selects(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    /// Insert calls received so far
    pub fn inserts(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Update calls received so far
    pub fn updates(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Delete calls received so far
    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// Put a row in place without counters, gates, or notices.
    ///
    /// Rows seeded with a local id get a remote one assigned. Returns the
    /// row as stored.
    pub fn seed(&self, mut record: R) -> R {
        if record.id().is_local() {
            record.set_id(self.mint_id());
        }
        self.rows.lock().push(record.clone());
        record
    }

    /// Every stored row
    pub fn rows(&self) -> Vec<R> {
        self.rows.lock().clone()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }

    /// True if no rows are stored
    pub fn is_empty(&self) -> bool {
        self.rows.lock().is_empty()
    }

    fn mint_id(&self) -> RecordId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        RecordId::remote(format!("r{n}"))
    }

    async fn pass_gate(&self, op: RemoteOp) {
        let mut gate = self.gate.subscribe();
        // Err would mean the sender is gone, and the sender lives in self.
        let _ = gate.wait_for(|g| !g.held(op)).await;
    }

    fn notify_for(&self, household: HouseholdId) {
        if let Some(hub) = &self.hub {
            hub.notify(ChangeTopic::of::<R>(household));
        }
    }
}

impl<R: HouseholdRecord> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: HouseholdRecord> CollectionStore<R> for MemoryTable<R> {
    async fn select(&self, household: HouseholdId) -> Result<Vec<R>, StoreError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(RemoteOp::Select).await;
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("selects are failing"));
        }
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|r| r.household() == household)
            .cloned()
            .collect())
    }

    async fn insert(&self, mut record: R) -> Result<R, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(RemoteOp::Insert).await;
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::rejected("inserts are failing"));
        }
        record.set_id(self.mint_id());
        let stored = record.clone();
        self.rows.lock().push(record);
        self.notify_for(stored.household());
        Ok(stored)
    }

    async fn update(&self, id: &RemoteId, patch: R::Patch) -> Result<(), StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(RemoteOp::Update).await;
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(StoreError::rejected("updates are failing"));
        }
        let household = {
            let mut rows = self.rows.lock();
            let Some(row) = rows.iter_mut().find(|r| r.id().as_remote() == Some(id)) else {
                return Err(StoreError::not_found(format!("no row {id}")));
            };
            patch.apply(row);
            row.household()
        };
        self.notify_for(household);
        Ok(())
    }

    async fn delete(&self, ids: &[RemoteId]) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.pass_gate(RemoteOp::Delete).await;
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(StoreError::rejected("deletes are failing"));
        }
        // Unknown ids are ignored; deletes are idempotent remotely.
        let touched = {
            let mut rows = self.rows.lock();
            let mut touched: Vec<HouseholdId> = Vec::new();
            rows.retain(|r| {
                let gone = r.id().as_remote().is_some_and(|rid| ids.contains(rid));
                if gone && !touched.contains(&r.household()) {
                    touched.push(r.household());
                }
                !gone
            });
            touched
        };
        for household in touched {
            self.notify_for(household);
        }
        Ok(())
    }
}

impl<R: HouseholdRecord> std::fmt::Debug for MemoryTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTable")
            .field("table", &R::TABLE)
            .field("rows", &self.len())
            .field("selects", &self.selects())
            .field("inserts", &self.inserts())
            .field("updates", &self.updates())
            .field("deletes", &self.deletes())
            .finish()
    }
}
