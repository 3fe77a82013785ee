//! Shared scaffolding for the integration tests
//!
//! `Note` is the smallest record that exercises both write paths: `body` is
//! debounced free text, `pinned` is a write-through toggle.

// Each integration test crate compiles this module separately and uses a
// different slice of it.
#![allow(dead_code)]

use hearth_core::{CollectionStore, HouseholdId, HouseholdRecord, RecordId, RecordPatch};
use hearth_sync::{FaultSink, MutationCoordinator, SyncConfig};
use hearth_testkit::MemoryTable;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: RecordId,
    pub household: HouseholdId,
    pub body: String,
    pub pinned: bool,
}

impl Note {
    pub fn new(household: HouseholdId, body: impl Into<String>) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            body: body.into(),
            pinned: false,
        }
    }
}

impl HouseholdRecord for Note {
    const TABLE: &'static str = "notes";
    type Patch = NotePatch;

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn household(&self) -> HouseholdId {
        self.household
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotePatch {
    pub body: Option<String>,
    pub pinned: Option<bool>,
}

impl NotePatch {
    pub fn body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn pinned(pinned: bool) -> Self {
        Self {
            pinned: Some(pinned),
            ..Self::default()
        }
    }
}

impl RecordPatch<Note> for NotePatch {
    fn apply(&self, record: &mut Note) {
        if let Some(body) = &self.body {
            record.body = body.clone();
        }
        if let Some(pinned) = self.pinned {
            record.pinned = pinned;
        }
    }

    fn merge(&mut self, later: Self) {
        if later.body.is_some() {
            self.body = later.body;
        }
        if later.pinned.is_some() {
            self.pinned = later.pinned;
        }
    }

    fn snapshot(&self, record: &Note) -> Self {
        Self {
            body: self.body.as_ref().map(|_| record.body.clone()),
            pinned: self.pinned.map(|_| record.pinned),
        }
    }

    fn is_debounced(&self) -> bool {
        self.body.is_some() && self.pinned.is_none()
    }

    fn is_empty(&self) -> bool {
        self.body.is_none() && self.pinned.is_none()
    }
}

pub struct Rig {
    pub table: Arc<MemoryTable<Note>>,
    pub coordinator: Arc<MutationCoordinator<Note>>,
    pub faults: FaultSink,
    pub household: HouseholdId,
}

/// A coordinator over a fresh table, default config
pub fn rig() -> Rig {
    hearth_testkit::init_tracing();
    let household = HouseholdId::new();
    let table = Arc::new(MemoryTable::new());
    let faults = FaultSink::new();
    let coordinator = Arc::new(MutationCoordinator::new(
        table.clone() as Arc<dyn CollectionStore<Note>>,
        household,
        faults.clone(),
        SyncConfig::default(),
    ));
    Rig {
        table,
        coordinator,
        faults,
        household,
    }
}
