//! Shared household calendar events

use hearth_core::{EpochMs, HouseholdId, HouseholdRecord, RecordId, RecordPatch};
use serde::{Deserialize, Serialize};

/// One entry on the household calendar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdEvent {
    /// Record identity
    pub id: RecordId,
    /// Owning household
    pub household: HouseholdId,
    /// What is happening
    pub title: String,
    /// Start time, epoch milliseconds
    pub starts_at: EpochMs,
    /// Free-form notes
    pub notes: String,
}

impl HouseholdEvent {
    /// A fresh event
    pub fn new(household: HouseholdId, title: impl Into<String>, starts_at: EpochMs) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            title: title.into(),
            starts_at,
            notes: String::new(),
        }
    }
}

impl HouseholdRecord for HouseholdEvent {
    const TABLE: &'static str = "events";
    type Patch = HouseholdEventPatch;

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

/// Partial update to a [`HouseholdEvent`]
///
/// Title and notes coalesce; a schedule change writes through immediately.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdEventPatch {
    /// New title, if edited
    pub title: Option<String>,
    /// New start time, if rescheduled
    pub starts_at: Option<EpochMs>,
    /// New notes, if edited
    pub notes: Option<String>,
}

impl HouseholdEventPatch {
    /// Patch that edits the title
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Patch that reschedules the event
    pub fn starts_at(starts_at: EpochMs) -> Self {
        Self {
            starts_at: Some(starts_at),
            ..Self::default()
        }
    }

    /// Patch that edits the notes
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Self::default()
        }
    }
}

impl RecordPatch<HouseholdEvent> for HouseholdEventPatch {
    fn apply(&self, record: &mut HouseholdEvent) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(starts_at) = self.starts_at {
            record.starts_at = starts_at;
        }
        if let Some(notes) = &self.notes {
            record.notes = notes.clone();
        }
    }

    fn merge(&mut self, later: Self) {
        if later.title.is_some() {
            self.title = later.title;
        }
        if later.starts_at.is_some() {
            self.starts_at = later.starts_at;
        }
        if later.notes.is_some() {
            self.notes = later.notes;
        }
    }

    fn snapshot(&self, record: &HouseholdEvent) -> Self {
        Self {
            title: self.title.as_ref().map(|_| record.title.clone()),
            starts_at: self.starts_at.map(|_| record.starts_at),
            notes: self.notes.as_ref().map(|_| record.notes.clone()),
        }
    }

    fn is_debounced(&self) -> bool {
        (self.title.is_some() || self.notes.is_some()) && self.starts_at.is_none()
    }

    fn is_empty(&self) -> bool {
        self.title.is_none() && self.starts_at.is_none() && self.notes.is_none()
    }
}
