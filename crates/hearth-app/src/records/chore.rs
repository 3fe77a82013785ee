//! Chores: the shared to-do board
//!
//! The patch split here is the template the other collections follow: text
//! edits coalesce in the debounce window, everything a single tap changes
//! (completion, assignment, scheduling) writes through immediately.

use hearth_core::{EpochMs, HouseholdId, HouseholdRecord, MemberId, RecordId, RecordPatch};
use serde::{Deserialize, Serialize};

/// One chore on the household board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chore {
    /// Record identity
    pub id: RecordId,
    /// Owning household
    pub household: HouseholdId,
    /// What needs doing
    pub text: String,
    /// Completion state
    pub done: bool,
    /// Member responsible, if assigned
    pub assignee: Option<MemberId>,
    /// Due date, if scheduled
    pub due: Option<EpochMs>,
}

impl Chore {
    /// A fresh, open, unassigned chore
    pub fn new(household: HouseholdId, text: impl Into<String>) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            text: text.into(),
            done: false,
            assignee: None,
            due: None,
        }
    }
}

impl HouseholdRecord for Chore {
    const TABLE: &'static str = "chores";
    type Patch = ChorePatch;

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

/// Partial update to a [`Chore`]
///
/// The outer `Option` marks whether a field is touched; for `assignee` and
/// `due` the inner `Option` is the value itself, so `Some(None)` clears.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChorePatch {
    /// New text, if edited
    pub text: Option<String>,
    /// New completion state, if toggled
    pub done: Option<bool>,
    /// New assignee, if changed
    pub assignee: Option<Option<MemberId>>,
    /// New due date, if changed
    pub due: Option<Option<EpochMs>>,
}

impl ChorePatch {
    /// Patch that edits the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that sets completion
    pub fn done(done: bool) -> Self {
        Self {
            done: Some(done),
            ..Self::default()
        }
    }

    /// Patch that assigns or clears the assignee
    pub fn assignee(assignee: Option<MemberId>) -> Self {
        Self {
            assignee: Some(assignee),
            ..Self::default()
        }
    }

    /// Patch that schedules or clears the due date
    pub fn due(due: Option<EpochMs>) -> Self {
        Self {
            due: Some(due),
            ..Self::default()
        }
    }
}

impl RecordPatch<Chore> for ChorePatch {
    fn apply(&self, record: &mut Chore) {
        if let Some(text) = &self.text {
            record.text = text.clone();
        }
        if let Some(done) = self.done {
            record.done = done;
        }
        if let Some(assignee) = self.assignee {
            record.assignee = assignee;
        }
        if let Some(due) = self.due {
            record.due = due;
        }
    }

    fn merge(&mut self, later: Self) {
        if later.text.is_some() {
            self.text = later.text;
        }
        if later.done.is_some() {
            self.done = later.done;
        }
        if later.assignee.is_some() {
            self.assignee = later.assignee;
        }
        if later.due.is_some() {
            self.due = later.due;
        }
    }

    fn snapshot(&self, record: &Chore) -> Self {
        Self {
            text: self.text.as_ref().map(|_| record.text.clone()),
            done: self.done.map(|_| record.done),
            assignee: self.assignee.map(|_| record.assignee),
            due: self.due.map(|_| record.due),
        }
    }

    fn is_debounced(&self) -> bool {
        self.text.is_some()
            && self.done.is_none()
            && self.assignee.is_none()
            && self.due.is_none()
    }

    fn is_empty(&self) -> bool {
        self.text.is_none() && self.done.is_none() && self.assignee.is_none() && self.due.is_none()
    }
}
