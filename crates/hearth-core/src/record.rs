//! Record and patch traits shared by every synced collection
//!
//! A `HouseholdRecord` is one row of one remote table, always scoped to a
//! household. Its `Patch` type is a partial record: `None` fields are
//! untouched, `Some` fields are written. The mutation coordinator leans on
//! three patch capabilities:
//!
//! - `snapshot` re-reads the patch's fields from a record, which serves both
//!   sides of optimistic sync: capture the pre-image before applying (for
//!   rollback) and recompute the freshest values when a debounced write
//!   finally fires.
//! - `merge` overlays a later patch so a burst of edits folds into one
//!   pending remote write.
//! - `is_debounced` decides whether a patch coalesces in the debounce window
//!   (free-text and other rapid-fire fields) or writes through immediately
//!   (toggles, assignments, schedule changes).

use crate::types::identifiers::{HouseholdId, RecordId};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A partial update to a record of type `R`
pub trait RecordPatch<R>: Clone + Debug + Send + Sync + 'static {
    /// Write the patch's `Some` fields into the record
    fn apply(&self, record: &mut R);

    /// Overlay a later patch; its `Some` fields win
    fn merge(&mut self, later: Self);

    /// A patch with the same field selection, re-read from `record`
    fn snapshot(&self, record: &R) -> Self;

    /// True if every touched field coalesces in the debounce window
    fn is_debounced(&self) -> bool;

    /// True if no field is touched
    fn is_empty(&self) -> bool;
}

/// One row of a synced, household-scoped remote table
pub trait HouseholdRecord:
    Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Remote table name, also the change-notice topic
    const TABLE: &'static str;

    /// The partial-update type for this record
    type Patch: RecordPatch<Self>;

    /// Current identity, local until the first insert resolves
    fn id(&self) -> &RecordId;

    /// Replace the identity (used when promoting a local id)
    fn set_id(&mut self, id: RecordId);

    /// The household this row belongs to
    fn household(&self) -> HouseholdId;
}

/// Patch type for records that are created and deleted but never edited
///
/// Expenses use this: the ledger is append-only apart from deletion, so the
/// patch has no fields and `update` is structurally a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Immutable;

impl<R> RecordPatch<R> for Immutable
where
    R: Send + Sync + 'static,
{
    fn apply(&self, _record: &mut R) {}

    fn merge(&mut self, _later: Self) {}

    fn snapshot(&self, _record: &R) -> Self {
        Immutable
    }

    fn is_debounced(&self) -> bool {
        false
    }

    fn is_empty(&self) -> bool {
        true
    }
}
