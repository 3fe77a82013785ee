//! Pantry stock tracking

use hearth_core::{HouseholdId, HouseholdRecord, RecordId, RecordPatch};
use serde::{Deserialize, Serialize};

/// One tracked pantry staple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PantryItem {
    /// Record identity
    pub id: RecordId,
    /// Owning household
    pub household: HouseholdId,
    /// What is stocked
    pub name: String,
    /// Units on hand; may go negative while people argue with the stepper
    pub quantity: i32,
    /// Free-form note
    pub note: String,
}

impl PantryItem {
    /// A fresh item with a single unit on hand
    pub fn new(household: HouseholdId, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            name: name.into(),
            quantity: 1,
            note: String::new(),
        }
    }
}

impl HouseholdRecord for PantryItem {
    const TABLE: &'static str = "pantry_items";
    type Patch = PantryItemPatch;

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

/// Partial update to a [`PantryItem`]
///
/// Every field coalesces: names and notes are typed, and the quantity
/// stepper is tapped in quick runs, so a run of +1s becomes one write
/// carrying the final count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PantryItemPatch {
    /// New name, if edited
    pub name: Option<String>,
    /// New quantity, if stepped
    pub quantity: Option<i32>,
    /// New note, if edited
    pub note: Option<String>,
}

impl PantryItemPatch {
    /// Patch that edits the name
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the quantity
    pub fn quantity(quantity: i32) -> Self {
        Self {
            quantity: Some(quantity),
            ..Self::default()
        }
    }

    /// Patch that edits the note
    pub fn note(note: impl Into<String>) -> Self {
        Self {
            note: Some(note.into()),
            ..Self::default()
        }
    }
}

impl RecordPatch<PantryItem> for PantryItemPatch {
    fn apply(&self, record: &mut PantryItem) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            record.quantity = quantity;
        }
        if let Some(note) = &self.note {
            record.note = note.clone();
        }
    }

    fn merge(&mut self, later: Self) {
        if later.name.is_some() {
            self.name = later.name;
        }
        if later.quantity.is_some() {
            self.quantity = later.quantity;
        }
        if later.note.is_some() {
            self.note = later.note;
        }
    }

    fn snapshot(&self, record: &PantryItem) -> Self {
        Self {
            name: self.name.as_ref().map(|_| record.name.clone()),
            quantity: self.quantity.map(|_| record.quantity),
            note: self.note.as_ref().map(|_| record.note.clone()),
        }
    }

    fn is_debounced(&self) -> bool {
        !self.is_empty()
    }

    fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.note.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_coalesces() {
        assert!(PantryItemPatch::name("rice").is_debounced());
        assert!(PantryItemPatch::quantity(3).is_debounced());
        assert!(PantryItemPatch::note("basmati").is_debounced());
        assert!(!PantryItemPatch::default().is_debounced());
    }

    #[test]
    fn stepper_run_merges_to_final_count() {
        let mut patch = PantryItemPatch::quantity(2);
        patch.merge(PantryItemPatch::quantity(3));
        patch.merge(PantryItemPatch::quantity(4));
        assert_eq!(patch.quantity, Some(4));
    }

    #[test]
    fn snapshot_covers_merged_field_set() {
        let mut item = PantryItem::new(HouseholdId::new(), "rice");
        item.quantity = 4;
        item.note = "basmati".to_string();

        let mut patch = PantryItemPatch::quantity(9);
        patch.merge(PantryItemPatch::note("jasmine"));

        let shape = patch.snapshot(&item);
        assert_eq!(shape.quantity, Some(4));
        assert_eq!(shape.note.as_deref(), Some("basmati"));
        assert!(shape.name.is_none());
    }
}
