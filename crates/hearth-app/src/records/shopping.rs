//! Shopping list items

use hearth_core::{HouseholdId, HouseholdRecord, RecordId, RecordPatch};
use serde::{Deserialize, Serialize};

/// One item on the shared shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    /// Record identity
    pub id: RecordId,
    /// Owning household
    pub household: HouseholdId,
    /// What to buy
    pub text: String,
    /// Ticked off in the shop
    pub checked: bool,
    /// Free-form note (brand, quantity, where to find it)
    pub note: String,
}

impl ShoppingItem {
    /// A fresh, unchecked item
    pub fn new(household: HouseholdId, text: impl Into<String>) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            text: text.into(),
            checked: false,
            note: String::new(),
        }
    }
}

impl HouseholdRecord for ShoppingItem {
    const TABLE: &'static str = "shopping_items";
    type Patch = ShoppingItemPatch;

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

/// Partial update to a [`ShoppingItem`]
///
/// Text and note edits coalesce; the checkbox writes through immediately so
/// ticking items off in the shop lands in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItemPatch {
    /// New text, if edited
    pub text: Option<String>,
    /// New checked state, if toggled
    pub checked: Option<bool>,
    /// New note, if edited
    pub note: Option<String>,
}

impl ShoppingItemPatch {
    /// Patch that edits the text
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Patch that sets the checked state
    pub fn checked(checked: bool) -> Self {
        Self {
            checked: Some(checked),
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

impl RecordPatch<ShoppingItem> for ShoppingItemPatch {
    fn apply(&self, record: &mut ShoppingItem) {
        if let Some(text) = &self.text {
            record.text = text.clone();
        }
        if let Some(checked) = self.checked {
            record.checked = checked;
        }
        if let Some(note) = &self.note {
            record.note = note.clone();
        }
    }

    fn merge(&mut self, later: Self) {
        if later.text.is_some() {
            self.text = later.text;
        }
        if later.checked.is_some() {
            self.checked = later.checked;
        }
        if later.note.is_some() {
            self.note = later.note;
        }
    }

    fn snapshot(&self, record: &ShoppingItem) -> Self {
        Self {
            text: self.text.as_ref().map(|_| record.text.clone()),
            checked: self.checked.map(|_| record.checked),
            note: self.note.as_ref().map(|_| record.note.clone()),
        }
    }

    fn is_debounced(&self) -> bool {
        (self.text.is_some() || self.note.is_some()) && self.checked.is_none()
    }

    fn is_empty(&self) -> bool {
        self.text.is_none() && self.checked.is_none() && self.note.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkbox_writes_through_text_coalesces() {
        assert!(ShoppingItemPatch::text("oat milk").is_debounced());
        assert!(ShoppingItemPatch::note("the blue carton").is_debounced());
        assert!(!ShoppingItemPatch::checked(true).is_debounced());
    }

    #[test]
    fn text_and_note_merge_into_one_patch() {
        let mut patch = ShoppingItemPatch::text("oat milk");
        patch.merge(ShoppingItemPatch::note("two cartons"));

        assert!(patch.is_debounced());
        assert_eq!(patch.text.as_deref(), Some("oat milk"));
        assert_eq!(patch.note.as_deref(), Some("two cartons"));
    }
}
