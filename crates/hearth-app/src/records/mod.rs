//! The five synced collections of a household
//!
//! Each record type implements [`HouseholdRecord`](hearth_core::HouseholdRecord)
//! with its own patch type; the patch decides which fields coalesce in the
//! debounce window and which write through immediately.

pub mod chore;
pub mod event;
pub mod expense;
pub mod pantry;
pub mod shopping;

pub use chore::{Chore, ChorePatch};
pub use event::{HouseholdEvent, HouseholdEventPatch};
pub use expense::Expense;
pub use pantry::{PantryItem, PantryItemPatch};
pub use shopping::{ShoppingItem, ShoppingItemPatch};
