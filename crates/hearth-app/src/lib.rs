//! Hearth application core
//!
//! The portable, UI-free heart of the household app: five optimistically
//! synced collections (chores, shopping, pantry, calendar, expenses), the
//! member roster, and pure expense settlement, all exposed as observables
//! over the store seams defined in `hearth-core`.
//!
//! Embedders construct an [`AppCore`] over a backend implementing
//! [`StoreBundle`], sign a user in, attach a household, and bind their views
//! to the workspace's observables.

#![forbid(unsafe_code)]

/// `AppCore`, the session, and the household workspace
pub mod core;

/// Households, members, and join codes
pub mod household;

/// The five synced record types and their patches
pub mod records;

pub use self::core::{AppCore, HouseholdWorkspace, Session, StoreBundle};
pub use self::household::{mint_join_code, roster_ids, Household, Member, MemberRole};
pub use self::records::{
    Chore, ChorePatch, Expense, HouseholdEvent, HouseholdEventPatch, PantryItem, PantryItemPatch,
    ShoppingItem, ShoppingItemPatch,
};
