//! The shared expense ledger
//!
//! Expenses are append-only apart from deletion. There is no edit flow, so
//! the patch type is [`Immutable`] and `update` never reaches the store.

use hearth_core::{
    now_ms, Amount, EpochMs, HouseholdId, HouseholdRecord, Immutable, MemberId, RecordId,
};
use serde::{Deserialize, Serialize};

/// One paid expense in the household ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Record identity
    pub id: RecordId,
    /// Owning household
    pub household: HouseholdId,
    /// Member who paid
    pub payer: MemberId,
    /// What it was for
    pub title: String,
    /// Amount paid, in minor currency units
    pub amount: Amount,
    /// Member who entered the expense
    pub created_by: MemberId,
    /// When it was entered, epoch milliseconds
    pub created_at: EpochMs,
}

impl Expense {
    /// A fresh expense stamped with the current time
    pub fn new(
        household: HouseholdId,
        payer: MemberId,
        title: impl Into<String>,
        amount: Amount,
        created_by: MemberId,
    ) -> Self {
        Self {
            id: RecordId::fresh(),
            household,
            payer,
            title: title.into(),
            amount,
            created_by,
            created_at: now_ms(),
        }
    }
}

impl HouseholdRecord for Expense {
    const TABLE: &'static str = "expenses";
    type Patch = Immutable;

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
