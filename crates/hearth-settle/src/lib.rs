//! Hearth Settle - Pure expense settlement
//!
//! Given who paid what and the household roster, compute each member's net
//! position and a short list of transfers that settles the group. No I/O, no
//! async, no shared state: `settle` is a deterministic function of its
//! arguments and is safe to recompute on every read.
//!
//! # Algorithm
//!
//! 1. Total all contributions and derive each roster member's fair share.
//! 2. Net position per member is `paid - share`, rounded half-up to whole
//!    minor units. Rounding happens on the balance, so the balances may sum
//!    to a small non-zero remainder (strictly less than the member count in
//!    magnitude). That slack is intentionally left unsettled.
//! 3. Partition into creditors and debtors, order each by magnitude
//!    descending (stable, so equal balances keep roster order), and match
//!    greedily largest-against-largest until one side runs out.
//!
//! The greedy plan is compact but not guaranteed to be the minimum possible
//! number of transfers; optimal matching is a knapsack-style problem this
//! engine deliberately does not attempt.

#![forbid(unsafe_code)]

/// Per-member net positions and balance rounding
pub mod balance;

/// Greedy transfer matching
pub mod plan;

pub use balance::{member_balances, MemberBalance};
pub use plan::{transfer_plan, Transfer};

use hearth_core::{Amount, MemberId};
use serde::{Deserialize, Serialize};

/// The settled view of a household ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Sum of every contribution
    pub total: Amount,
    /// Net position per roster member, in roster order
    pub balances: Vec<MemberBalance>,
    /// Transfers that settle the group, debtor to creditor
    pub transfers: Vec<Transfer>,
}

impl Settlement {
    /// Net position for one member, if they are on the roster
    pub fn balance_for(&self, member: MemberId) -> Option<Amount> {
        self.balances
            .iter()
            .find(|b| b.member == member)
            .map(|b| b.net)
    }

    /// Sum of all balances: the rounding remainder left unassigned
    pub fn slack(&self) -> Amount {
        self.balances.iter().map(|b| b.net).sum()
    }

    /// True when nobody owes anybody
    pub fn is_settled(&self) -> bool {
        self.transfers.is_empty()
    }
}

/// Settle a ledger against a roster.
///
/// `contributions` is who paid what, in any order, possibly with repeated
/// payers. `roster` fixes both the set of members who share costs and the
/// tie-break order of the output. Contributions from payers absent from the
/// roster still raise the total but earn no credit; callers are expected to
/// pass a roster covering every payer.
pub fn settle(
    contributions: impl IntoIterator<Item = (MemberId, Amount)>,
    roster: &[MemberId],
) -> Settlement {
    let (total, balances) = member_balances(contributions, roster);
    let transfers = transfer_plan(&balances);
    Settlement {
        total,
        balances,
        transfers,
    }
}
