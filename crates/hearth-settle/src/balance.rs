//! Per-member net positions
//!
//! Balances are computed in integer minor units. The fair share is never
//! materialized as a fraction: each balance is `(n * paid - total) / n`
//! rounded half-up, which equals `round(paid - total / n)` without touching
//! floats.

use hearth_core::{Amount, MemberId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One roster member's net position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberBalance {
    /// Who
    pub member: MemberId,
    /// Positive: the group owes them. Negative: they owe the group.
    pub net: Amount,
}

/// Integer division rounding half-up (ties toward positive infinity).
///
/// `den` must be positive. Ties go up for both signs: 1.5 rounds to 2,
/// -1.5 rounds to -1.
pub(crate) fn round_half_up(num: i64, den: i64) -> i64 {
    debug_assert!(den > 0);
    // floor((num + den/2) / den), written to stay in integers
    (2 * num + den).div_euclid(2 * den)
}

/// Total the ledger and compute each roster member's net position.
///
/// Output order follows `roster`. Contributions from payers not on the
/// roster count toward the total but are credited to nobody.
pub fn member_balances(
    contributions: impl IntoIterator<Item = (MemberId, Amount)>,
    roster: &[MemberId],
) -> (Amount, Vec<MemberBalance>) {
    let mut paid: HashMap<MemberId, i64> = HashMap::with_capacity(roster.len());
    let mut total: i64 = 0;
    for (payer, amount) in contributions {
        total += amount.minor();
        *paid.entry(payer).or_insert(0) += amount.minor();
    }

    let n = roster.len() as i64;
    let balances = roster
        .iter()
        .map(|member| {
            let mine = paid.get(member).copied().unwrap_or(0);
            MemberBalance {
                member: *member,
                net: Amount::new(round_half_up(n * mine - total, n)),
            }
        })
        .collect();

    (Amount::new(total), balances)
}
