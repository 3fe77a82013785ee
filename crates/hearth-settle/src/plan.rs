//! Greedy transfer matching
//!
//! Creditors and debtors are each ordered by magnitude descending and matched
//! two-pointer style: the largest debt pays into the largest credit, the
//! exhausted side advances. Every emitted transfer is positive and never
//! exceeds either endpoint's remaining imbalance at the moment it is emitted.

use crate::balance::MemberBalance;
use hearth_core::{Amount, MemberId};
use serde::{Deserialize, Serialize};

/// One settling payment, debtor to creditor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    /// Who pays
    pub from: MemberId,
    /// Who receives
    pub to: MemberId,
    /// Always strictly positive
    pub amount: Amount,
}

/// Match debtors against creditors into a compact transfer list.
///
/// The sorts are stable, so members with equal imbalances keep the roster
/// order of `balances`. When the rounding slack leaves one side short, the
/// tail of the longer side simply stays partially unmatched.
pub fn transfer_plan(balances: &[MemberBalance]) -> Vec<Transfer> {
    let mut creditors: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|b| b.net.is_positive())
        .map(|b| (b.member, b.net.minor()))
        .collect();
    let mut debtors: Vec<(MemberId, i64)> = balances
        .iter()
        .filter(|b| b.net.is_negative())
        .map(|b| (b.member, -b.net.minor()))
        .collect();

    creditors.sort_by(|a, b| b.1.cmp(&a.1));
    debtors.sort_by(|a, b| b.1.cmp(&a.1));

    let mut transfers = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < creditors.len() && j < debtors.len() {
        let amount = creditors[i].1.min(debtors[j].1);
        debug_assert!(amount > 0);
        transfers.push(Transfer {
            from: debtors[j].0,
            to: creditors[i].0,
            amount: Amount::new(amount),
        });
        creditors[i].1 -= amount;
        debtors[j].1 -= amount;
        if creditors[i].1 == 0 {
            i += 1;
        }
        if debtors[j].1 == 0 {
            j += 1;
        }
    }

    transfers
}
