//! Households, memberships, and the roster
//!
//! Members are not a synced optimistic collection: the roster is served by a
//! remote procedure and refreshed whole, because membership rows span users
//! and carry server-side invariants the client never edits field by field.

use hearth_core::{now_ms, EpochMs, HouseholdId, JoinCode, MemberId, UserId};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of minted join codes
const JOIN_CODE_LEN: usize = 8;

/// Role of a member within a household
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberRole {
    /// Everyday member
    #[default]
    Resident,
    /// Member who can rename the household and manage membership
    Steward,
}

/// One user's membership in one household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Membership identity; ledgers and settlement are keyed by this
    pub id: MemberId,
    /// The authenticated user behind the membership
    pub user: UserId,
    /// Household the membership belongs to
    pub household: HouseholdId,
    /// Name shown across the app
    pub display_name: String,
    /// Role within the household
    pub role: MemberRole,
    /// When the member joined, epoch milliseconds
    pub joined_at: EpochMs,
}

impl Member {
    /// A fresh resident membership
    pub fn new(household: HouseholdId, user: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id: MemberId::new(),
            user,
            household,
            display_name: display_name.into(),
            role: MemberRole::default(),
            joined_at: now_ms(),
        }
    }
}

/// A shared household
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Household {
    /// Household identity
    pub id: HouseholdId,
    /// Display name
    pub name: String,
    /// Token other users redeem to join
    pub join_code: JoinCode,
}

impl Household {
    /// A fresh household with a minted join code
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: HouseholdId::new(),
            name: name.into(),
            join_code: mint_join_code(),
        }
    }
}

/// Mint a random alphanumeric join code
pub fn mint_join_code() -> JoinCode {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(JOIN_CODE_LEN)
        .map(char::from)
        .collect();
    JoinCode::new(code)
}

/// Member ids in roster order
///
/// Roster order is what makes settlement deterministic, so callers pass the
/// roster as served rather than re-sorting it.
pub fn roster_ids(members: &[Member]) -> Vec<MemberId> {
    members.iter().map(|m| m.id).collect()
}
