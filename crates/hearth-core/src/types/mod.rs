//! Identifier, money, and time types shared across Hearth crates

pub mod identifiers;
pub mod money;
pub mod time;

pub use identifiers::{HouseholdId, JoinCode, MemberId, RecordId, RemoteId, UserId};
pub use money::Amount;
pub use time::{now_ms, EpochMs};
