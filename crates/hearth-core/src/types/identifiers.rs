//! Core identifier types used across the Hearth stack
//!
//! This module provides the identifier types that uniquely identify
//! households, users, members, and synced records.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Household identifier
///
/// Every synced record belongs to exactly one household; coordinators and
/// change subscriptions are scoped by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HouseholdId(pub Uuid);

impl HouseholdId {
    /// Create a new random household ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for HouseholdId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HouseholdId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "household-{}", self.0)
    }
}

impl From<Uuid> for HouseholdId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<HouseholdId> for Uuid {
    fn from(id: HouseholdId) -> Self {
        id.0
    }
}

/// Authenticated user identifier
///
/// Issued by the external session layer; the core only records it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

impl From<Uuid> for UserId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<UserId> for Uuid {
    fn from(id: UserId) -> Self {
        id.0
    }
}

/// Household membership identifier
///
/// Identifies one user's membership in one household. Expense ledgers and
/// settlement plans are keyed by member, not by user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(pub Uuid);

impl MemberId {
    /// Create a new random member ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "member-{}", self.0)
    }
}

impl From<Uuid> for MemberId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<MemberId> for Uuid {
    fn from(id: MemberId) -> Self {
        id.0
    }
}

/// Server-assigned record identifier
///
/// Opaque to the client; the authoritative store owns the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RemoteId(pub String);

impl RemoteId {
    /// Create a remote ID from a server-provided value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RemoteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for RemoteId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Identity of a synced record
///
/// A record minted locally carries `Local` until the remote insert resolves,
/// at which point the coordinator swaps in the server's `Remote` id. The two
/// arms cannot collide, so "is this row confirmed?" is an exhaustive match
/// rather than a string-prefix convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordId {
    /// Client-minted placeholder, never seen by the remote store
    Local(Uuid),
    /// Server-assigned durable identity
    Remote(RemoteId),
}

impl RecordId {
    /// Mint a fresh local placeholder id
    pub fn fresh() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// Wrap a server-assigned id
    pub fn remote(id: impl Into<String>) -> Self {
        Self::Remote(RemoteId::new(id))
    }

    /// True while the record awaits its first successful insert
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    /// True once the remote store has assigned an identity
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// The server-assigned id, if confirmed
    pub fn as_remote(&self) -> Option<&RemoteId> {
        match self {
            Self::Local(_) => None,
            Self::Remote(id) => Some(id),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(uuid) => write!(f, "local-{uuid}"),
            Self::Remote(id) => write!(f, "{id}"),
        }
    }
}

impl From<RemoteId> for RecordId {
    fn from(id: RemoteId) -> Self {
        Self::Remote(id)
    }
}

/// Opaque household join token
///
/// Provisioned by the external membership layer; carried here so views can
/// display and share it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinCode(pub String);

impl JoinCode {
    /// Wrap an issued join code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JoinCode {
    fn from(code: &str) -> Self {
        Self(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_record_ids_are_local_and_distinct() {
        let a = RecordId::fresh();
        let b = RecordId::fresh();
        assert!(a.is_local());
        assert!(!a.is_remote());
        assert_ne!(a, b);
    }

    #[test]
    fn remote_record_id_round_trips_inner() {
        let id = RecordId::remote("r42");
        assert!(id.is_remote());
        assert_eq!(id.as_remote().map(RemoteId::as_str), Some("r42"));
        assert_eq!(id.to_string(), "r42");
    }

    #[test]
    fn local_and_remote_never_compare_equal() {
        let uuid = Uuid::new_v4();
        let local = RecordId::Local(uuid);
        let remote = RecordId::remote(uuid.to_string());
        assert_ne!(local, remote);
    }

    #[test]
    fn display_prefixes() {
        let household = HouseholdId::new();
        assert!(household.to_string().starts_with("household-"));
        let member = MemberId::new();
        assert!(member.to_string().starts_with("member-"));
    }
}
