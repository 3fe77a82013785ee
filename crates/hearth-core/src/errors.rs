//! Unified error system for Hearth
//!
//! Two layers: `StoreError` is what the remote boundary returns, `SyncError`
//! is the user-facing fault a coordinator records when an optimistic write is
//! rolled back. Coordinators never propagate either past their own boundary;
//! they convert store failures into `SyncError` and park it in the shared
//! fault sink.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned by the remote authoritative store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum StoreError {
    /// The store refused the operation (validation, permission, constraint)
    #[error("rejected: {message}")]
    Rejected {
        /// Description of the rejection
        message: String,
    },

    /// The store could not be reached
    #[error("unavailable: {message}")]
    Unavailable {
        /// Description of the transport failure
        message: String,
    },

    /// The addressed row or procedure does not exist
    #[error("not found: {message}")]
    NotFound {
        /// Description of what was missing
        message: String,
    },

    /// A payload could not be encoded or decoded
    #[error("serialization: {message}")]
    Serialization {
        /// Description of the serialization failure
        message: String,
    },
}

impl StoreError {
    /// Create a rejection error
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// The remote operation a fault originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemoteOp {
    /// Row select for a full collection reload
    Select,
    /// Row insert
    Insert,
    /// Row update
    Update,
    /// Row delete (single or bulk)
    Delete,
    /// Named remote procedure
    Call,
    /// Change-stream subscription
    Subscribe,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Call => "call",
            Self::Subscribe => "subscribe",
        };
        write!(f, "{name}")
    }
}

/// User-facing synchronization fault
///
/// Recorded in the shared fault sink when a mutation is rolled back or a
/// precondition fails. The next successful remote operation clears it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SyncError {
    /// The remote store rejected an optimistic mutation
    #[error("{operation} rejected by remote: {reason}")]
    RemoteRejected {
        /// Which operation was refused
        operation: RemoteOp,
        /// The store's stated reason
        reason: String,
    },

    /// A mutation was attempted with no signed-in user
    #[error("not signed in")]
    NotAuthenticated,

    /// A mutation was attempted with no attached household
    #[error("no active household")]
    NoHousehold,
}

impl SyncError {
    /// Wrap a store failure as a user-facing fault
    pub fn remote_rejected(operation: RemoteOp, err: &StoreError) -> Self {
        Self::RemoteRejected {
            operation,
            reason: err.to_string(),
        }
    }

    /// Which remote operation produced this fault, if any
    pub fn operation(&self) -> Option<RemoteOp> {
        match self {
            Self::RemoteRejected { operation, .. } => Some(*operation),
            Self::NotAuthenticated | Self::NoHousehold => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn store_error_display() {
        let err = StoreError::rejected("title too long");
        assert_eq!(err.to_string(), "rejected: title too long");
    }

    #[test]
    fn sync_error_wraps_store_error() {
        let store = StoreError::unavailable("connection reset");
        let sync = SyncError::remote_rejected(RemoteOp::Insert, &store);
        assert_matches!(
            &sync,
            SyncError::RemoteRejected {
                operation: RemoteOp::Insert,
                ..
            }
        );
        assert_eq!(sync.operation(), Some(RemoteOp::Insert));
        assert_eq!(
            sync.to_string(),
            "insert rejected by remote: unavailable: connection reset"
        );
    }

    #[test]
    fn precondition_faults_have_no_operation() {
        assert_eq!(SyncError::NotAuthenticated.operation(), None);
        assert_eq!(SyncError::NoHousehold.operation(), None);
    }
}
