//! Hearth Core - Shared vocabulary for the household coordination stack
//!
//! This crate defines the types every other Hearth crate speaks: identifiers,
//! integer money, the versioned observable primitive, the record/patch traits,
//! and the interfaces to the remote authoritative store. It contains no
//! synchronization logic and no domain records; those live in `hearth-sync`
//! and `hearth-app`.
//!
//! # Architecture Layers
//!
//! ## Vocabulary Types
//! - `HouseholdId`, `UserId`, `MemberId`: entity identifiers
//! - `RecordId`: tagged record identity, `Local(Uuid)` until the remote store
//!   assigns a `Remote(RemoteId)`
//! - `Amount`: money in integer minor units, never floating point
//!
//! ## Reactive Primitive
//! - `Observable<T>`: versioned shared value with poll-based subscriptions,
//!   plus compare-and-swap for race-aware reloads
//!
//! ## Store Interfaces (Pure Signatures)
//! - `CollectionStore<R>`: `select`, `insert`, `update`, `delete`
//! - `ProcedureStore`: named remote procedures for cross-entity reads
//! - `ChangeStream`: payload-free change notices per `(table, household)`

#![forbid(unsafe_code)]

/// Store and sync error taxonomy
pub mod errors;

/// Versioned observable values with poll-based subscriptions
pub mod reactive;

/// Record and patch traits shared by every synced collection
pub mod record;

/// Interfaces to the remote authoritative store
pub mod store;

/// Identifier, money, and time types
pub mod types;

// === Public API Re-exports ===

pub use errors::{RemoteOp, StoreError, SyncError};
pub use reactive::{Observable, Subscription};
pub use record::{HouseholdRecord, Immutable, RecordPatch};
pub use store::{
    ChangeFeed, ChangeNotice, ChangeStream, ChangeTopic, CollectionStore, ProcedureStore,
};
pub use types::identifiers::{HouseholdId, JoinCode, MemberId, RecordId, RemoteId, UserId};
pub use types::money::Amount;
pub use types::time::{now_ms, EpochMs};
