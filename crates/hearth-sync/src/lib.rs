//! Hearth Sync - Optimistic mutation coordination
//!
//! This crate keeps a local collection responsive while a remote
//! authoritative store and other household members mutate the same rows
//! concurrently. Every mutation applies locally first, synchronously, then
//! reconciles with the remote outcome:
//!
//! - `MutationCoordinator` owns one observable collection and runs the
//!   create/update/remove/reload protocol against a `CollectionStore`.
//! - `WriteDebouncer` coalesces rapid-fire field edits into one remote write
//!   per record, with owned timers that cancel on removal and teardown.
//! - `ChangeRelay` turns payload-free change notices into reloads.
//! - `FaultSink` is the shared last-error slot; coordinator methods never
//!   return errors, they record them here and roll the local state back.
//!
//! # Consistency Model
//!
//! Last-write-wins against the remote store. Reloads are versioned: a reload
//! that lost a race to any local write is discarded (compare-and-swap on the
//! collection version), and the next change notice converges the state. No
//! merge beyond that is attempted.

#![forbid(unsafe_code)]

/// Sync tuning knobs
pub mod config;

/// MutationCoordinator: the per-collection optimistic mutation engine
pub mod coordinator;

/// Per-record debounce timers for coalesced field writes
pub mod debounce;

/// Shared user-facing fault slot
pub mod faults;

/// Change-notice to reload bridging
pub mod relay;

pub use config::SyncConfig;
pub use coordinator::{CollectionReloader, MutationCoordinator};
pub use debounce::WriteDebouncer;
pub use faults::FaultSink;
pub use relay::ChangeRelay;
