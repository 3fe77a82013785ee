//! In-memory backends and fixtures for exercising the hearth stack
//!
//! Everything here is deterministic and instrumented: tables count their
//! calls, fail on demand, and hold responses at a gate so tests can observe
//! optimistic state while a remote call is still in flight. [`MemoryStores`]
//! bundles the whole backend for app-level tests; the individual pieces
//! compose freely for narrower ones.

#![forbid(unsafe_code)]

pub mod directory;
pub mod fixtures;
pub mod hub;
pub mod stores;
pub mod table;

pub use directory::MemoryDirectory;
pub use fixtures::HouseholdFixture;
pub use hub::MemoryHub;
pub use stores::MemoryStores;
pub use table::MemoryTable;

/// Install the fmt tracing subscriber for a test binary.
///
/// Safe to call from every test; only the first call wins. Filtering
/// honors `RUST_LOG` and defaults to debug for the hearth crates.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hearth_sync=debug,hearth_app=debug,info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
