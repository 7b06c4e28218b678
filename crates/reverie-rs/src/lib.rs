//! Public surface for Reverie's creation memory.
//!
//! This crate re-exports the storage and query building blocks and
//! provides a small initialization helper to keep consumer setup
//! consistent. The store is always an explicit, passed-in instance; the
//! caller assembling the workflow owns its lifecycle.

/// Re-export for convenience.
pub use reverie_rs_memory as memory;
/// Re-export for convenience.
pub use reverie_rs_query as query;

pub use reverie_rs_memory::{
    CreationRecord, MemoryError, RecordStore, RecordUpdate, SearchOptions, SortKey,
};
pub use reverie_rs_query::{QueryHandler, QueryResponse, is_retrieval_intent};

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
