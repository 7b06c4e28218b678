//! Two-tier creation memory for Reverie.
//!
//! A creation event becomes a [`CreationRecord`] that lives in a
//! process-lifetime session cache and a write-through JSON file. Reads
//! favor availability and degrade to empty results when the backing file
//! is corrupt; writes surface failures so callers can react.

pub mod codec;
pub mod durable;
pub mod error;
pub mod model;
pub mod session;
pub mod store;

/// Memory error type.
pub use error::MemoryError;
/// Creation record model and date rendering.
pub use model::{CreationRecord, render_date};
/// Durable file tier.
pub use durable::DurableStore;
/// Session tier.
pub use session::SessionCache;
/// Record store and its search/update vocabulary.
pub use store::{RecordStore, RecordUpdate, SearchOptions, SortKey};
