//! Retrieval-side companion to `reverie-rs-memory`.
//!
//! Turns free-text requests into structured searches against the record
//! store and formats the results for presentation.

pub mod classifier;
pub mod handler;
pub mod inspect;
pub mod interpreter;

/// Retrieval intent detection.
pub use classifier::is_retrieval_intent;
/// Query orchestration and response shape.
pub use handler::{QueryHandler, QueryResponse};
/// Artifact inspection seam.
pub use inspect::{ArtifactInfo, ArtifactInspector, FsArtifactInspector};
/// Request interpretation.
pub use interpreter::{ParsedQuery, parse};
