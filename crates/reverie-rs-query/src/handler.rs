//! Answers retrieval requests against the record store.

use crate::inspect::{ArtifactInspector, FsArtifactInspector};
use crate::interpreter;
use log::info;
use reverie_rs_memory::codec;
use reverie_rs_memory::{CreationRecord, MemoryError, RecordStore, RecordUpdate, SearchOptions, SortKey};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

/// Result of one processed retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResponse {
    /// Encoded records enriched with artifact convenience fields.
    pub entries: Vec<Value>,
    /// Human-readable outcome line.
    pub summary: String,
}

/// Orchestrates the interpreter and the record store.
pub struct QueryHandler {
    /// Authoritative record store, injected by whoever assembles the
    /// workflow.
    store: Arc<RecordStore>,
    /// Artifact fact lookup for result enrichment.
    inspector: Box<dyn ArtifactInspector>,
}

impl QueryHandler {
    /// Create a handler that inspects artifacts on the local filesystem.
    pub fn new(store: Arc<RecordStore>) -> Self {
        Self::with_inspector(store, Box::new(FsArtifactInspector))
    }

    /// Create a handler with a custom artifact inspector.
    pub fn with_inspector(store: Arc<RecordStore>, inspector: Box<dyn ArtifactInspector>) -> Self {
        Self { store, inspector }
    }

    /// Interpret a retrieval request, search, and format the outcome.
    pub fn process_query(&self, prompt: &str) -> Result<QueryResponse, MemoryError> {
        let parsed = interpreter::parse(prompt);

        // Set semantics: each distinct term contributes once to the query.
        let mut unique_terms: Vec<&str> = Vec::new();
        for term in &parsed.search_terms {
            if !unique_terms.contains(&term.as_str()) {
                unique_terms.push(term);
            }
        }
        let query = if unique_terms.is_empty() {
            None
        } else {
            Some(unique_terms.join(" "))
        };
        info!(
            "processing retrieval request (terms={:?}, limit={}, descending={})",
            unique_terms, parsed.limit, parsed.descending
        );

        let records = self.store.search(&SearchOptions {
            query,
            limit: parsed.limit,
            sort_key: SortKey::CreatedAt,
            descending: parsed.descending,
        });

        let mut entries = Vec::with_capacity(records.len());
        for record in &records {
            entries.push(self.enrich(record)?);
        }

        let listed_terms = unique_terms.join(", ");
        let summary = match (entries.is_empty(), unique_terms.is_empty()) {
            (false, false) => format!(
                "Found {} creations matching '{listed_terms}'",
                entries.len()
            ),
            (false, true) => format!("Retrieved {} recent creations", entries.len()),
            (true, false) => format!("No creations found matching '{listed_terms}'"),
            (true, true) => "No previous creations found".to_string(),
        };
        Ok(QueryResponse { entries, summary })
    }

    /// Merge tags into a record without duplicates and persist the result.
    ///
    /// Returns `Ok(None)` when the id is unknown.
    pub fn add_tags(
        &self,
        id: &Uuid,
        tags: &[String],
    ) -> Result<Option<CreationRecord>, MemoryError> {
        let Some(mut record) = self.store.retrieve(id) else {
            return Ok(None);
        };
        record.add_tags(tags.iter().cloned());
        self.store
            .update(id, vec![RecordUpdate::Metadata(record.metadata)])
    }

    /// Encode a record and attach artifact convenience fields.
    fn enrich(&self, record: &CreationRecord) -> Result<Value, MemoryError> {
        let mut entry = codec::encode(record)?;
        if let Some(path) = &record.image_path {
            let artifact = self.inspector.inspect(path);
            entry["image_exists"] = json!(artifact.exists);
            entry["image_size"] = json!(artifact.size);
        }
        if let Some(path) = &record.model_path {
            let artifact = self.inspector.inspect(path);
            entry["model_exists"] = json!(artifact.exists);
            entry["model_size"] = json!(artifact.size);
        }
        Ok(entry)
    }
}
