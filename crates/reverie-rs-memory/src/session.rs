//! Process-lifetime session tier.

use crate::model::CreationRecord;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory record cache, empty at process start.
///
/// Holds records touched during this run so reads skip the durable file
/// and pending updates stay visible before they are flushed. No eviction:
/// a session is expected to touch at most a few hundred records.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: HashMap<Uuid, CreationRecord>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a record by id.
    pub fn get(&self, id: &Uuid) -> Option<&CreationRecord> {
        self.entries.get(id)
    }

    /// Insert or replace a record.
    pub fn put(&mut self, record: CreationRecord) {
        self.entries.insert(record.id, record);
    }

    /// Drop one record from the cache.
    pub fn invalidate(&mut self, id: &Uuid) {
        self.entries.remove(id);
    }

    /// Drop every cached record.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached records.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
