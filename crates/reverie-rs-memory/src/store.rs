//! Two-tier record store composing the session cache and the durable file.

use crate::durable::DurableStore;
use crate::error::MemoryError;
use crate::model::CreationRecord;
use crate::session::SessionCache;
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::path::Path;
use uuid::Uuid;

/// Sort key for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Order by creation timestamp.
    #[default]
    CreatedAt,
    /// Order by record id.
    Id,
}

/// Parameters for a record search.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Whitespace-separated terms; any term matching keeps a record.
    /// `None` or an empty string skips filtering entirely.
    pub query: Option<String>,
    /// Maximum number of records returned.
    pub limit: usize,
    /// Field the surviving set is ordered by.
    pub sort_key: SortKey,
    /// Newest-first when true.
    pub descending: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            query: None,
            limit: 10,
            sort_key: SortKey::CreatedAt,
            descending: true,
        }
    }
}

/// One mutation against a stored record.
///
/// The updatable set is closed: everything except `id`, `timestamp` and
/// the derived `date` rendering.
#[derive(Debug, Clone)]
pub enum RecordUpdate {
    /// Replace the original prompt.
    OriginalPrompt(String),
    /// Replace or clear the enhanced prompt.
    EnhancedPrompt(Option<String>),
    /// Replace or clear the image artifact locator.
    ImagePath(Option<String>),
    /// Replace or clear the 3D model artifact locator.
    ModelPath(Option<String>),
    /// Replace the whole metadata mapping.
    Metadata(Map<String, Value>),
}

impl RecordUpdate {
    /// Build an update from an externally-supplied field name and value.
    ///
    /// Unknown and immutable field names are rejected with
    /// [`MemoryError::InvalidRecord`] rather than silently ignored.
    pub fn from_named(field: &str, value: Value) -> Result<Self, MemoryError> {
        let optional_text = |value: Value| match value {
            Value::String(text) => Ok(Some(text)),
            Value::Null => Ok(None),
            other => Err(MemoryError::InvalidRecord(format!(
                "field {field} expects a string, got {other}"
            ))),
        };
        match field {
            "original_prompt" => match value {
                Value::String(text) => Ok(Self::OriginalPrompt(text)),
                other => Err(MemoryError::InvalidRecord(format!(
                    "field original_prompt expects a string, got {other}"
                ))),
            },
            "enhanced_prompt" => Ok(Self::EnhancedPrompt(optional_text(value)?)),
            "image_path" => Ok(Self::ImagePath(optional_text(value)?)),
            "model_path" => Ok(Self::ModelPath(optional_text(value)?)),
            "metadata" => match value {
                Value::Object(map) => Ok(Self::Metadata(map)),
                other => Err(MemoryError::InvalidRecord(format!(
                    "field metadata expects an object, got {other}"
                ))),
            },
            "id" | "timestamp" | "date" => Err(MemoryError::InvalidRecord(format!(
                "field {field} is immutable"
            ))),
            unknown => Err(MemoryError::InvalidRecord(format!(
                "unknown updatable field: {unknown}"
            ))),
        }
    }

    /// Apply the update to a record.
    fn apply(self, record: &mut CreationRecord) {
        match self {
            Self::OriginalPrompt(text) => record.original_prompt = text,
            Self::EnhancedPrompt(text) => record.enhanced_prompt = text,
            Self::ImagePath(path) => record.image_path = path,
            Self::ModelPath(path) => record.model_path = path,
            Self::Metadata(map) => {
                record.metadata = map;
                record.normalize_tags();
            }
        }
    }
}

/// Authoritative record mapping with a read-through session tier.
///
/// All durable read-modify-write sequences run behind one lock so two
/// concurrent writers cannot interleave a load-then-save and lose an
/// update. Session-only reads take just the cache's own lock.
pub struct RecordStore {
    /// Durable backing file.
    durable: DurableStore,
    /// Records touched during this process run.
    session: Mutex<SessionCache>,
    /// Serializes load-modify-save sequences on the durable tier.
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Create a store backed by the given durable file location.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let durable = DurableStore::new(path)?;
        info!(
            "initialized record store (path={})",
            durable.path().display()
        );
        Ok(Self {
            durable,
            session: Mutex::new(SessionCache::new()),
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the durable backing file.
    pub fn path(&self) -> &Path {
        self.durable.path()
    }

    /// Store a record in the session tier and, when `persist` is set, the
    /// durable tier. Returns the record id.
    pub fn store(&self, mut record: CreationRecord, persist: bool) -> Result<Uuid, MemoryError> {
        if record.original_prompt.trim().is_empty() {
            return Err(MemoryError::InvalidRecord(
                "original_prompt must be non-empty".to_string(),
            ));
        }
        record.normalize_tags();
        let id = record.id;
        self.session.lock().put(record.clone());
        if persist {
            let _guard = self.write_lock.lock();
            self.durable.upsert(&record)?;
        }
        debug!("stored record (id={id}, persist={persist})");
        Ok(id)
    }

    /// Retrieve a record by id, session tier first.
    ///
    /// A durable-tier hit populates the session cache before returning. A
    /// corrupt or unreadable durable tier degrades to a miss.
    pub fn retrieve(&self, id: &Uuid) -> Option<CreationRecord> {
        if let Some(record) = self.session.lock().get(id) {
            return Some(record.clone());
        }
        let loaded = {
            let _guard = self.write_lock.lock();
            self.durable.load()
        };
        let records = match loaded {
            Ok(records) => records,
            Err(err) => {
                warn!("retrieve degraded to miss (id={id}): {err}");
                return None;
            }
        };
        let record = records.get(id)?.clone();
        self.session.lock().put(record.clone());
        Some(record)
    }

    /// Search the durable mapping, substituting cached versions for ids
    /// present in both tiers, then filter, sort and truncate.
    ///
    /// A corrupt or unreadable durable tier yields an empty result list.
    pub fn search(&self, options: &SearchOptions) -> Vec<CreationRecord> {
        let loaded = {
            let _guard = self.write_lock.lock();
            self.durable.load()
        };
        let mut records: Vec<CreationRecord> = match loaded {
            Ok(records) => {
                let session = self.session.lock();
                records
                    .into_values()
                    .map(|record| session.get(&record.id).cloned().unwrap_or(record))
                    .collect()
            }
            Err(err) => {
                warn!("search degraded to empty results: {err}");
                return Vec::new();
            }
        };
        debug!(
            "searching records (loaded={}, query={:?}, limit={})",
            records.len(),
            options.query,
            options.limit
        );

        // A present-but-empty query skips filtering, same as no query.
        if let Some(query) = options.query.as_deref() {
            let terms: Vec<String> = query
                .to_lowercase()
                .split_whitespace()
                .map(str::to_string)
                .collect();
            if !terms.is_empty() {
                records.retain(|record| {
                    let text = record.search_text();
                    terms.iter().any(|term| text.contains(term.as_str()))
                });
            }
        }

        // Stable sorts keep tied records in their original relative order.
        match (options.sort_key, options.descending) {
            (SortKey::CreatedAt, false) => {
                records.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            }
            (SortKey::CreatedAt, true) => {
                records.sort_by(|a, b| b.timestamp.total_cmp(&a.timestamp));
            }
            (SortKey::Id, false) => records.sort_by(|a, b| a.id.cmp(&b.id)),
            (SortKey::Id, true) => records.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        records.truncate(options.limit);
        records
    }

    /// The most recently created records, newest first.
    pub fn list_recent(&self, limit: usize) -> Vec<CreationRecord> {
        self.search(&SearchOptions {
            limit,
            ..SearchOptions::default()
        })
    }

    /// Apply updates to a stored record and persist the result.
    ///
    /// Returns `Ok(None)` when the id is unknown.
    pub fn update(
        &self,
        id: &Uuid,
        updates: Vec<RecordUpdate>,
    ) -> Result<Option<CreationRecord>, MemoryError> {
        let Some(mut record) = self.retrieve(id) else {
            return Ok(None);
        };
        for update in updates {
            update.apply(&mut record);
        }
        self.store(record.clone(), true)?;
        Ok(Some(record))
    }

    /// Empty the session tier only.
    pub fn clear_session(&self) {
        self.session.lock().clear();
    }

    /// Empty both tiers. Irreversible; the store stays usable afterwards.
    pub fn clear_all(&self) -> Result<(), MemoryError> {
        let _guard = self.write_lock.lock();
        self.session.lock().clear();
        self.durable.clear()?;
        info!("cleared all records (path={})", self.durable.path().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordStore, RecordUpdate, SearchOptions, SortKey};
    use crate::error::MemoryError;
    use crate::model::CreationRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;
    use uuid::Uuid;

    fn store_at(dir: &std::path::Path) -> RecordStore {
        RecordStore::new(dir.join("memory.json")).expect("store")
    }

    fn record_with_timestamp(prompt: &str, timestamp: f64) -> CreationRecord {
        let mut record = CreationRecord::new(prompt).expect("record");
        record.timestamp = timestamp;
        record
    }

    #[test]
    fn store_then_retrieve_round_trips() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let mut record = CreationRecord::new("a dragon perched on a cliff")
            .expect("record")
            .with_enhanced_prompt("a dragon perched on a cliff, volumetric light")
            .with_image_path("datastore/images/dragon.png");
        record.add_tags(["fantasy"]);

        let id = store.store(record.clone(), true).expect("store");
        assert_eq!(id, record.id);
        assert_eq!(store.retrieve(&id), Some(record));
    }

    #[test]
    fn store_rejects_empty_prompt() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let mut record = CreationRecord::new("placeholder").expect("record");
        record.original_prompt = "  ".to_string();
        let err = store.store(record, true).expect_err("invalid");
        assert!(matches!(err, MemoryError::InvalidRecord(_)));
    }

    #[test]
    fn session_only_store_is_still_retrievable() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let record = CreationRecord::new("a glass tower").expect("record");
        let id = store.store(record.clone(), false).expect("store");

        assert_eq!(store.retrieve(&id), Some(record));
        // The durable tier never saw it.
        let reopened = store_at(temp.path());
        assert_eq!(reopened.retrieve(&id), None);
    }

    #[test]
    fn retrieve_reads_through_to_durable_tier() {
        let temp = tempdir().expect("tempdir");
        let record = CreationRecord::new("a mossy castle").expect("record");
        store_at(temp.path())
            .store(record.clone(), true)
            .expect("store");

        let reopened = store_at(temp.path());
        assert_eq!(reopened.retrieve(&record.id), Some(record.clone()));
        // Second lookup is a session hit even if the file disappears.
        std::fs::remove_file(reopened.path()).expect("remove");
        assert_eq!(reopened.retrieve(&record.id), Some(record));
    }

    #[test]
    fn session_tier_wins_over_durable_on_conflict() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let mut record = CreationRecord::new("a robot in the rain").expect("record");
        store.store(record.clone(), true).expect("persist");

        record.enhanced_prompt = Some("a robot in the rain, neon".to_string());
        store.store(record.clone(), false).expect("session only");

        assert_eq!(store.retrieve(&record.id), Some(record.clone()));
        let results = store.search(&SearchOptions::default());
        assert_eq!(results, vec![record]);
    }

    #[test]
    fn search_matches_any_term_as_substring() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let dragon_a = record_with_timestamp("a dragon in flight", 100.0);
        let dragon_b = record_with_timestamp("sleeping DRAGON hoard", 200.0);
        let other_a = record_with_timestamp("a quiet island", 300.0);
        let other_b = record_with_timestamp("city skyline", 400.0);
        for record in [&dragon_a, &dragon_b, &other_a, &other_b] {
            store.store(record.clone(), true).expect("store");
        }

        let results = store.search(&SearchOptions {
            query: Some("dragon".to_string()),
            limit: 10,
            ..SearchOptions::default()
        });
        assert_eq!(results, vec![dragon_b, dragon_a]);
    }

    #[test]
    fn search_orders_newest_first_and_truncates() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let first = record_with_timestamp("first creation", 100.0);
        let second = record_with_timestamp("second creation", 200.0);
        let third = record_with_timestamp("third creation", 300.0);
        for record in [&first, &second, &third] {
            store.store(record.clone(), true).expect("store");
        }

        let results = store.search(&SearchOptions {
            limit: 2,
            ..SearchOptions::default()
        });
        assert_eq!(results, vec![third, second]);
    }

    #[test]
    fn search_sorts_ascending_by_id() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let a = record_with_timestamp("one", 300.0);
        let b = record_with_timestamp("two", 100.0);
        store.store(a.clone(), true).expect("store");
        store.store(b.clone(), true).expect("store");

        let results = store.search(&SearchOptions {
            sort_key: SortKey::Id,
            descending: false,
            ..SearchOptions::default()
        });
        let mut expected = vec![a, b];
        expected.sort_by(|x, y| x.id.cmp(&y.id));
        assert_eq!(results, expected);
    }

    #[test]
    fn empty_query_string_skips_filtering() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        store
            .store(CreationRecord::new("a dragon").expect("record"), true)
            .expect("store");

        let results = store.search(&SearchOptions {
            query: Some("   ".to_string()),
            ..SearchOptions::default()
        });
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn update_applies_known_fields_and_persists() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let record = CreationRecord::new("a fox spirit").expect("record");
        let id = store.store(record, true).expect("store");

        let metadata = json!({ "tags": ["x", "y"] });
        let updates = vec![
            RecordUpdate::from_named("enhanced_prompt", json!("a fox spirit, ukiyo-e"))
                .expect("update"),
            RecordUpdate::from_named("metadata", metadata).expect("update"),
        ];
        let updated = store.update(&id, updates).expect("update").expect("found");
        assert_eq!(
            updated.enhanced_prompt.as_deref(),
            Some("a fox spirit, ukiyo-e")
        );
        assert_eq!(updated.tags(), vec!["x", "y"]);

        // Visible to a fresh store, so the durable tier was refreshed.
        let reopened = store_at(temp.path());
        assert_eq!(reopened.retrieve(&id), Some(updated));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let result = store.update(&Uuid::new_v4(), Vec::new()).expect("update");
        assert_eq!(result, None);
    }

    #[test]
    fn from_named_rejects_unknown_and_immutable_fields() {
        assert!(matches!(
            RecordUpdate::from_named("favorite_color", json!("blue")),
            Err(MemoryError::InvalidRecord(_))
        ));
        assert!(matches!(
            RecordUpdate::from_named("id", json!("0")),
            Err(MemoryError::InvalidRecord(_))
        ));
        assert!(matches!(
            RecordUpdate::from_named("timestamp", json!(0)),
            Err(MemoryError::InvalidRecord(_))
        ));
    }

    #[test]
    fn clear_all_leaves_a_usable_store() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        store
            .store(CreationRecord::new("a dragon").expect("record"), true)
            .expect("store");
        store.clear_all().expect("clear");

        let results = store.search(&SearchOptions {
            limit: 1000,
            ..SearchOptions::default()
        });
        assert!(results.is_empty());
        store
            .store(CreationRecord::new("after the reset").expect("record"), true)
            .expect("store after clear");
        assert_eq!(store.list_recent(5).len(), 1);
    }

    #[test]
    fn clear_session_keeps_durable_tier() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        let record = CreationRecord::new("a dragon").expect("record");
        let id = store.store(record.clone(), true).expect("store");
        store.clear_session();
        assert_eq!(store.retrieve(&id), Some(record));
    }

    #[test]
    fn corrupt_durable_tier_degrades_reads_and_fails_writes() {
        let temp = tempdir().expect("tempdir");
        let store = store_at(temp.path());
        std::fs::write(store.path(), "not json").expect("corrupt");

        assert_eq!(store.retrieve(&Uuid::new_v4()), None);
        assert!(store.search(&SearchOptions::default()).is_empty());

        let err = store
            .store(CreationRecord::new("a dragon").expect("record"), true)
            .expect_err("write must surface the failure");
        assert!(matches!(err, MemoryError::MalformedRecord(_)));
    }
}
