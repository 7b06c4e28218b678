//! File-backed durable tier holding the full record mapping.

use crate::codec;
use crate::error::MemoryError;
use crate::model::CreationRecord;
use log::info;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Single source of truth on stable storage.
///
/// The backing file is one JSON document mapping record id to the codec's
/// encoded form. The file is created on first use and replaced atomically
/// on every save.
#[derive(Debug, Clone)]
pub struct DurableStore {
    /// Location of the backing document.
    path: PathBuf,
}

impl DurableStore {
    /// Create a durable store backed by the given file location.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| MemoryError::StoreUnavailable {
                path: path.clone(),
                source,
            })?;
        }
        info!("initialized durable store (path={})", path.display());
        Ok(Self { path })
    }

    /// Location of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path used for atomic replacement.
    fn temp_path(&self) -> PathBuf {
        let mut os = self.path.clone().into_os_string();
        os.push(".tmp");
        PathBuf::from(os)
    }

    /// Load the full record mapping.
    ///
    /// A missing backing file is created empty and yields an empty mapping.
    /// An unreadable file fails with [`MemoryError::StoreUnavailable`]; a
    /// present but undecodable document fails with
    /// [`MemoryError::MalformedRecord`].
    pub fn load(&self) -> Result<BTreeMap<Uuid, CreationRecord>, MemoryError> {
        if !self.path.exists() {
            let empty = BTreeMap::new();
            self.save(&empty)?;
            info!("created new record file (path={})", self.path.display());
            return Ok(empty);
        }
        let raw = fs::read_to_string(&self.path).map_err(|source| {
            MemoryError::StoreUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;
        let document: Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|err| MemoryError::MalformedRecord(format!("record document: {err}")))?;
        let mut records = BTreeMap::new();
        for (key, value) in document {
            let record = codec::decode(value)
                .map_err(|err| MemoryError::MalformedRecord(format!("entry {key}: {err}")))?;
            records.insert(record.id, record);
        }
        Ok(records)
    }

    /// Overwrite the backing document with the full mapping.
    ///
    /// Writes to a temporary sibling first and renames it over the target
    /// so an interrupted save never leaves a half-written document.
    pub fn save(&self, records: &BTreeMap<Uuid, CreationRecord>) -> Result<(), MemoryError> {
        let mut document = Map::new();
        for record in records.values() {
            document.insert(record.id.to_string(), codec::encode(record)?);
        }
        let rendered = serde_json::to_string_pretty(&Value::Object(document))
            .map_err(|err| MemoryError::MalformedRecord(err.to_string()))?;

        let temp_path = self.temp_path();
        let unavailable = |source: std::io::Error| MemoryError::StoreUnavailable {
            path: self.path.clone(),
            source,
        };
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)
                .map_err(unavailable)?;
            file.write_all(rendered.as_bytes()).map_err(unavailable)?;
        }
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(unavailable)?;
        }
        fs::rename(&temp_path, &self.path).map_err(unavailable)?;
        Ok(())
    }

    /// Insert or replace one record, read-modify-write on the whole
    /// document. Callers serialize access behind the record store's lock.
    pub fn upsert(&self, record: &CreationRecord) -> Result<(), MemoryError> {
        let mut records = self.load()?;
        records.insert(record.id, record.clone());
        self.save(&records)
    }

    /// Overwrite the backing document with an empty mapping.
    pub fn clear(&self) -> Result<(), MemoryError> {
        self.save(&BTreeMap::new())
    }
}
