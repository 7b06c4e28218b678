//! Creation record model shared by the store tiers.

use crate::error::MemoryError;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Metadata key holding the ordered tag list.
pub const TAGS_KEY: &str = "tags";

/// One creation event: prompt in, artifacts out.
///
/// `id` and `timestamp` are assigned once at construction and never change
/// after the record is stored. `date` is a display rendering derived from
/// `timestamp`. Absent optional fields serialize as absent keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreationRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Creation time as unix seconds.
    pub timestamp: f64,
    /// Human-readable rendering of `timestamp`.
    #[serde(default)]
    pub date: String,
    /// The user's unmodified input.
    pub original_prompt: String,
    /// Derived prompt text, absent until enhancement completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_prompt: Option<String>,
    /// Locator for the generated image artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    /// Locator for the generated 3D model artifact.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_path: Option<String>,
    /// Open metadata mapping; `tags` holds an ordered, duplicate-free list.
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl CreationRecord {
    /// Create a record for a new creation event.
    pub fn new(original_prompt: impl Into<String>) -> Result<Self, MemoryError> {
        let original_prompt = original_prompt.into();
        if original_prompt.trim().is_empty() {
            return Err(MemoryError::InvalidRecord(
                "original_prompt must be non-empty".to_string(),
            ));
        }
        let timestamp = now_unix_seconds();
        Ok(Self {
            id: Uuid::new_v4(),
            timestamp,
            date: render_date(timestamp),
            original_prompt,
            enhanced_prompt: None,
            image_path: None,
            model_path: None,
            metadata: Map::new(),
        })
    }

    /// Attach the enhanced prompt.
    pub fn with_enhanced_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.enhanced_prompt = Some(prompt.into());
        self
    }

    /// Attach the image artifact locator.
    pub fn with_image_path(mut self, path: impl Into<String>) -> Self {
        self.image_path = Some(path.into());
        self
    }

    /// Attach the 3D model artifact locator.
    pub fn with_model_path(mut self, path: impl Into<String>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Current tag list, empty when the metadata entry is absent.
    pub fn tags(&self) -> Vec<String> {
        match self.metadata.get(TAGS_KEY) {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(|tag| tag.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Merge tags into the metadata entry, keeping order and dropping
    /// duplicates.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut merged = self.tags();
        for tag in tags {
            let tag = tag.into();
            if !merged.contains(&tag) {
                merged.push(tag);
            }
        }
        self.set_tags(merged);
    }

    /// Replace the tag list, dropping duplicates while keeping first
    /// occurrence order.
    pub fn set_tags(&mut self, tags: Vec<String>) {
        let mut deduped: Vec<Value> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = Value::String(tag);
            if !deduped.contains(&tag) {
                deduped.push(tag);
            }
        }
        self.metadata.insert(TAGS_KEY.to_string(), Value::Array(deduped));
    }

    /// Re-apply the tag invariant after a wholesale metadata replacement.
    pub(crate) fn normalize_tags(&mut self) {
        if matches!(self.metadata.get(TAGS_KEY), Some(Value::Array(_))) {
            self.set_tags(self.tags());
        }
    }

    /// Searchable lower-cased text: prompts plus joined tags.
    pub(crate) fn search_text(&self) -> String {
        let mut text = self.original_prompt.to_lowercase();
        if let Some(enhanced) = &self.enhanced_prompt {
            text.push(' ');
            text.push_str(&enhanced.to_lowercase());
        }
        let tags = self.tags();
        if !tags.is_empty() {
            text.push(' ');
            text.push_str(&tags.join(" ").to_lowercase());
        }
        text
    }
}

/// Current time as unix seconds with sub-second precision.
pub(crate) fn now_unix_seconds() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

/// Render a unix-seconds timestamp as `YYYY-MM-DD HH:MM:SS` UTC.
pub fn render_date(timestamp: f64) -> String {
    let secs = timestamp.floor() as i64;
    let nanos = ((timestamp - secs as f64) * 1_000_000_000.0).max(0.0) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(date) => date.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}
