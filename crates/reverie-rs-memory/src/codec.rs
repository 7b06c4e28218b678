//! Durable encoding for creation records.
//!
//! The durable form is a JSON object with the externally-visible field
//! names (`id`, `timestamp`, `date`, `original_prompt`, `enhanced_prompt`,
//! `image_path`, `model_path`, `metadata`). Absent optionals encode as
//! absent keys; unknown extra keys decode without error.

use crate::error::MemoryError;
use crate::model::{CreationRecord, render_date};
use serde_json::Value;

/// Encode a record into its durable JSON form.
pub fn encode(record: &CreationRecord) -> Result<Value, MemoryError> {
    serde_json::to_value(record).map_err(|err| MemoryError::MalformedRecord(err.to_string()))
}

/// Decode a record from its durable JSON form.
///
/// Fails with [`MemoryError::MalformedRecord`] when a required field is
/// missing or mistyped. A missing `date` is re-derived from `timestamp`.
pub fn decode(value: Value) -> Result<CreationRecord, MemoryError> {
    let mut record: CreationRecord = serde_json::from_value(value)
        .map_err(|err| MemoryError::MalformedRecord(err.to_string()))?;
    if record.date.is_empty() {
        record.date = render_date(record.timestamp);
    }
    Ok(record)
}
