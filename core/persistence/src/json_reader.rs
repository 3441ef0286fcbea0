// FILENAME: core\persistence\src\json_reader.rs

use crate::PersistenceError;
use engine::RawRecord;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Extracts the record array from a dataset payload.
///
/// Accepted shapes:
/// - `{"data": [...]}` (the data endpoint's response)
/// - `[...]` (a bare export of the collection)
///
/// Anything else, including an object without `data` or with a non-array
/// `data`, is an empty dataset. Non-object entries are kept as empty records
/// so the record count matches the payload.
pub fn parse_payload(payload: Value) -> Vec<RawRecord> {
    let items = match payload {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items.into_iter().map(RawRecord::from_value).collect()
}

/// Parses payload text. Only malformed JSON is an error.
pub fn parse_payload_str(text: &str) -> Result<Vec<RawRecord>, PersistenceError> {
    let payload: Value = serde_json::from_str(text)?;
    Ok(parse_payload(payload))
}

/// Reads a dataset file from disk.
pub fn load_dataset(path: &Path) -> Result<Vec<RawRecord>, PersistenceError> {
    let text = fs::read_to_string(path)?;
    let records = parse_payload_str(&text)?;
    log::info!("loaded {} records from {}", records.len(), path.display());
    Ok(records)
}
