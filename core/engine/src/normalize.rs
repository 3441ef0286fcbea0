//! FILENAME: core/engine/src/normalize.rs
//! PURPOSE: Record Normalizer - converts raw records into their canonical form.
//! CONTEXT: Runs once per fetched dataset. Every dimension field is defaulted
//! here and nowhere else; downstream code reads `NormalizedRecord::dimension`
//! and never has to care whether the source field was missing or blank.
//!
//! Normalization is total: it never fails and never drops a record. The output
//! has exactly the input's length and order.

use serde::Serialize;
use serde_json::Value;

use crate::dimension::Dimension;
use crate::record::{value_to_text, RawRecord};

/// Sentinel for a missing, null or blank dimension value.
pub const UNKNOWN: &str = "Unknown";

/// A raw record plus its defaulted dimension values and search key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    raw: RawRecord,
    dimensions: [String; Dimension::COUNT],
    search_key: String,
}

impl NormalizedRecord {
    pub fn from_raw(raw: RawRecord) -> Self {
        let dimensions = Dimension::ALL.map(|dim| normalize_value(raw.get(dim.field_name())));
        let search_key = build_search_key(&raw);
        NormalizedRecord {
            raw,
            dimensions,
            search_key,
        }
    }

    /// The original fields, unchanged.
    pub fn raw(&self) -> &RawRecord {
        &self.raw
    }

    /// The normalized (never empty) value of a dimension.
    pub fn dimension(&self, dim: Dimension) -> &str {
        &self.dimensions[dim.index()]
    }

    /// Lower-cased "title insight" used for substring search.
    pub fn search_key(&self) -> &str {
        &self.search_key
    }

    /// Shorthand for an original field value (null treated as absent).
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.raw.get(name)
    }

    pub fn into_raw(self) -> RawRecord {
        self.raw
    }
}

/// Defaults one dimension value: absent/null or blank after trimming becomes
/// `UNKNOWN`, anything else is its trimmed text.
pub fn normalize_value(value: Option<&Value>) -> String {
    let Some(value) = value else {
        return UNKNOWN.to_string();
    };
    let text = value_to_text(value);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        UNKNOWN.to_string()
    } else {
        trimmed.to_string()
    }
}

/// `lowercase(trim(title) + " " + trim(insight))`, missing parts read as "".
pub fn build_search_key(raw: &RawRecord) -> String {
    let title = raw.text("title").unwrap_or_default();
    let insight = raw.text("insight").unwrap_or_default();
    format!("{} {}", title.trim(), insight.trim()).to_lowercase()
}

/// Normalizes a whole dataset, preserving length and order.
pub fn normalize(raw: Vec<RawRecord>) -> Vec<NormalizedRecord> {
    let records: Vec<NormalizedRecord> = raw.into_iter().map(NormalizedRecord::from_raw).collect();
    log::debug!("normalized {} records", records.len());
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        RawRecord::from_value(value)
    }

    #[test]
    fn test_defaults_missing_null_and_blank() {
        let record = NormalizedRecord::from_raw(raw(json!({
            "topic": null,
            "sector": "   ",
            "region": "  Northern America ",
            "end_year": 2020,
        })));

        assert_eq!(record.dimension(Dimension::Topic), UNKNOWN);
        assert_eq!(record.dimension(Dimension::Sector), UNKNOWN);
        assert_eq!(record.dimension(Dimension::Region), "Northern America");
        assert_eq!(record.dimension(Dimension::Year), "2020");
        assert_eq!(record.dimension(Dimension::City), UNKNOWN);
    }

    #[test]
    fn test_raw_fields_preserved() {
        let source = raw(json!({ "region": "  Europe ", "intensity": "6", "extra": [1, 2] }));
        let record = NormalizedRecord::from_raw(source.clone());
        assert_eq!(record.raw(), &source);
        assert_eq!(record.field("intensity"), Some(&json!("6")));
    }

    #[test]
    fn test_search_key() {
        let record = NormalizedRecord::from_raw(raw(json!({
            "title": "  Oil Prices ",
            "insight": "Rising DEMAND",
        })));
        assert_eq!(record.search_key(), "oil prices rising demand");

        let only_insight = NormalizedRecord::from_raw(raw(json!({ "insight": "Gas" })));
        assert_eq!(only_insight.search_key(), " gas");

        let nothing = NormalizedRecord::from_raw(RawRecord::new());
        assert_eq!(nothing.search_key(), " ");
    }

    #[test]
    fn test_normalization_is_total() {
        let input = vec![
            RawRecord::new(),
            raw(json!({ "title": 12, "end_year": "", "country": false })),
            raw(json!("not an object")),
        ];
        let out = normalize(input);
        assert_eq!(out.len(), 3);
        for record in &out {
            for dim in Dimension::ALL {
                assert!(!record.dimension(dim).is_empty());
            }
        }
        assert_eq!(out[1].dimension(Dimension::Country), "false");
    }

    #[test]
    fn test_empty_dataset() {
        assert!(normalize(Vec::new()).is_empty());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let input = vec![
            raw(json!({ "title": "A", "end_year": " 2021 ", "topic": "" })),
            raw(json!({ "sector": "Energy", "city": null })),
        ];
        let first = normalize(input.clone());
        let second = normalize(input);
        assert_eq!(first, second);

        // Re-deriving dimensions from the canonical values is a fixed point.
        for record in &first {
            let mut canonical = record.raw().clone();
            for dim in Dimension::ALL {
                canonical.set(dim.field_name(), json!(record.dimension(dim)));
            }
            let again = NormalizedRecord::from_raw(canonical);
            for dim in Dimension::ALL {
                assert_eq!(again.dimension(dim), record.dimension(dim));
            }
        }
    }
}
