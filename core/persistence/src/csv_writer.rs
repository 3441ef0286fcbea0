//! FILENAME: core/persistence/src/csv_writer.rs
//! Export Serializer - writes the filtered subset as delimited text.
//!
//! Format:
//! - header line of column names, then one line per record
//! - every field quoted, inner quotes doubled
//! - `\n` between lines, nothing after the last line
//! - missing/null values are `""`; numeric columns that do not hold a number
//!   are `""` as well

use crate::PersistenceError;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use engine::{as_number, format_number, value_to_text, NormalizedRecord};
use std::fs;
use std::path::Path;

pub const EXPORT_FILENAME: &str = "filtered_data.csv";
pub const EXPORT_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Columns exported as numbers rather than text.
pub const NUMERIC_COLUMNS: [&str; 3] = ["intensity", "likelihood", "relevance"];

/// A ready-to-download export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: String,
    pub record_count: usize,
}

/// Text written for one (record, column) cell.
pub fn export_field(record: &NormalizedRecord, column: &str) -> String {
    let Some(value) = record.field(column) else {
        return String::new();
    };
    if NUMERIC_COLUMNS.contains(&column) {
        as_number(value).map(format_number).unwrap_or_default()
    } else {
        value_to_text(value)
    }
}

/// Serializes the subset. An empty subset yields the header line only.
pub fn serialize_csv<'a, I, S>(subset: I, columns: &[S]) -> Result<String, PersistenceError>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    S: AsRef<str>,
{
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.as_ref()))?;
    for record in subset {
        writer.write_record(columns.iter().map(|c| export_field(record, c.as_ref())))?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Builds the download artifact, refusing to run on an empty subset.
pub fn export_csv<'a, I, S>(subset: I, columns: &[S]) -> Result<ExportArtifact, PersistenceError>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    S: AsRef<str>,
{
    let records: Vec<&NormalizedRecord> = subset.into_iter().collect();
    if records.is_empty() {
        return Err(PersistenceError::NothingToExport);
    }

    let body = serialize_csv(records.iter().copied(), columns)?;
    log::info!("exported {} records, {} bytes", records.len(), body.len());
    Ok(ExportArtifact {
        filename: EXPORT_FILENAME,
        content_type: EXPORT_CONTENT_TYPE,
        body,
        record_count: records.len(),
    })
}

/// Writes the export to `path`. Returns the number of records written.
pub fn save_csv<'a, I, S>(path: &Path, subset: I, columns: &[S]) -> Result<usize, PersistenceError>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
    S: AsRef<str>,
{
    let artifact = export_csv(subset, columns)?;
    fs::write(path, artifact.body.as_bytes())?;
    Ok(artifact.record_count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::{normalize, RawRecord};
    use serde_json::{json, Value};

    fn records(values: Vec<Value>) -> Vec<NormalizedRecord> {
        normalize(values.into_iter().map(RawRecord::from_value).collect())
    }

    #[test]
    fn test_calibration_output() {
        let data = records(vec![
            json!({ "title": "A", "sector": "Energy", "intensity": 5 }),
            json!({ "title": "B", "sector": "Health", "intensity": "n/a" }),
        ]);
        let text = serialize_csv(&data, &["title", "sector", "intensity"]).unwrap();
        assert_eq!(
            text,
            "\"title\",\"sector\",\"intensity\"\n\"A\",\"Energy\",\"5\"\n\"B\",\"Health\",\"\""
        );
    }

    #[test]
    fn test_inner_quotes_are_doubled() {
        let data = records(vec![json!({ "title": "He said \"ok\"" })]);
        let text = serialize_csv(&data, &["title"]).unwrap();
        assert_eq!(text.lines().nth(1), Some("\"He said \"\"ok\"\"\""));
    }

    #[test]
    fn test_commas_and_newlines_stay_inside_quotes() {
        let data = records(vec![json!({ "title": "a,b", "insight": "line1\nline2" })]);
        let text = serialize_csv(&data, &["title", "insight"]).unwrap();
        assert_eq!(text, "\"title\",\"insight\"\n\"a,b\",\"line1\nline2\"");
    }

    #[test]
    fn test_missing_and_null_fields_are_empty() {
        let data = records(vec![json!({ "title": null, "likelihood": 2 })]);
        let text = serialize_csv(&data, &["title", "city", "likelihood"]).unwrap();
        assert_eq!(text, "\"title\",\"city\",\"likelihood\"\n\"\",\"\",\"2\"");
    }

    #[test]
    fn test_raw_values_not_normalized_values() {
        let data = records(vec![json!({ "region": "  Europe ", "end_year": 2025 })]);
        let text = serialize_csv(&data, &["region", "end_year"]).unwrap();
        assert_eq!(text.lines().nth(1), Some("\"  Europe \",\"2025\""));
    }

    #[test]
    fn test_empty_subset_serializes_header_only() {
        let data: Vec<NormalizedRecord> = Vec::new();
        assert_eq!(serialize_csv(&data, &["title", "sector"]).unwrap(), "\"title\",\"sector\"");
    }

    #[test]
    fn test_export_refuses_empty_subset() {
        let data: Vec<NormalizedRecord> = Vec::new();
        let result = export_csv(&data, &["title"]);
        assert!(matches!(result, Err(PersistenceError::NothingToExport)));
    }

    #[test]
    fn test_export_artifact() {
        let data = records(vec![json!({ "title": "x" }), json!({ "title": "y" })]);
        let artifact = export_csv(&data, &["title"]).unwrap();
        assert_eq!(artifact.filename, "filtered_data.csv");
        assert_eq!(artifact.content_type, "text/csv; charset=utf-8");
        assert_eq!(artifact.record_count, 2);
        assert!(!artifact.body.ends_with('\n'));
    }

    #[test]
    fn test_save_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(EXPORT_FILENAME);
        let data = records(vec![json!({ "title": "Ünïcode ✓" })]);
        let written = save_csv(&path, &data, &["title".to_string()]).unwrap();
        assert_eq!(written, 1);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "\"title\"\n\"Ünïcode ✓\"");
    }
}
