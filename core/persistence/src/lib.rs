//! FILENAME: core/persistence/src/lib.rs
//! Dashboard Persistence Module
//!
//! Reads dataset payloads (the data endpoint's `{"data": [...]}` response or a
//! JSON file on disk) and writes the filtered subset out as CSV.

mod csv_writer;
mod error;
mod json_reader;

pub use csv_writer::{
    export_csv, export_field, save_csv, serialize_csv, ExportArtifact, EXPORT_CONTENT_TYPE,
    EXPORT_FILENAME, NUMERIC_COLUMNS,
};
pub use error::PersistenceError;
pub use json_reader::{load_dataset, parse_payload, parse_payload_str};
