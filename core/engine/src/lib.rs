//! FILENAME: core/engine/src/lib.rs
//! PURPOSE: Main library entry point for the record model.
//! CONTEXT: Re-exports the raw/normalized record types, the dimension
//! mapping, and the coercion helpers used by the cube and persistence crates.

pub mod coerce;
pub mod dimension;
pub mod normalize;
pub mod record;

// Re-export commonly used types at the crate root
pub use coerce::{as_number, coerce_number, is_truthy};
pub use dimension::{Dimension, UnknownDimension};
pub use normalize::{build_search_key, normalize, normalize_value, NormalizedRecord, UNKNOWN};
pub use record::{format_number, value_to_text, RawRecord};
