//! FILENAME: core/engine/src/dimension.rs
//! PURPOSE: The eight categorical dimensions a record can be filtered and grouped by.
//! CONTEXT: Each dimension maps to exactly one source field. The mapping is
//! static configuration; nothing negotiates it at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    #[serde(alias = "end_year")]
    Year,
    Topic,
    Sector,
    Region,
    Country,
    City,
    #[serde(alias = "pest")]
    Pestle,
    Source,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown dimension: {0}")]
pub struct UnknownDimension(pub String);

impl Dimension {
    pub const COUNT: usize = 8;

    /// All dimensions in canonical (dropdown) order.
    pub const ALL: [Dimension; Dimension::COUNT] = [
        Dimension::Year,
        Dimension::Topic,
        Dimension::Sector,
        Dimension::Region,
        Dimension::Country,
        Dimension::City,
        Dimension::Pestle,
        Dimension::Source,
    ];

    /// Position of this dimension in `Dimension::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Name of the raw record field this dimension reads.
    pub fn field_name(self) -> &'static str {
        match self {
            Dimension::Year => "end_year",
            Dimension::Topic => "topic",
            Dimension::Sector => "sector",
            Dimension::Region => "region",
            Dimension::Country => "country",
            Dimension::City => "city",
            Dimension::Pestle => "pestle",
            Dimension::Source => "source",
        }
    }

    /// Human readable label for the filter control.
    pub fn label(self) -> &'static str {
        match self {
            Dimension::Year => "End Year",
            Dimension::Topic => "Topic",
            Dimension::Sector => "Sector",
            Dimension::Region => "Region",
            Dimension::Country => "Country",
            Dimension::City => "City",
            Dimension::Pestle => "PEST",
            Dimension::Source => "Source",
        }
    }

    /// Short key used in serialized form and URLs.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Pestle => "pestle",
            other => other.field_name(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Dimension {
    type Err = UnknownDimension;

    /// Accepts the short key, the source field name, or "pest", case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        Dimension::ALL
            .iter()
            .copied()
            .find(|d| d.key() == lowered || d.field_name() == lowered)
            .or_else(|| (lowered == "pest").then_some(Dimension::Pestle))
            .ok_or_else(|| UnknownDimension(s.to_string()))
    }
}
