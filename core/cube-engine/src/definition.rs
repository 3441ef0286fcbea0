//! FILENAME: core/cube-engine/src/definition.rs
//! Cube Definition - The serializable description of what the user selected.
//!
//! This module contains the types that DESCRIBE the current view:
//! - `DimensionFilter`: the selection for one dimension ("All" or one value)
//! - `PredicateSet`: all eight selections plus the free-text query
//! - `CubeConfig`: static configuration (page size, export columns)
//!
//! A PredicateSet is an immutable value. Every change produces a new set that
//! replaces the old one wholesale, so a recomputation always sees all nine
//! predicates together.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use engine::Dimension;

/// The literal that means "no constraint" for a dimension.
pub const ALL: &str = "All";

/// Default number of table rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Default export column order.
pub const DEFAULT_EXPORT_COLUMNS: [&str; 9] = [
    "title",
    "sector",
    "country",
    "region",
    "end_year",
    "intensity",
    "likelihood",
    "pestle",
    "source",
];

// ============================================================================
// DIMENSION FILTER
// ============================================================================

/// The selection for a single dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DimensionFilter {
    /// No constraint.
    #[default]
    All,
    /// Exact match on the normalized dimension value.
    Equals(String),
}

impl DimensionFilter {
    pub fn is_all(&self) -> bool {
        matches!(self, DimensionFilter::All)
    }

    /// The required value, or None for "All".
    pub fn value(&self) -> Option<&str> {
        match self {
            DimensionFilter::All => None,
            DimensionFilter::Equals(v) => Some(v),
        }
    }
}

impl From<String> for DimensionFilter {
    fn from(value: String) -> Self {
        if value == ALL {
            DimensionFilter::All
        } else {
            DimensionFilter::Equals(value)
        }
    }
}

impl From<&str> for DimensionFilter {
    fn from(value: &str) -> Self {
        DimensionFilter::from(value.to_string())
    }
}

impl From<DimensionFilter> for String {
    fn from(filter: DimensionFilter) -> Self {
        match filter {
            DimensionFilter::All => ALL.to_string(),
            DimensionFilter::Equals(v) => v,
        }
    }
}

// ============================================================================
// PREDICATE SET
// ============================================================================

/// One selection per dimension plus the free-text query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "PredicateSetRepr", into = "PredicateSetRepr")]
pub struct PredicateSet {
    filters: [DimensionFilter; Dimension::COUNT],
    query: String,
}

impl PredicateSet {
    /// Every dimension "All", empty query.
    pub fn new() -> Self {
        PredicateSet::default()
    }

    /// Returns a copy with one dimension's selection replaced.
    pub fn with_filter(mut self, dim: Dimension, filter: impl Into<DimensionFilter>) -> Self {
        self.filters[dim.index()] = filter.into();
        self
    }

    /// Returns a copy with the query replaced. The query is stored as typed;
    /// trimming and lower-casing happen when it is applied.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn filter(&self, dim: Dimension) -> &DimensionFilter {
        &self.filters[dim.index()]
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The query as it is matched: trimmed, lower-cased, None when empty.
    pub fn normalized_query(&self) -> Option<String> {
        let q = self.query.trim().to_lowercase();
        (!q.is_empty()).then_some(q)
    }

    /// Dimensions that carry a constraint, in dimension order.
    pub fn active_filters(&self) -> SmallVec<[(Dimension, &str); Dimension::COUNT]> {
        Dimension::ALL
            .iter()
            .filter_map(|&dim| self.filter(dim).value().map(|v| (dim, v)))
            .collect()
    }

    /// True when no predicate constrains anything.
    pub fn is_unconstrained(&self) -> bool {
        self.filters.iter().all(DimensionFilter::is_all) && self.normalized_query().is_none()
    }
}

/// Flat wire shape: `{"year": "All", ..., "source": "All", "query": ""}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct PredicateSetRepr {
    year: DimensionFilter,
    topic: DimensionFilter,
    sector: DimensionFilter,
    region: DimensionFilter,
    country: DimensionFilter,
    city: DimensionFilter,
    pestle: DimensionFilter,
    source: DimensionFilter,
    query: String,
}

impl From<PredicateSetRepr> for PredicateSet {
    fn from(r: PredicateSetRepr) -> Self {
        PredicateSet {
            filters: [
                r.year, r.topic, r.sector, r.region, r.country, r.city, r.pestle, r.source,
            ],
            query: r.query,
        }
    }
}

impl From<PredicateSet> for PredicateSetRepr {
    fn from(p: PredicateSet) -> Self {
        let [year, topic, sector, region, country, city, pestle, source] = p.filters;
        PredicateSetRepr {
            year,
            topic,
            sector,
            region,
            country,
            city,
            pestle,
            source,
            query: p.query,
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Static engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Table rows per page. Zero is treated as one.
    pub page_size: usize,
    /// Export columns, in output order.
    pub export_columns: Vec<String>,
}

impl Default for CubeConfig {
    fn default() -> Self {
        CubeConfig {
            page_size: DEFAULT_PAGE_SIZE,
            export_columns: DEFAULT_EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }
}
