//! FILENAME: core/cube-engine/src/filter.rs
//! Filter Predicate Set evaluation.
//!
//! `apply` maps (normalized records, predicate set) to the filtered subset:
//! - every non-"All" dimension requires exact equality on the normalized value
//! - a non-empty query requires a substring match on the search key
//! - everything composes by AND, and the input order is kept
//!
//! The `FilterPlan` compiled from a predicate set may reorder its dimension
//! checks so the most selective one runs first. That only changes how fast a
//! record is rejected, never which records survive.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use engine::{Dimension, NormalizedRecord};

use crate::definition::PredicateSet;

// ============================================================================
// VALUE COUNTS
// ============================================================================

/// Number of records per (dimension, normalized value) over a full dataset.
/// Built once per load and used to order filter checks by selectivity.
#[derive(Debug, Clone, Default)]
pub struct ValueCounts {
    counts: [FxHashMap<String, usize>; Dimension::COUNT],
}

impl ValueCounts {
    pub fn build(records: &[NormalizedRecord]) -> Self {
        let mut counts: [FxHashMap<String, usize>; Dimension::COUNT] = Default::default();
        for record in records {
            for dim in Dimension::ALL {
                *counts[dim.index()]
                    .entry(record.dimension(dim).to_string())
                    .or_insert(0) += 1;
            }
        }
        ValueCounts { counts }
    }

    /// How many records carry `value` for `dim`.
    pub fn count(&self, dim: Dimension, value: &str) -> usize {
        self.counts[dim.index()].get(value).copied().unwrap_or(0)
    }
}

// ============================================================================
// FILTER PLAN
// ============================================================================

/// A predicate set compiled for evaluation against many records.
#[derive(Debug, Clone)]
pub struct FilterPlan<'p> {
    checks: SmallVec<[(Dimension, &'p str); Dimension::COUNT]>,
    query: Option<String>,
    /// Set when a required value is known not to occur at all.
    unsatisfiable: bool,
}

impl<'p> FilterPlan<'p> {
    /// Compiles the predicates, keeping dimension order.
    pub fn new(predicates: &'p PredicateSet) -> Self {
        FilterPlan {
            checks: predicates.active_filters(),
            query: predicates.normalized_query(),
            unsatisfiable: false,
        }
    }

    /// Compiles the predicates with checks ordered from fewest to most
    /// matching records. A value that never occurs makes the plan reject
    /// everything without scanning.
    pub fn with_counts(predicates: &'p PredicateSet, counts: &ValueCounts) -> Self {
        let mut plan = FilterPlan::new(predicates);
        plan.checks.sort_by_key(|&(dim, value)| counts.count(dim, value));
        plan.unsatisfiable = plan
            .checks
            .first()
            .map(|&(dim, value)| counts.count(dim, value) == 0)
            .unwrap_or(false);
        plan
    }

    /// True when the plan keeps every record.
    pub fn is_identity(&self) -> bool {
        self.checks.is_empty() && self.query.is_none()
    }

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        if self.unsatisfiable {
            return false;
        }
        // Exact comparisons are cheaper than the substring scan, so they go first.
        self.checks
            .iter()
            .all(|&(dim, value)| record.dimension(dim) == value)
            && self
                .query
                .as_deref()
                .map_or(true, |q| record.search_key().contains(q))
    }

    /// Indices (into `records`) of the records that satisfy the plan, ascending.
    pub fn matching_indices(&self, records: &[NormalizedRecord]) -> Vec<usize> {
        if self.unsatisfiable {
            return Vec::new();
        }
        if self.is_identity() {
            return (0..records.len()).collect();
        }
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record))
            .map(|(i, _)| i)
            .collect()
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Returns the records that satisfy every predicate, in input order.
pub fn apply<'a>(records: &'a [NormalizedRecord], predicates: &PredicateSet) -> Vec<&'a NormalizedRecord> {
    let plan = FilterPlan::new(predicates);
    records.iter().filter(|r| plan.matches(r)).collect()
}
