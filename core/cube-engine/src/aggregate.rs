//! FILENAME: core/cube-engine/src/aggregate.rs
//! Aggregation Engine - derives chart projections and KPIs from a filtered subset.
//!
//! Four projections are computed in a single pass:
//! 1. Intensity by year: sum of coerced intensity per normalized year
//! 2. Likelihood distribution: record count per likelihood label
//! 3. Topic breakdown: record count per normalized topic
//! 4. Region breakdown: record count per normalized region
//!
//! Groups are accumulated in hash maps and then emitted with labels sorted
//! ascending as strings, so the output never depends on hash iteration order.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use engine::{coerce_number, is_truthy, value_to_text, Dimension, NormalizedRecord, UNKNOWN};

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// A (labels, values) pair aligned by index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregateView {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl AggregateView {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Value for a label, if the label is present.
    pub fn value_of(&self, label: &str) -> Option<f64> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| self.values[i])
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Scalar summaries of the filtered subset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub record_count: usize,
    pub distinct_countries: usize,
    pub distinct_sectors: usize,
    pub max_intensity: f64,
}

/// Everything the charts and KPI cards need, computed from one subset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateBundle {
    pub intensity_by_year: AggregateView,
    pub likelihood_distribution: AggregateView,
    pub topic_breakdown: AggregateView,
    pub region_breakdown: AggregateView,
    pub kpis: Kpis,
}

// ============================================================================
// GROUPING
// ============================================================================

/// Accumulates a value per label.
#[derive(Default)]
struct Grouping<'a> {
    groups: FxHashMap<Cow<'a, str>, f64>,
}

impl<'a> Grouping<'a> {
    fn add(&mut self, label: Cow<'a, str>, amount: f64) {
        *self.groups.entry(label).or_insert(0.0) += amount;
    }

    fn into_view(self) -> AggregateView {
        let mut pairs: Vec<(Cow<'a, str>, f64)> = self.groups.into_iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        let (labels, values) = pairs
            .into_iter()
            .map(|(label, value)| (label.into_owned(), value))
            .unzip();
        AggregateView { labels, values }
    }
}

/// Likelihood label: a falsy likelihood (missing, null, 0, false, "") is
/// "Unknown"; anything else is its string form.
pub fn likelihood_label(record: &NormalizedRecord) -> Cow<'_, str> {
    let value = record.field("likelihood");
    match value {
        Some(v) if is_truthy(Some(v)) => Cow::Owned(value_to_text(v)),
        _ => Cow::Borrowed(UNKNOWN),
    }
}

/// Intensity coerced to a number, 0 when missing or non-numeric.
pub fn intensity_of(record: &NormalizedRecord) -> f64 {
    coerce_number(record.field("intensity"), 0.0)
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Computes all projections and KPIs for a subset.
pub fn aggregate<'a, I>(subset: I) -> AggregateBundle
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut by_year = Grouping::default();
    let mut by_likelihood = Grouping::default();
    let mut by_topic = Grouping::default();
    let mut by_region = Grouping::default();
    let mut countries: FxHashSet<&str> = FxHashSet::default();
    let mut sectors: FxHashSet<&str> = FxHashSet::default();
    let mut record_count = 0usize;
    let mut max_intensity: Option<f64> = None;

    for record in subset {
        record_count += 1;
        let intensity = intensity_of(record);

        by_year.add(Cow::Borrowed(record.dimension(Dimension::Year)), intensity);
        by_likelihood.add(likelihood_label(record), 1.0);
        by_topic.add(Cow::Borrowed(record.dimension(Dimension::Topic)), 1.0);
        by_region.add(Cow::Borrowed(record.dimension(Dimension::Region)), 1.0);

        countries.insert(record.dimension(Dimension::Country));
        sectors.insert(record.dimension(Dimension::Sector));
        max_intensity = Some(max_intensity.map_or(intensity, |m: f64| m.max(intensity)));
    }

    AggregateBundle {
        intensity_by_year: by_year.into_view(),
        likelihood_distribution: by_likelihood.into_view(),
        topic_breakdown: by_topic.into_view(),
        region_breakdown: by_region.into_view(),
        kpis: Kpis {
            record_count,
            distinct_countries: countries.len(),
            distinct_sectors: sectors.len(),
            max_intensity: max_intensity.unwrap_or(0.0),
        },
    }
}
