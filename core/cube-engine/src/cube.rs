//! FILENAME: core/cube-engine/src/cube.rs
//! Cube - the session object that owns the normalized dataset.
//!
//! Data flow:
//! raw records -> normalize -> records (replaced wholesale per load)
//!                          -> options + value counts (once per load)
//! predicates  -> filtered indices (recomputed on EVERY predicate change)
//!             -> aggregates / page window / export rows read the same indices
//!
//! The filtered subset is recomputed eagerly inside every mutating call, so
//! no reader can observe a view computed from a predicate set other than the
//! current one.
//!
//! Loads are ticketed: `begin_load` hands out a monotonically increasing
//! ticket and `commit_load` only accepts the newest one. A late response from
//! a superseded fetch is discarded, never merged.

use engine::{normalize, Dimension, NormalizedRecord, RawRecord};

use crate::aggregate::{aggregate, AggregateBundle};
use crate::definition::{CubeConfig, DimensionFilter, PredicateSet};
use crate::filter::{FilterPlan, ValueCounts};
use crate::options::{derive_options, DimensionOptions};
use crate::pagination::{self, paginate, PageWindow};
use crate::view::{ChartBundle, TableRow};

/// Identifies one dataset fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Consistent read of every derived view at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CubeSnapshot<'a> {
    pub predicates: &'a PredicateSet,
    pub aggregates: AggregateBundle,
    pub charts: ChartBundle,
    pub page: PageWindow<TableRow>,
}

#[derive(Debug, Clone)]
pub struct Cube {
    config: CubeConfig,
    records: Vec<NormalizedRecord>,
    options: DimensionOptions,
    counts: ValueCounts,
    predicates: PredicateSet,
    /// Indices into `records` of the current filtered subset, ascending.
    filtered: Vec<usize>,
    /// 1-based page, kept within range by `correct_page`.
    page: usize,
    latest_ticket: u64,
    loading: bool,
    /// Bumped on every committed load.
    dataset_version: u64,
}

impl Cube {
    pub fn new(config: CubeConfig) -> Self {
        Cube {
            config,
            records: Vec::new(),
            options: DimensionOptions::default(),
            counts: ValueCounts::default(),
            predicates: PredicateSet::new(),
            filtered: Vec::new(),
            page: 1,
            latest_ticket: 0,
            loading: false,
            dataset_version: 0,
        }
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    // ========================================================================
    // LOADING
    // ========================================================================

    /// Starts a fetch. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_ticket += 1;
        self.loading = true;
        log::debug!("begin load ticket={}", self.latest_ticket);
        LoadTicket(self.latest_ticket)
    }

    /// Commits a fetched dataset if `ticket` is the newest one issued.
    /// Returns false (and changes nothing) for a superseded ticket.
    pub fn commit_load(&mut self, ticket: LoadTicket, raw: Vec<RawRecord>) -> bool {
        if ticket.0 != self.latest_ticket {
            log::info!(
                "discarding stale load ticket={} latest={} records={}",
                ticket.0,
                self.latest_ticket,
                raw.len()
            );
            return false;
        }

        self.records = normalize(raw);
        self.options = derive_options(&self.records);
        self.counts = ValueCounts::build(&self.records);
        self.loading = false;
        self.dataset_version += 1;
        self.recompute();
        log::info!(
            "committed load ticket={} records={} version={}",
            ticket.0,
            self.records.len(),
            self.dataset_version
        );
        true
    }

    /// Loads a dataset synchronously (begin + commit).
    pub fn load(&mut self, raw: Vec<RawRecord>) {
        let ticket = self.begin_load();
        self.commit_load(ticket, raw);
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dataset_version(&self) -> u64 {
        self.dataset_version
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    /// Dropdown options for the full dataset.
    pub fn options(&self) -> &DimensionOptions {
        &self.options
    }

    // ========================================================================
    // PREDICATES
    // ========================================================================

    pub fn predicates(&self) -> &PredicateSet {
        &self.predicates
    }

    /// Replaces the whole predicate set. A changed query returns to page 1.
    pub fn set_predicates(&mut self, predicates: PredicateSet) {
        if predicates.query() != self.predicates.query() {
            self.page = 1;
        }
        self.predicates = predicates;
        self.recompute();
    }

    pub fn set_filter(&mut self, dim: Dimension, filter: impl Into<DimensionFilter>) {
        let next = self.predicates.clone().with_filter(dim, filter);
        self.set_predicates(next);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let next = self.predicates.clone().with_query(query);
        self.set_predicates(next);
    }

    /// Every dimension back to "All", empty query, page 1.
    pub fn reset(&mut self) {
        self.page = 1;
        self.set_predicates(PredicateSet::new());
    }

    fn recompute(&mut self) {
        self.filtered = {
            let plan = FilterPlan::with_counts(&self.predicates, &self.counts);
            plan.matching_indices(&self.records)
        };
        self.correct_page();
        log::debug!(
            "recomputed subset: {} of {} records, page {}/{}",
            self.filtered.len(),
            self.records.len(),
            self.page,
            self.page_count()
        );
    }

    // ========================================================================
    // PAGING
    // ========================================================================

    pub fn page_count(&self) -> usize {
        pagination::page_count(self.filtered.len(), self.config.page_size)
    }

    /// Current (always valid) 1-based page.
    pub fn current_page(&self) -> usize {
        self.page
    }

    /// Requests a page; out-of-range requests fall back to page 1.
    /// Returns the page now shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        self.page = pagination::effective_page(page, self.page_count());
        self.page
    }

    pub fn next_page(&mut self) -> usize {
        self.page = pagination::next_page(self.page, self.page_count());
        self.page
    }

    pub fn previous_page(&mut self) -> usize {
        self.page = pagination::previous_page(self.page);
        self.page
    }

    fn correct_page(&mut self) {
        self.page = pagination::effective_page(self.page, self.page_count());
    }

    // ========================================================================
    // DERIVED VIEWS
    // ========================================================================

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    /// The current filtered subset, in dataset order.
    pub fn filtered(&self) -> impl ExactSizeIterator<Item = &NormalizedRecord> + Clone + '_ {
        self.filtered.iter().map(move |&i| &self.records[i])
    }

    pub fn aggregates(&self) -> AggregateBundle {
        aggregate(self.filtered())
    }

    /// The visible page of the current subset.
    pub fn page_window(&self) -> PageWindow<&NormalizedRecord> {
        paginate(&self.filtered, self.config.page_size, self.page).map(|i| &self.records[i])
    }

    /// Aggregates, charts and the table page, all from the same subset.
    pub fn snapshot(&self) -> CubeSnapshot<'_> {
        let aggregates = self.aggregates();
        let charts = ChartBundle::from(&aggregates);
        let page = self.page_window().map(TableRow::from);
        CubeSnapshot {
            predicates: &self.predicates,
            aggregates,
            charts,
            page,
        }
    }
}

impl Default for Cube {
    fn default() -> Self {
        Cube::new(CubeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(values: Vec<serde_json::Value>) -> Vec<RawRecord> {
        values.into_iter().map(RawRecord::from_value).collect()
    }

    fn three_records() -> Vec<RawRecord> {
        raw(vec![
            json!({ "end_year": "2020", "intensity": 4, "country": "India", "title": "a" }),
            json!({ "end_year": "2021", "intensity": 6, "country": "Chile", "title": "b" }),
            json!({ "end_year": "2020", "intensity": 2, "country": "Peru", "title": "c" }),
        ])
    }

    fn many_records(n: usize) -> Vec<RawRecord> {
        raw((0..n)
            .map(|i| json!({ "title": format!("r{}", i), "sector": if i % 2 == 0 { "Even" } else { "Odd" } }))
            .collect())
    }

    #[test]
    fn test_new_cube_is_empty() {
        let cube = Cube::default();
        assert_eq!(cube.filtered_len(), 0);
        assert_eq!(cube.page_count(), 1);
        assert_eq!(cube.aggregates(), AggregateBundle::default());
        assert!(cube.options().get(Dimension::Year).is_empty());
    }

    #[test]
    fn test_filter_by_year_end_to_end() {
        let mut cube = Cube::default();
        cube.load(three_records());
        cube.set_filter(Dimension::Year, "2020");

        assert_eq!(cube.filtered_len(), 2);
        let bundle = cube.aggregates();
        assert_eq!(bundle.intensity_by_year.labels, vec!["2020"]);
        assert_eq!(bundle.intensity_by_year.values, vec![6.0]);
        assert_eq!(bundle.kpis.max_intensity, 4.0);
        assert_eq!(bundle.kpis.distinct_countries, 2);
        assert_eq!(bundle.kpis.record_count, 2);
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut cube = Cube::default();
        let first = cube.begin_load();
        let second = cube.begin_load();

        assert!(cube.commit_load(second, three_records()));
        assert!(!cube.commit_load(first, many_records(50)));
        assert_eq!(cube.records().len(), 3);
        assert!(!cube.is_loading());
        assert_eq!(cube.dataset_version(), 1);
    }

    #[test]
    fn test_loading_flag() {
        let mut cube = Cube::default();
        let ticket = cube.begin_load();
        assert!(cube.is_loading());
        assert_eq!(cube.filtered_len(), 0);
        cube.commit_load(ticket, Vec::new());
        assert!(!cube.is_loading());
    }

    #[test]
    fn test_page_self_corrects_when_subset_shrinks() {
        let mut cube = Cube::default();
        cube.load(many_records(100));
        assert_eq!(cube.set_page(4), 4);

        cube.set_filter(Dimension::Sector, "Odd");
        assert_eq!(cube.page_count(), 3);
        assert_eq!(cube.current_page(), 1);
        assert_eq!(cube.page_window().effective_page, 1);
    }

    #[test]
    fn test_page_kept_when_still_valid() {
        let mut cube = Cube::default();
        cube.load(many_records(100));
        cube.set_page(2);
        cube.set_filter(Dimension::Sector, "Even");
        assert_eq!(cube.current_page(), 2);
    }

    #[test]
    fn test_query_change_returns_to_first_page() {
        let mut cube = Cube::default();
        cube.load(many_records(100));
        cube.set_page(3);
        cube.set_query("r");
        assert_eq!(cube.current_page(), 1);
    }

    #[test]
    fn test_next_and_previous_clamp() {
        let mut cube = Cube::default();
        cube.load(many_records(45));
        assert_eq!(cube.previous_page(), 1);
        assert_eq!(cube.next_page(), 2);
        assert_eq!(cube.next_page(), 3);
        assert_eq!(cube.next_page(), 3);
        assert_eq!(cube.page_window().page_data.len(), 5);
    }

    #[test]
    fn test_reset() {
        let mut cube = Cube::default();
        cube.load(many_records(30));
        cube.set_filter(Dimension::Sector, "Odd");
        cube.set_query("r1");
        cube.reset();
        assert!(cube.predicates().is_unconstrained());
        assert_eq!(cube.filtered_len(), 30);
        assert_eq!(cube.current_page(), 1);
    }

    #[test]
    fn test_predicates_survive_reload_and_stale_values_match_nothing() {
        let mut cube = Cube::default();
        cube.load(many_records(10));
        cube.set_filter(Dimension::Sector, "Odd");
        assert_eq!(cube.filtered_len(), 5);

        cube.load(three_records());
        assert_eq!(cube.predicates().filter(Dimension::Sector).value(), Some("Odd"));
        assert_eq!(cube.filtered_len(), 0);
        assert_eq!(cube.aggregates().kpis.record_count, 0);
    }

    #[test]
    fn test_options_reflect_full_dataset() {
        let mut cube = Cube::default();
        cube.load(three_records());
        let before = cube.options().clone();
        cube.set_filter(Dimension::Country, "Peru");
        assert_eq!(cube.options(), &before);
        assert_eq!(cube.options().get(Dimension::Country), ["Chile", "India", "Peru"]);
    }

    #[test]
    fn test_snapshot_views_agree() {
        let mut cube = Cube::default();
        cube.load(many_records(25));
        cube.set_filter(Dimension::Sector, "Even");

        let snapshot = cube.snapshot();
        assert_eq!(snapshot.aggregates.kpis.record_count, 13);
        assert_eq!(snapshot.page.total_records, 13);
        assert_eq!(snapshot.page.page_data.len(), 13);
        assert_eq!(snapshot.charts.topic_breakdown.datasets[0].data, vec![13.0]);
        assert_eq!(snapshot.predicates.filter(Dimension::Sector).value(), Some("Even"));
    }
}
