//! FILENAME: tests/common/mod.rs
//! Test harness and fixtures for dashboard service integration tests.

#![allow(dead_code)]

use app_lib::commands;
use app_lib::{create_app_state, create_app_state_with, AppConfig, AppState, DashboardResponse};
use engine::RawRecord;
use serde_json::{json, Value};

/// Test harness for creating and managing test state.
pub struct TestHarness {
    pub state: AppState,
}

impl TestHarness {
    /// Create a new test harness with no dataset loaded.
    pub fn new() -> Self {
        TestHarness {
            state: create_app_state(),
        }
    }

    pub fn with_config(config: AppConfig) -> Self {
        TestHarness {
            state: create_app_state_with(config),
        }
    }

    /// Create a harness loaded with the insight fixture.
    pub fn with_sample_data() -> Self {
        let harness = Self::new();
        harness.load(InsightFixture::records());
        harness
    }

    /// Create a harness with `n` generated records (for paging tests).
    pub fn with_generated_data(n: usize) -> Self {
        let harness = Self::new();
        harness.load(InsightFixture::generated(n));
        harness
    }

    pub fn load(&self, records: Vec<RawRecord>) {
        commands::load_records(&self.state, records);
    }

    pub fn dashboard(&self) -> DashboardResponse {
        commands::get_dashboard(&self.state)
    }

    /// Titles shown on the current table page.
    pub fn page_titles(&self) -> Vec<String> {
        self.dashboard()
            .table
            .page_data
            .into_iter()
            .map(|row| row.title)
            .collect()
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// A small insight dataset covering blanks, nulls, padding and mixed types.
pub struct InsightFixture;

impl InsightFixture {
    pub fn values() -> Vec<Value> {
        vec![
            json!({
                "title": "Oil demand rises", "insight": "Asia leads growth",
                "end_year": 2020, "topic": "oil", "sector": "Energy", "region": "Asia",
                "country": "India", "city": "", "pestle": "Economic", "source": "EIA",
                "intensity": 6, "likelihood": 3, "relevance": 2,
            }),
            json!({
                "title": "Gas prices fall", "insight": "Mild winter",
                "end_year": "2020", "topic": "gas", "sector": "Energy", "region": "Europe",
                "country": "Germany", "pestle": "Economic", "source": "Reuters",
                "intensity": "4", "likelihood": 2,
            }),
            json!({
                "title": "", "insight": "Retail footfall recovers",
                "end_year": 2022, "topic": "market", "sector": "Retail", "region": " Europe ",
                "country": "France", "pestle": "Social", "source": "Reuters",
                "intensity": "n/a", "likelihood": 0,
            }),
            json!({
                "title": "Oil exporters adapt", "insight": "OPEC strategy",
                "end_year": null, "topic": "oil", "sector": null, "region": "Middle East",
                "country": "Saudi Arabia", "pestle": "Political", "source": "",
                "intensity": 10, "likelihood": "4",
            }),
            json!({
                "title": "Hospital capacity", "insight": "Staffing gaps",
                "end_year": "", "topic": "health", "sector": "Healthcare", "region": "Northern America",
                "country": "United States of America", "pestle": "Social", "source": "WHO",
                "intensity": 2, "likelihood": 1,
            }),
        ]
    }

    pub fn records() -> Vec<RawRecord> {
        Self::values().into_iter().map(RawRecord::from_value).collect()
    }

    /// `n` records titled "Item 0".."Item n-1"; even items are Energy, odd Retail.
    pub fn generated(n: usize) -> Vec<RawRecord> {
        (0..n)
            .map(|i| {
                let sector = if i % 2 == 0 { "Energy" } else { "Retail" };
                RawRecord::from_value(json!({
                    "title": format!("Item {}", i),
                    "sector": sector,
                    "end_year": 2016 + (i % 5),
                    "intensity": i % 7,
                    "likelihood": 1 + (i % 3),
                }))
            })
            .collect()
    }
}
