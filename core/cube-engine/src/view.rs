//! FILENAME: core/cube-engine/src/view.rs
//! Cube View - Renderable output for the chart and table collaborators.
//!
//! The aggregate views are reshaped into the dataset structure chart
//! renderers consume: labels plus one or more labelled datasets carrying
//! optional color hints. Colors are presentation-only; nothing in the engine
//! reads them back.

use serde::{Deserialize, Serialize};
use engine::{value_to_text, Dimension, NormalizedRecord};

use crate::aggregate::{AggregateBundle, AggregateView};

// ============================================================================
// CHARTS
// ============================================================================

/// One dataset series of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
}

/// Labels plus datasets, aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

impl ChartView {
    /// Wraps one aggregate view as a single-dataset chart.
    pub fn single(view: &AggregateView, label: Option<&str>) -> Self {
        ChartView {
            labels: view.labels.clone(),
            datasets: vec![ChartDataset {
                label: label.map(str::to_string),
                data: view.values.clone(),
                border_color: None,
                background_color: None,
            }],
        }
    }

    fn with_colors(mut self, border: &str, background: &str) -> Self {
        for dataset in &mut self.datasets {
            dataset.border_color = Some(border.to_string());
            dataset.background_color = Some(background.to_string());
        }
        self
    }
}

/// The four dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBundle {
    pub intensity_by_year: ChartView,
    pub likelihood_distribution: ChartView,
    pub topic_breakdown: ChartView,
    pub region_breakdown: ChartView,
}

impl From<&AggregateBundle> for ChartBundle {
    fn from(bundle: &AggregateBundle) -> Self {
        ChartBundle {
            intensity_by_year: ChartView::single(&bundle.intensity_by_year, Some("Intensity by Year"))
                .with_colors("cyan", "rgba(0,255,255,0.12)"),
            likelihood_distribution: ChartView::single(
                &bundle.likelihood_distribution,
                Some("Likelihood count"),
            ),
            topic_breakdown: ChartView::single(&bundle.topic_breakdown, Some("Topics")),
            region_breakdown: ChartView::single(&bundle.region_breakdown, Some("Regions")),
        }
    }
}

// ============================================================================
// TABLE
// ============================================================================

/// One data-table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Title, falling back to the insight text.
    pub title: String,
    pub sector: String,
    pub country: String,
    /// Raw intensity text ("" when absent).
    pub intensity: String,
    /// Raw likelihood text ("" when absent).
    pub likelihood: String,
    pub year: String,
}

impl From<&NormalizedRecord> for TableRow {
    fn from(record: &NormalizedRecord) -> Self {
        let raw_text = |field: &str| record.field(field).map(value_to_text).unwrap_or_default();
        let title = record
            .field("title")
            .map(value_to_text)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| raw_text("insight"));

        TableRow {
            title,
            sector: record.dimension(Dimension::Sector).to_string(),
            country: record.dimension(Dimension::Country).to_string(),
            intensity: raw_text("intensity"),
            likelihood: raw_text("likelihood"),
            year: record.dimension(Dimension::Year).to_string(),
        }
    }
}
