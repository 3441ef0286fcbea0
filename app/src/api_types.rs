//! FILENAME: app/src/api_types.rs
// PURPOSE: Request/response payloads exchanged with the rendering client.

use chrono::{DateTime, Utc};
use cube_engine::{ChartBundle, Kpis, PageWindow, PredicateSet, TableRow};
use engine::Dimension;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Everything one dashboard render needs, read from a single snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub predicates: PredicateSet,
    pub kpis: Kpis,
    pub charts: ChartBundle,
    pub table: PageWindow<TableRow>,
    pub status: StatusResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub loading: bool,
    pub record_count: usize,
    pub filtered_count: usize,
    /// Changes on every committed load; `None` until the first one.
    pub dataset_id: Option<Uuid>,
    pub loaded_at: Option<DateTime<Utc>>,
    /// Message of the last failed fetch, cleared by the next successful one.
    pub last_error: Option<String>,
}

/// One dropdown: the dimension, its display label, the current selection and
/// the choices ("All" first).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterControl {
    pub dimension: Dimension,
    pub label: &'static str,
    pub selected: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub dataset_id: Option<Uuid>,
    pub controls: Vec<FilterControl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetFilterParams {
    pub dimension: Dimension,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetQueryParams {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SetPageParams {
    pub page: usize,
}
