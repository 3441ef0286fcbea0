//! FILENAME: app/src/commands.rs
// PURPOSE: Dashboard commands over the shared application state.
// CONTEXT: Every read comes from one lock of the cube, so KPIs, charts and the
// table always describe the same filtered subset.

use cube_engine::{Cube, LoadTicket, PredicateSet, ALL};
use engine::{Dimension, RawRecord};
use persistence::ExportArtifact;

use crate::api_types::{
    DashboardResponse, FilterControl, OptionsResponse, SetFilterParams, StatusResponse,
};
use crate::error::AppError;
use crate::source::fetch_records;
use crate::{lock, AppState, DatasetInfo};
use crate::{log_debug, log_enter, log_enter_info, log_exit, log_exit_info, log_info, log_warn};

// ============================================================================
// READS
// ============================================================================

fn status_of(cube: &Cube, dataset: &DatasetInfo) -> StatusResponse {
    StatusResponse {
        loading: cube.is_loading(),
        record_count: cube.records().len(),
        filtered_count: cube.filtered_len(),
        dataset_id: dataset.id,
        loaded_at: dataset.loaded_at,
        last_error: dataset.last_error.clone(),
    }
}

fn dashboard_of(state: &AppState, cube: &Cube) -> DashboardResponse {
    let snapshot = cube.snapshot();
    let dataset = lock(&state.dataset);
    DashboardResponse {
        predicates: snapshot.predicates.clone(),
        kpis: snapshot.aggregates.kpis.clone(),
        charts: snapshot.charts,
        table: snapshot.page,
        status: status_of(cube, &dataset),
    }
}

pub fn get_dashboard(state: &AppState) -> DashboardResponse {
    let cube = lock(&state.cube);
    dashboard_of(state, &cube)
}

pub fn get_status(state: &AppState) -> StatusResponse {
    let cube = lock(&state.cube);
    let dataset = lock(&state.dataset);
    status_of(&cube, &dataset)
}

/// Dropdown controls for every dimension, in display order.
pub fn get_options(state: &AppState) -> OptionsResponse {
    let cube = lock(&state.cube);
    let dataset = lock(&state.dataset);

    let controls = Dimension::ALL
        .iter()
        .map(|&dim| {
            let mut options = Vec::with_capacity(cube.options().get(dim).len() + 1);
            options.push(ALL.to_string());
            options.extend(cube.options().get(dim).iter().cloned());
            FilterControl {
                dimension: dim,
                label: dim.label(),
                selected: String::from(cube.predicates().filter(dim).clone()),
                options,
            }
        })
        .collect();

    OptionsResponse {
        dataset_id: dataset.id,
        controls,
    }
}

// ============================================================================
// PREDICATES
// ============================================================================

pub fn set_filter(state: &AppState, params: SetFilterParams) -> DashboardResponse {
    log_info!("CMD", "set_filter {}={:?}", params.dimension, params.value);
    let mut cube = lock(&state.cube);
    cube.set_filter(params.dimension, params.value);
    dashboard_of(state, &cube)
}

pub fn set_query(state: &AppState, query: String) -> DashboardResponse {
    log_info!("CMD", "set_query {:?}", query);
    let mut cube = lock(&state.cube);
    cube.set_query(query);
    dashboard_of(state, &cube)
}

pub fn set_predicates(state: &AppState, predicates: PredicateSet) -> DashboardResponse {
    log_info!("CMD", "set_predicates active={}", predicates.active_filters().len());
    let mut cube = lock(&state.cube);
    cube.set_predicates(predicates);
    dashboard_of(state, &cube)
}

pub fn reset_filters(state: &AppState) -> DashboardResponse {
    log_info!("CMD", "reset_filters");
    let mut cube = lock(&state.cube);
    cube.reset();
    dashboard_of(state, &cube)
}

// ============================================================================
// PAGING
// ============================================================================

pub fn set_page(state: &AppState, page: usize) -> DashboardResponse {
    let mut cube = lock(&state.cube);
    let shown = cube.set_page(page);
    log_info!("CMD", "set_page requested={} shown={}", page, shown);
    dashboard_of(state, &cube)
}

pub fn next_page(state: &AppState) -> DashboardResponse {
    let mut cube = lock(&state.cube);
    let shown = cube.next_page();
    log_debug!("CMD", "next_page shown={}/{}", shown, cube.page_count());
    dashboard_of(state, &cube)
}

pub fn prev_page(state: &AppState) -> DashboardResponse {
    let mut cube = lock(&state.cube);
    let shown = cube.previous_page();
    log_debug!("CMD", "prev_page shown={}/{}", shown, cube.page_count());
    dashboard_of(state, &cube)
}

// ============================================================================
// EXPORT
// ============================================================================

/// Serializes the current filtered subset with the configured columns.
/// An empty subset is `PersistenceError::NothingToExport`.
pub fn export_csv(state: &AppState) -> Result<ExportArtifact, AppError> {
    let cube = lock(&state.cube);
    log_enter!("CMD", "export_csv", "filtered={}", cube.filtered_len());
    let artifact = persistence::export_csv(cube.filtered(), cube.config().export_columns.as_slice())?;
    log_exit!("CMD", "export_csv", "records={} bytes={}", artifact.record_count, artifact.body.len());
    Ok(artifact)
}

// ============================================================================
// LOADING
// ============================================================================

/// Replaces the dataset synchronously.
pub fn load_records(state: &AppState, records: Vec<RawRecord>) -> StatusResponse {
    let ticket = begin_refresh(state);
    finish_refresh(state, ticket, Ok(records));
    get_status(state)
}

/// Issues a new load ticket; earlier tickets can no longer commit.
pub fn begin_refresh(state: &AppState) -> LoadTicket {
    lock(&state.cube).begin_load()
}

/// Commits a fetch result for `ticket`. A failed fetch commits an empty
/// dataset. Returns false when the ticket was superseded.
pub fn finish_refresh(
    state: &AppState,
    ticket: LoadTicket,
    result: Result<Vec<RawRecord>, AppError>,
) -> bool {
    let (records, error) = match result {
        Ok(records) => (records, None),
        Err(e) => {
            log_warn!("DATA", "fetch failed ticket={}: {}", ticket.id(), e);
            (Vec::new(), Some(e.to_string()))
        }
    };

    let mut cube = lock(&state.cube);
    if !cube.commit_load(ticket, records) {
        return false;
    }

    let mut dataset = lock(&state.dataset);
    *dataset = DatasetInfo {
        id: Some(uuid::Uuid::new_v4()),
        loaded_at: Some(chrono::Utc::now()),
        last_error: error,
    };
    true
}

/// Fetches the dataset from the configured source and commits it unless a
/// newer refresh started in the meantime.
pub async fn refresh_dataset(state: &AppState) -> StatusResponse {
    let ticket = begin_refresh(state);
    log_enter_info!("DATA", "refresh_dataset", "ticket={} source={}", ticket.id(), state.source);

    let result = fetch_records(&state.http, &state.source).await;
    let committed = finish_refresh(state, ticket, result);

    let status = get_status(state);
    log_exit_info!(
        "DATA",
        "refresh_dataset",
        "ticket={} committed={} records={}",
        ticket.id(),
        committed,
        status.record_count
    );
    status
}
