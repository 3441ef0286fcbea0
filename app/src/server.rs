//! FILENAME: app/src/server.rs
// PURPOSE: HTTP surface for the rendering client.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cube_engine::PredicateSet;
use tokio::net::TcpListener;

use crate::api_types::{
    DashboardResponse, OptionsResponse, SetFilterParams, SetPageParams, SetQueryParams,
    StatusResponse,
};
use crate::commands;
use crate::error::AppError;
use crate::{log_error, log_info, AppState};

type SharedState = State<Arc<AppState>>;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/dashboard", get(dashboard))
        .route("/api/options", get(options))
        .route("/api/status", get(status))
        .route("/api/filters", post(set_filter))
        .route("/api/query", post(set_query))
        .route("/api/predicates", post(set_predicates))
        .route("/api/reset", post(reset))
        .route("/api/page", post(set_page))
        .route("/api/page/next", post(next_page))
        .route("/api/page/prev", post(prev_page))
        .route("/api/export", get(export))
        .route("/api/refresh", post(refresh))
        .with_state(state)
}

/// Serves until Ctrl+C.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<(), AppError> {
    let listener = TcpListener::bind(addr).await?;
    serve_until(listener, state, shutdown_signal()).await
}

/// Serves on an already bound listener until the process ends.
pub async fn serve_on(listener: TcpListener, state: Arc<AppState>) -> Result<(), AppError> {
    serve_until(listener, state, std::future::pending()).await
}

/// Serves on an already bound listener until `shutdown` resolves, then lets
/// in-flight requests finish.
pub async fn serve_until<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    log_info!("HTTP", "listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await?;
    log_info!("HTTP", "server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log_error!("HTTP", "failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

async fn dashboard(State(state): SharedState) -> Json<DashboardResponse> {
    Json(commands::get_dashboard(&state))
}

async fn options(State(state): SharedState) -> Json<OptionsResponse> {
    Json(commands::get_options(&state))
}

async fn status(State(state): SharedState) -> Json<StatusResponse> {
    Json(commands::get_status(&state))
}

async fn set_filter(
    State(state): SharedState,
    Json(params): Json<SetFilterParams>,
) -> Json<DashboardResponse> {
    Json(commands::set_filter(&state, params))
}

async fn set_query(
    State(state): SharedState,
    Json(params): Json<SetQueryParams>,
) -> Json<DashboardResponse> {
    Json(commands::set_query(&state, params.query))
}

async fn set_predicates(
    State(state): SharedState,
    Json(predicates): Json<PredicateSet>,
) -> Json<DashboardResponse> {
    Json(commands::set_predicates(&state, predicates))
}

async fn reset(State(state): SharedState) -> Json<DashboardResponse> {
    Json(commands::reset_filters(&state))
}

async fn set_page(
    State(state): SharedState,
    Json(params): Json<SetPageParams>,
) -> Json<DashboardResponse> {
    Json(commands::set_page(&state, params.page))
}

async fn next_page(State(state): SharedState) -> Json<DashboardResponse> {
    Json(commands::next_page(&state))
}

async fn prev_page(State(state): SharedState) -> Json<DashboardResponse> {
    Json(commands::prev_page(&state))
}

/// The CSV download; 204 when the filtered subset is empty.
async fn export(State(state): SharedState) -> Result<Response, AppError> {
    let artifact = commands::export_csv(&state)?;
    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.body,
    )
        .into_response())
}

async fn refresh(State(state): SharedState) -> Json<StatusResponse> {
    Json(commands::refresh_dataset(&state).await)
}
