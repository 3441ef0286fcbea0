//! FILENAME: app/src/lib.rs
// PURPOSE: Main library entry point (dashboard service).
// CONTEXT: Owns the application state, the command layer and the HTTP surface.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use cube_engine::Cube;
use uuid::Uuid;

pub mod api_types;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod server;
pub mod source;

pub use api_types::{
    DashboardResponse, FilterControl, OptionsResponse, SetFilterParams, SetPageParams,
    SetQueryParams, StatusResponse,
};
pub use config::AppConfig;
pub use error::AppError;
pub use logging::{init_log_file, get_log_path, install_logger, next_seq, sort_log_file, write_log};
pub use source::DataSource;

// ============================================================================
// APPLICATION STATE
// ============================================================================

/// Bookkeeping for the most recently committed dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetInfo {
    pub id: Option<Uuid>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Lock order: `cube` before `dataset`.
pub struct AppState {
    pub config: AppConfig,
    pub source: DataSource,
    pub http: reqwest::Client,
    pub cube: Mutex<Cube>,
    pub dataset: Mutex<DatasetInfo>,
}

pub fn create_app_state() -> AppState {
    create_app_state_with(AppConfig::default())
}

pub fn create_app_state_with(config: AppConfig) -> AppState {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    AppState {
        source: config.source(),
        cube: Mutex::new(Cube::new(config.cube_config())),
        dataset: Mutex::new(DatasetInfo::default()),
        http,
        config,
    }
}

/// Locks a state mutex, recovering the data if a previous holder panicked.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Loads configuration, starts logging, kicks off the first fetch and serves
/// the HTTP surface until Ctrl+C. The log file is sorted by sequence on the
/// way out.
pub async fn run() -> Result<(), AppError> {
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("DASHBOARD_CONFIG").map(PathBuf::from));
    let config = AppConfig::load(config_path.as_deref())?;

    if let Err(e) = init_log_file(config.log_dir.as_deref()) {
        eprintln!("[LOG_INIT] {}; logging to console only", e);
    }
    install_logger(log::LevelFilter::Info);

    let addr = config.socket_addr()?;
    log_info!("APP", "starting source={} addr={}", config.data_source, addr);

    let state = Arc::new(create_app_state_with(config));

    let initial = Arc::clone(&state);
    tokio::spawn(async move {
        commands::refresh_dataset(&initial).await;
    });

    let served = server::serve(state, addr).await;
    if let Err(ref e) = served {
        log_error!("APP", "server failed: {}", e);
    }
    shutdown_logging();
    served
}

/// Sorts the unified log file. A console-only run has nothing to sort.
pub fn shutdown_logging() -> Option<usize> {
    match sort_log_file() {
        Ok(lines) => Some(lines),
        Err(e) => {
            eprintln!("[LOG_SHUTDOWN] {}", e);
            None
        }
    }
}
