//! FILENAME: app/src/config.rs
// PURPOSE: Service configuration (JSON file + environment overrides).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use cube_engine::{CubeConfig, DEFAULT_EXPORT_COLUMNS, DEFAULT_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::source::DataSource;

pub const DEFAULT_DATA_SOURCE: &str = "http://localhost:8000/data";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3030";

pub const ENV_DATA_SOURCE: &str = "DASHBOARD_DATA_SOURCE";
pub const ENV_LISTEN_ADDR: &str = "DASHBOARD_LISTEN_ADDR";
pub const ENV_PAGE_SIZE: &str = "DASHBOARD_PAGE_SIZE";
pub const ENV_LOG_DIR: &str = "DASHBOARD_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset URL (`http://`, `https://`) or file path.
    pub data_source: String,
    pub listen_addr: String,
    pub page_size: usize,
    pub export_columns: Vec<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data_source: DEFAULT_DATA_SOURCE.to_string(),
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            export_columns: DEFAULT_EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Reads the optional config file, applies environment overrides and
    /// validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => AppConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Applies overrides from `lookup` (the process environment in production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(source) = lookup(ENV_DATA_SOURCE) {
            self.data_source = source;
        }
        if let Some(addr) = lookup(ENV_LISTEN_ADDR) {
            self.listen_addr = addr;
        }
        if let Some(size) = lookup(ENV_PAGE_SIZE) {
            self.page_size = size.trim().parse().map_err(|_| {
                AppError::Config(format!("{} must be a positive integer, got {:?}", ENV_PAGE_SIZE, size))
            })?;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be at least 1".to_string()));
        }
        if self.export_columns.is_empty() {
            return Err(AppError::Config("export_columns must not be empty".to_string()));
        }
        if self.data_source.trim().is_empty() {
            return Err(AppError::Config("data_source must not be empty".to_string()));
        }
        self.socket_addr()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.listen_addr
            .parse()
            .map_err(|e| AppError::Config(format!("listen_addr {:?}: {}", self.listen_addr, e)))
    }

    pub fn source(&self) -> DataSource {
        DataSource::parse(&self.data_source)
    }

    pub fn cube_config(&self) -> CubeConfig {
        CubeConfig {
            page_size: self.page_size,
            export_columns: self.export_columns.clone(),
        }
    }
}
