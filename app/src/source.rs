//! FILENAME: app/src/source.rs
// PURPOSE: Dataset source (data endpoint over HTTP, or a JSON file).

use std::fmt;
use std::path::PathBuf;

use engine::RawRecord;
use persistence::{parse_payload, parse_payload_str};
use serde_json::Value;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Http(String),
    File(PathBuf),
}

impl DataSource {
    /// `http://` and `https://` locations are fetched, anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Http(location.to_string())
        } else {
            DataSource::File(PathBuf::from(location))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Http(url) => write!(f, "{}", url),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Fetches the full dataset.
pub async fn fetch_records(
    client: &reqwest::Client,
    source: &DataSource,
) -> Result<Vec<RawRecord>, AppError> {
    match source {
        DataSource::Http(url) => {
            let response = client.get(url).send().await?.error_for_status()?;
            let payload: Value = response.json().await?;
            Ok(parse_payload(payload))
        }
        DataSource::File(path) => {
            let text = tokio::fs::read_to_string(path).await?;
            Ok(parse_payload_str(&text)?)
        }
    }
}
