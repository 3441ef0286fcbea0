//! FILENAME: app/src/error.rs

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use persistence::PersistenceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Http(_) => StatusCode::BAD_GATEWAY,
            AppError::Persistence(PersistenceError::NothingToExport) => StatusCode::NO_CONTENT,
            AppError::Config(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::NO_CONTENT {
            return status.into_response();
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
