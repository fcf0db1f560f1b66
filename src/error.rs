use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use std::path::PathBuf;
use thiserror::Error;

/// Failure while asking the extraction service for metadata.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("could not run the extraction service: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0}")]
    Service(String),

    #[error("unreadable metadata: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failure while materializing a variant to disk.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("could not run the extraction service: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("{0}")]
    Service(String),

    #[error("no file was written to {}", .0.display())]
    Missing(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What a handler can fail with; rendered as `{"error": ...}`.
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    Resolution(ResolutionError),
    BadRequest(String),
    NotFound(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Resolution(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    // Internal details stay in the log.
    fn message(self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!("Request failed: {:?}", e);
                "An internal server error occurred".to_string()
            }
            AppError::Resolution(e) => format!("Error fetching video info: {}", e),
            AppError::BadRequest(m) | AppError::NotFound(m) => m,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}
