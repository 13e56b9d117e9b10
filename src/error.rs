use std::time::Duration;

use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::config::REQUIRED_COLUMNS;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("The file is missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Could not read the file: {0}")]
    Parse(String),

    #[error("The model could not score this file: {0}")]
    Inference(String),

    #[error("Scoring did not finish within {}s", .0.as_secs())]
    InferenceTimeout(Duration),

    #[error("Model load error: {0}")]
    ModelLoad(String),

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("No results for this session; upload a file first")]
    SessionNotFound,

    #[error("A newer upload in this session replaced this one")]
    Superseded,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::Parse(e.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Schema { .. } | AppError::Inference(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Parse(_) | AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::InferenceTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::SessionNotFound => StatusCode::NOT_FOUND,
            AppError::Superseded => StatusCode::CONFLICT,
            AppError::ModelLoad(_) | AppError::Export(_) | AppError::Config(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Extra guidance shown under the error banner.
    pub fn hint(&self) -> Option<String> {
        match self {
            AppError::Schema { .. } => Some(format!("Expected: {}", REQUIRED_COLUMNS.join(", "))),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_lists_missing_columns() {
        let err = AppError::Schema {
            missing: vec!["PAY_6".to_string(), "AGE".to_string()],
        };
        assert_eq!(err.to_string(), "The file is missing required columns: PAY_6, AGE");
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let hint = err.hint().expect("schema errors carry the expected set");
        assert!(hint.contains("LIMIT_BAL") && hint.contains("PAY_AMT6"));
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let err = AppError::InferenceTimeout(Duration::from_secs(30));
        assert_eq!(err.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(err.to_string(), "Scoring did not finish within 30s");
    }
}
