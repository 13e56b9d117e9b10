use std::time::Duration;

use crate::error::{AppError, Result};

/// Columns the classifier consumes, in the order it expects them.
pub const REQUIRED_COLUMNS: [&str; FEATURE_COUNT] = [
    "LIMIT_BAL",
    "SEX",
    "EDUCATION",
    "MARRIAGE",
    "AGE",
    "PAY_0",
    "PAY_2",
    "PAY_3",
    "PAY_4",
    "PAY_5",
    "PAY_6",
    "BILL_AMT1",
    "BILL_AMT2",
    "BILL_AMT3",
    "BILL_AMT4",
    "BILL_AMT5",
    "BILL_AMT6",
    "PAY_AMT1",
    "PAY_AMT2",
    "PAY_AMT3",
    "PAY_AMT4",
    "PAY_AMT5",
    "PAY_AMT6",
];

pub const FEATURE_COUNT: usize = 23;

/// Index of `AGE` within `REQUIRED_COLUMNS`.
pub const AGE_INDEX: usize = 4;

/// Index of `LIMIT_BAL` within `REQUIRED_COLUMNS`.
pub const LIMIT_BAL_INDEX: usize = 0;

/// Derived column: probability of default, as a percentage rounded to 2 decimals.
pub const PROBABILITY_COLUMN: &str = "Default Probability (%)";

/// Derived column: "Yes" when the model predicts default, otherwise "No".
pub const LABEL_COLUMN: &str = "Predicted Default";

/// File name offered for the annotated CSV download.
pub const EXPORT_FILE_NAME: &str = "resultado_previsao.csv";

/// Rows shown in the results preview table.
pub const PREVIEW_ROWS: usize = 10;

/// Fixed bin count for the probability histogram.
pub const HISTOGRAM_BINS: usize = 20;

/// Cookie carrying the per-browser session id.
pub const SESSION_COOKIE: &str = "session_id";

/// How often the sweeper looks for expired session results (seconds).
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

pub const DEFAULT_MODEL_PATH: &str = "model/credit_default_model.json";

#[derive(Debug, Clone)]
pub struct Config {
    /// Classifier artifact loaded at boot (MODEL_PATH)
    pub model_path: String,
    pub log_level: String,
    pub api_port: u16,
    /// Largest accepted upload body in bytes (MAX_UPLOAD_BYTES)
    pub max_upload_bytes: usize,
    /// Upper bound on one upload's validate+infer+render run (INFERENCE_TIMEOUT_SECS)
    pub inference_timeout: Duration,
    /// Idle time after which a session's results are discarded (SESSION_TTL_SECS)
    pub session_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            model_path: std::env::var("MODEL_PATH")
                .unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            api_port: std::env::var("API_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse::<u16>()
                .map_err(|_| AppError::Config("API_PORT must be a valid port number".to_string()))?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| (50 * 1024 * 1024).to_string())
                .parse::<usize>()
                .map_err(|_| {
                    AppError::Config("MAX_UPLOAD_BYTES must be a byte count".to_string())
                })?,
            inference_timeout: Duration::from_secs(
                std::env::var("INFERENCE_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "30".to_string())
                    .parse::<u64>()
                    .map_err(|_| {
                        AppError::Config("INFERENCE_TIMEOUT_SECS must be whole seconds".to_string())
                    })?,
            ),
            session_ttl: Duration::from_secs(
                std::env::var("SESSION_TTL_SECS")
                    .unwrap_or_else(|_| "1800".to_string())
                    .parse::<u64>()
                    .map_err(|_| {
                        AppError::Config("SESSION_TTL_SECS must be whole seconds".to_string())
                    })?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_indices_point_at_their_columns() {
        assert_eq!(REQUIRED_COLUMNS[AGE_INDEX], "AGE");
        assert_eq!(REQUIRED_COLUMNS[LIMIT_BAL_INDEX], "LIMIT_BAL");
    }

    #[test]
    fn required_columns_are_unique() {
        let mut names = REQUIRED_COLUMNS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), FEATURE_COUNT);
    }
}
