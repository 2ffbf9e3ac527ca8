//! Error types for the scorecast service

use thiserror::Error;

/// Result type alias for scorecast operations
pub type Result<T> = std::result::Result<T, ScorecastError>;

/// Main error type for the service.
///
/// Every failure is classified into one of three kinds visible at the
/// service boundary: a referenced file or artifact does not exist
/// (`NotFound`), the request or dataset violates a declared requirement
/// (`Validation`), or anything else went wrong while processing
/// (`Processing`, carrying the underlying message). The remaining
/// variants are internal model-layer errors that surface as processing
/// failures.
#[derive(Error, Debug)]
pub enum ScorecastError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("processing error: {0}")]
    Processing(String),

    #[error("model not fitted")]
    NotFitted,

    #[error("shape mismatch: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },
}

impl From<polars::error::PolarsError> for ScorecastError {
    fn from(err: polars::error::PolarsError) -> Self {
        ScorecastError::Processing(err.to_string())
    }
}

impl From<serde_json::Error> for ScorecastError {
    fn from(err: serde_json::Error) -> Self {
        ScorecastError::Processing(err.to_string())
    }
}

impl From<std::io::Error> for ScorecastError {
    fn from(err: std::io::Error) -> Self {
        ScorecastError::Processing(err.to_string())
    }
}
