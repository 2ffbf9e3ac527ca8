//! scorecast — student-performance data preparation and model serving
//!
//! The crate turns a raw student-performance CSV into a numeric table,
//! trains two candidate regressors on it, persists the better one, and
//! serves point predictions over HTTP.
//!
//! # Modules
//!
//! - [`schema`] - the explicit column-set configuration that drives encoding
//! - [`data`] - CSV loading and the categorical-to-numeric encoder
//! - [`model`] - candidate regressors, train/select/persist, prediction
//! - [`server`] - axum HTTP layer
//! - [`cli`] - command-line interface

pub mod cli;
pub mod data;
pub mod error;
pub mod model;
pub mod schema;
pub mod server;

pub use error::{Result, ScorecastError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{DatasetEncoder, PrepareSummary};
    pub use crate::error::{Result, ScorecastError};
    pub use crate::model::{ModelBundle, PredictResponse, Predictor, TrainReport, Trainer};
    pub use crate::schema::{EncodingSchema, UnknownLabelPolicy};
    pub use crate::server::{AppState, ServerConfig};
}
