//! Persisted trained-model bundle
//!
//! A bundle is everything a later prediction call needs: the fitted
//! regressor, the exact feature order it was fit with, the target name,
//! the source dataset, and the evaluation that selected it. It is written
//! as a whole and replaced as a whole.

use crate::error::{Result, ScorecastError};
use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::forest::RandomForestRegressor;
use super::linear::ScaledRidge;
use super::metrics::RegressionMetrics;

/// Either of the two candidate regressors, tagged for serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Ridge(ScaledRidge),
    RandomForest(RandomForestRegressor),
}

impl Regressor {
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            Regressor::Ridge(model) => model.predict(x),
            Regressor::RandomForest(model) => model.predict(x),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Regressor::Ridge(_) => "Ridge",
            Regressor::RandomForest(_) => "RandomForest",
        }
    }
}

/// Metrics for both candidates plus the selected one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateReport {
    pub ridge: RegressionMetrics,
    pub random_forest: RegressionMetrics,
    #[serde(rename = "mejor")]
    pub best: RegressionMetrics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: Regressor,
    /// Feature columns in the exact order the regressor was fit with.
    pub feature_names: Vec<String>,
    pub target: String,
    /// Name of the encoded dataset file the model was trained on.
    pub dataset: String,
    pub metrics: CandidateReport,
    pub trained_at: DateTime<Utc>,
}

impl ModelBundle {
    /// Persist the bundle, replacing any previous one.
    ///
    /// The JSON is written to a temp file and atomically renamed into
    /// place, so a concurrent reader sees the old or the new bundle but
    /// never a partial one.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec(self)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Load the bundle, or fail with a not-found error if no training has
    /// happened yet.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScorecastError::NotFound(format!(
                "no trained model at {}; train one first",
                path.display()
            )));
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
