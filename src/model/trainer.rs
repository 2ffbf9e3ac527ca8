//! Train-select-persist cycle
//!
//! Fits both candidate regressors on an 80/20 split of an encoded
//! dataset, scores them on the holdout rows, and persists the one with
//! the lower RMSE as the service's single model bundle.

use crate::data::loader;
use crate::error::{Result, ScorecastError};
use chrono::Utc;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::bundle::{CandidateReport, ModelBundle, Regressor};
use super::forest::RandomForestRegressor;
use super::linear::ScaledRidge;
use super::metrics::RegressionMetrics;

const RIDGE_ALPHA: f64 = 1.0;
const FOREST_SIZE: usize = 300;
const HOLDOUT_FRACTION: f64 = 0.2;

/// Report returned by a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainReport {
    pub ok: bool,
    #[serde(rename = "ruta_modelo")]
    pub model_path: String,
    pub dataset: String,
    pub metrics: CandidateReport,
    pub features: Vec<String>,
}

/// Trains on encoded datasets from the processed-data area.
#[derive(Debug, Clone)]
pub struct Trainer {
    processed_dir: PathBuf,
    model_path: PathBuf,
    target: String,
    seed: u64,
}

impl Trainer {
    pub fn new(processed_dir: PathBuf, model_path: PathBuf, target: impl Into<String>) -> Self {
        Self {
            processed_dir,
            model_path,
            target: target.into(),
            seed: 42,
        }
    }

    /// Train both candidates on `<processed_dir>/<clean_filename>`,
    /// persist the better one, and return the full report.
    ///
    /// Selection is by holdout RMSE; the forest wins only when strictly
    /// lower, so a tie keeps the ridge candidate.
    pub fn train_and_persist(&self, clean_filename: &str) -> Result<TrainReport> {
        let path = self.processed_dir.join(clean_filename);
        if !path.exists() {
            return Err(ScorecastError::NotFound(format!(
                "encoded dataset {} (expected at {})",
                clean_filename,
                path.display()
            )));
        }

        let df = loader::load_csv(&path)?;
        let (x, y, feature_names) = self.split_features_target(&df)?;
        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, HOLDOUT_FRACTION, self.seed)?;

        tracing::info!(
            dataset = clean_filename,
            train_rows = x_train.nrows(),
            holdout_rows = x_test.nrows(),
            features = feature_names.len(),
            "fitting candidate models"
        );

        let mut ridge = ScaledRidge::new(RIDGE_ALPHA);
        ridge.fit(&x_train, &y_train)?;

        let mut forest = RandomForestRegressor::new(FOREST_SIZE).with_random_state(self.seed);
        forest.fit(&x_train, &y_train)?;

        let ridge_metrics = RegressionMetrics::compute("Ridge", &y_test, &ridge.predict(&x_test)?);
        let forest_metrics =
            RegressionMetrics::compute("RandomForest", &y_test, &forest.predict(&x_test)?);

        let (best, model) = if forest_metrics.rmse < ridge_metrics.rmse {
            (forest_metrics.clone(), Regressor::RandomForest(forest))
        } else {
            (ridge_metrics.clone(), Regressor::Ridge(ridge))
        };
        tracing::info!(
            selected = model.name(),
            rmse = best.rmse,
            "candidate selected"
        );

        let metrics = CandidateReport {
            ridge: ridge_metrics,
            random_forest: forest_metrics,
            best,
        };

        let bundle = ModelBundle {
            model,
            feature_names: feature_names.clone(),
            target: self.target.clone(),
            dataset: clean_filename.to_string(),
            metrics: metrics.clone(),
            trained_at: Utc::now(),
        };
        bundle.save(&self.model_path)?;

        Ok(TrainReport {
            ok: true,
            model_path: self.model_path.display().to_string(),
            dataset: clean_filename.to_string(),
            metrics,
            features: feature_names,
        })
    }

    /// Extract the target column and the feature matrix (all other
    /// columns, in file order).
    fn split_features_target(&self, df: &DataFrame) -> Result<(Array2<f64>, Array1<f64>, Vec<String>)> {
        let target_series = df.column(&self.target).map_err(|_| {
            ScorecastError::Validation(format!(
                "target column '{}' not found in the encoded dataset",
                self.target
            ))
        })?;

        let y: Array1<f64> = target_series
            .as_materialized_series()
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(0.0))
            .collect();

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != self.target)
            .map(|s| s.to_string())
            .collect();

        let n_rows = df.height();
        let n_cols = feature_names.len();
        let mut x_data = Vec::with_capacity(n_rows * n_cols);
        for col_name in &feature_names {
            let values: Vec<f64> = df
                .column(col_name)?
                .as_materialized_series()
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            x_data.extend(values);
        }

        let x = Array2::from_shape_vec((n_cols, n_rows), x_data)
            .map_err(|e| ScorecastError::Shape {
                expected: format!("({n_cols}, {n_rows})"),
                actual: e.to_string(),
            })?
            .t()
            .to_owned();

        Ok((x, y, feature_names))
    }
}

/// Shuffle rows with a seeded RNG and split off the holdout fraction.
fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    holdout_fraction: f64,
    seed: u64,
) -> Result<(Array2<f64>, Array2<f64>, Array1<f64>, Array1<f64>)> {
    let n = x.nrows();
    let n_test = ((n as f64) * holdout_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ScorecastError::Validation(format!(
            "dataset has {n} rows, not enough for an 80/20 split"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    let x_train = x.select(Axis(0), train_idx);
    let x_test = x.select(Axis(0), test_idx);
    let y_train = Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect());
    let y_test = Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect());

    Ok((x_train, x_test, y_train, y_test))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_split_sizes() {
        let x = Array2::from_shape_fn((10, 2), |(i, j)| (i * 2 + j) as f64);
        let y = Array1::from_shape_fn(10, |i| i as f64);

        let (x_train, x_test, y_train, y_test) = train_test_split(&x, &y, 0.2, 42).unwrap();
        assert_eq!(x_train.nrows(), 8);
        assert_eq!(x_test.nrows(), 2);
        assert_eq!(y_train.len(), 8);
        assert_eq!(y_test.len(), 2);
    }

    #[test]
    fn test_split_deterministic() {
        let x = Array2::from_shape_fn((20, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(20, |i| i as f64);

        let (a_train, ..) = train_test_split(&x, &y, 0.2, 42).unwrap();
        let (b_train, ..) = train_test_split(&x, &y, 0.2, 42).unwrap();
        assert_eq!(a_train, b_train);
    }

    #[test]
    fn test_split_rejects_tiny_dataset() {
        let x = array![[1.0]];
        let y = array![1.0];
        assert!(train_test_split(&x, &y, 0.2, 42).is_err());
    }

    #[test]
    fn test_split_rows_partition_the_data() {
        let x = Array2::from_shape_fn((10, 1), |(i, _)| i as f64);
        let y = Array1::from_shape_fn(10, |i| i as f64);

        let (x_train, x_test, ..) = train_test_split(&x, &y, 0.2, 7).unwrap();
        let mut all: Vec<f64> = x_train.column(0).to_vec();
        all.extend(x_test.column(0).to_vec());
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let expected: Vec<f64> = (0..10).map(|i| i as f64).collect();
        assert_eq!(all, expected);
    }
}
