//! Prediction against the persisted bundle
//!
//! Incoming instances are arbitrary feature maps. They are reconciled
//! against the bundle's stored feature order before the matrix is built:
//! the fitted regressors are positional, so feeding columns in any other
//! order would silently produce wrong predictions.

use crate::error::{Result, ScorecastError};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

use super::bundle::ModelBundle;

/// Response for a batch of predictions, one per input instance, in input
/// order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(rename = "predicciones")]
    pub predictions: Vec<f64>,
    pub n: usize,
}

/// Serves point predictions from the persisted model bundle.
#[derive(Debug, Clone)]
pub struct Predictor {
    model_path: PathBuf,
}

impl Predictor {
    pub fn new(model_path: PathBuf) -> Self {
        Self { model_path }
    }

    /// Predict one value per instance.
    ///
    /// Reconciliation policy: features the model expects but an instance
    /// omits are filled with 0.0 (a fixed default, not a statistic);
    /// features the model does not know are dropped.
    pub fn predict(&self, instances: &[Value]) -> Result<PredictResponse> {
        let bundle = ModelBundle::load(&self.model_path)?;
        let feature_names = &bundle.feature_names;

        let mut x_data = Vec::with_capacity(instances.len() * feature_names.len());
        for (idx, instance) in instances.iter().enumerate() {
            let obj = instance.as_object().ok_or_else(|| {
                ScorecastError::Validation(format!(
                    "instance {idx} is not an object of feature values"
                ))
            })?;

            for name in feature_names {
                let value = match obj.get(name) {
                    None => 0.0,
                    Some(v) => numeric_value(v).ok_or_else(|| {
                        ScorecastError::Validation(format!(
                            "instance {idx}: feature '{name}' must be numeric, got {v}"
                        ))
                    })?,
                };
                x_data.push(value);
            }
        }

        let x = Array2::from_shape_vec((instances.len(), feature_names.len()), x_data)
            .map_err(|e| ScorecastError::Shape {
                expected: format!("({}, {})", instances.len(), feature_names.len()),
                actual: e.to_string(),
            })?;

        let predictions = bundle.model.predict(&x)?;
        Ok(PredictResponse {
            n: predictions.len(),
            predictions: predictions.to_vec(),
        })
    }
}

fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
