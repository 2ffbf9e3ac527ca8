//! Regression evaluation metrics

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Holdout metrics for one candidate model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionMetrics {
    #[serde(rename = "MAE")]
    pub mae: f64,
    #[serde(rename = "RMSE")]
    pub rmse: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    /// Display name of the candidate these metrics belong to.
    #[serde(rename = "modelo")]
    pub model: String,
}

impl RegressionMetrics {
    /// Compute MAE, RMSE, and R² of `y_pred` against `y_true`.
    pub fn compute(model: &str, y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len() as f64;
        let errors: Vec<f64> = y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(t, p)| t - p)
            .collect();

        let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
        let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

        let y_mean: f64 = y_true.iter().sum::<f64>() / n;
        let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
        let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
        let r2 = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

        Self {
            mae,
            rmse: mse.sqrt(),
            r2,
            model: model.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_fit() {
        let y = array![1.0, 2.0, 3.0, 4.0];
        let m = RegressionMetrics::compute("Ridge", &y, &y);
        assert_eq!(m.mae, 0.0);
        assert_eq!(m.rmse, 0.0);
        assert_eq!(m.r2, 1.0);
        assert_eq!(m.model, "Ridge");
    }

    #[test]
    fn test_known_values() {
        let y_true = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let y_pred = array![1.1, 2.0, 2.9, 4.1, 5.0];
        let m = RegressionMetrics::compute("RandomForest", &y_true, &y_pred);
        assert!((m.mae - 0.06).abs() < 1e-12);
        assert!(m.rmse > 0.0 && m.rmse < 0.1);
        assert!(m.r2 > 0.99);
    }

    #[test]
    fn test_constant_target_r2_is_zero() {
        let y_true = array![3.0, 3.0, 3.0];
        let y_pred = array![2.0, 3.0, 4.0];
        let m = RegressionMetrics::compute("Ridge", &y_true, &y_pred);
        assert_eq!(m.r2, 0.0);
    }

    #[test]
    fn test_wire_field_names() {
        let y = array![1.0, 2.0];
        let m = RegressionMetrics::compute("Ridge", &y, &y);
        let json = serde_json::to_value(&m).unwrap();
        assert!(json.get("MAE").is_some());
        assert!(json.get("RMSE").is_some());
        assert!(json.get("R2").is_some());
        assert_eq!(json.get("modelo").unwrap(), "Ridge");
    }
}
