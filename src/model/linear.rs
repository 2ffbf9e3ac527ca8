//! Standard-scaled ridge regression
//!
//! The linear candidate standardizes features and solves the regularized
//! normal equations. Scaler parameters are part of the fitted model so a
//! persisted bundle can reproduce the exact transform at inference time.

use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Solve the symmetric positive-definite system `a * x = b` via Cholesky
/// decomposition. The ridge penalty keeps the system positive definite,
/// so a failed decomposition means the input was degenerate.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let mut l = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L * y = b
    let mut y = Array1::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L^T * x = y
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Some(x)
}

/// Per-feature standardization: (x - mean) / std.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Option<Array1<f64>>,
    stds: Option<Array1<f64>>,
    is_fitted: bool,
}

impl Default for StandardScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardScaler {
    pub fn new() -> Self {
        Self {
            means: None,
            stds: None,
            is_fitted: false,
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        let n = x.nrows();
        if n == 0 {
            return Err(ScorecastError::Validation(
                "cannot fit scaler on an empty matrix".to_string(),
            ));
        }

        let means = x.mean_axis(Axis(0)).unwrap();
        let denom = (n as f64 - 1.0).max(1.0);
        let stds: Array1<f64> = (0..x.ncols())
            .map(|j| {
                let var = x
                    .column(j)
                    .iter()
                    .map(|v| (v - means[j]).powi(2))
                    .sum::<f64>()
                    / denom;
                let std = var.sqrt();
                // Constant columns scale by 1 so they stay finite.
                if std == 0.0 {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        self.means = Some(means);
        self.stds = Some(stds);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if !self.is_fitted {
            return Err(ScorecastError::NotFitted);
        }
        let means = self.means.as_ref().unwrap();
        let stds = self.stds.as_ref().unwrap();
        if x.ncols() != means.len() {
            return Err(ScorecastError::Shape {
                expected: format!("{} columns", means.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }

        let mut scaled = x.clone();
        for (j, mut col) in scaled.columns_mut().into_iter().enumerate() {
            col.mapv_inplace(|v| (v - means[j]) / stds[j]);
        }
        Ok(scaled)
    }
}

/// Ridge regression (L2-regularized least squares).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RidgeRegression {
    pub coefficients: Option<Array1<f64>>,
    pub intercept: Option<f64>,
    /// L2 regularization strength
    pub alpha: f64,
    pub is_fitted: bool,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha,
            is_fitted: false,
        }
    }

    /// Fit on centered data, solving (X^T X + alpha*I) w = X^T y.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();
        if n_samples != y.len() {
            return Err(ScorecastError::Shape {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ScorecastError::Validation(
                "cannot fit on an empty matrix".to_string(),
            ));
        }

        let x_mean = x.mean_axis(Axis(0)).unwrap();
        let y_mean = y.mean().unwrap_or(0.0);
        let x_c = x - &x_mean.clone().insert_axis(Axis(0));
        let y_c = y - y_mean;

        let mut xtx = x_c.t().dot(&x_c);
        for i in 0..n_features {
            xtx[[i, i]] += self.alpha;
        }
        let xty = x_c.t().dot(&y_c);

        let coefficients = cholesky_solve(&xtx, &xty).ok_or_else(|| {
            ScorecastError::Processing("singular design matrix in ridge solve".to_string())
        })?;

        self.intercept = Some(y_mean - coefficients.dot(&x_mean));
        self.coefficients = Some(coefficients);
        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(ScorecastError::NotFitted);
        }
        Ok(x.dot(self.coefficients.as_ref().unwrap()) + self.intercept.unwrap_or(0.0))
    }
}

/// The linear candidate: a standard scaler feeding a ridge regressor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaledRidge {
    scaler: StandardScaler,
    ridge: RidgeRegression,
}

impl ScaledRidge {
    pub fn new(alpha: f64) -> Self {
        Self {
            scaler: StandardScaler::new(),
            ridge: RidgeRegression::new(alpha),
        }
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        self.scaler.fit(x)?;
        let scaled = self.scaler.transform(x)?;
        self.ridge.fit(&scaled, y)?;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.ridge.predict(&scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_scaler_zero_mean_unit_std() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();

        for j in 0..2 {
            let mean: f64 = scaled.column(j).iter().sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-12);
        }
        assert!(scaled[[0, 0]] < 0.0 && scaled[[2, 0]] > 0.0);
    }

    #[test]
    fn test_scaler_constant_column() {
        let x = array![[5.0], [5.0], [5.0]];
        let mut scaler = StandardScaler::new();
        scaler.fit(&x).unwrap();
        let scaled = scaler.transform(&x).unwrap();
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_ridge_recovers_linear_trend() {
        // y = 2x + 1 with a tiny penalty: coefficients stay close.
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y = array![3.0, 5.0, 7.0, 9.0, 11.0];

        let mut ridge = RidgeRegression::new(1e-6);
        ridge.fit(&x, &y).unwrap();

        let preds = ridge.predict(&x).unwrap();
        for (p, t) in preds.iter().zip(y.iter()) {
            assert!((p - t).abs() < 1e-3, "predicted {p}, expected {t}");
        }
    }

    #[test]
    fn test_scaled_ridge_pipeline() {
        let x = array![
            [1.0, 100.0],
            [2.0, 200.0],
            [3.0, 300.0],
            [4.0, 400.0],
            [5.0, 500.0],
        ];
        let y = array![10.0, 20.0, 30.0, 40.0, 50.0];

        let mut model = ScaledRidge::new(1.0);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        assert_eq!(preds.len(), 5);
        assert!(preds.iter().all(|v| v.is_finite()));
        // Monotone input should give monotone predictions.
        assert!(preds[4] > preds[0]);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = ScaledRidge::new(1.0);
        let x = array![[1.0]];
        assert!(model.predict(&x).is_err());
    }
}
