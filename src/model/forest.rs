//! Random-forest regressor
//!
//! Bagged regression trees with per-tree seeds derived deterministically
//! from the base seed, so a fixed seed gives an identical forest no
//! matter how rayon schedules the tree builds.

use crate::error::{Result, ScorecastError};
use ndarray::{Array1, Array2, Axis};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::tree::DecisionTree;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    trees: Vec<DecisionTree>,
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub random_state: u64,
}

impl RandomForestRegressor {
    /// Forest with unlimited tree depth and the given ensemble size.
    pub fn new(n_estimators: usize) -> Self {
        Self {
            trees: Vec::new(),
            n_estimators,
            max_depth: None,
            random_state: 0,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit all trees on bootstrap samples, in parallel.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(ScorecastError::Shape {
                expected: format!("y length = {n_samples}"),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(ScorecastError::Validation(
                "cannot fit a forest on an empty matrix".to_string(),
            ));
        }

        let base_seed = self.random_state;
        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(tree_idx as u64));

                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| (rng.next_u64() as usize) % n_samples)
                    .collect();

                let x_boot = x.select(Axis(0), &sample_indices);
                let y_boot: Array1<f64> =
                    Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

                let mut tree = DecisionTree::new();
                if let Some(d) = self.max_depth {
                    tree = tree.with_max_depth(d);
                }
                tree.fit(&x_boot, &y_boot)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        Ok(self)
    }

    /// Mean of the per-tree predictions.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if self.trees.is_empty() {
            return Err(ScorecastError::NotFitted);
        }

        let all_predictions: Result<Vec<Array1<f64>>> =
            self.trees.par_iter().map(|tree| tree.predict(x)).collect();
        let all_predictions = all_predictions?;

        let n_samples = x.nrows();
        let n_trees = all_predictions.len() as f64;
        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| all_predictions.iter().map(|p| p[i]).sum::<f64>() / n_trees)
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn training_data() -> (Array2<f64>, Array1<f64>) {
        (
            array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0], [7.0], [8.0]],
            array![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )
    }

    #[test]
    fn test_fit_predict() {
        let (x, y) = training_data();
        let mut forest = RandomForestRegressor::new(20).with_random_state(42);
        forest.fit(&x, &y).unwrap();
        assert_eq!(forest.n_trees(), 20);

        let preds = forest.predict(&x).unwrap();
        let mse: f64 = preds
            .iter()
            .zip(y.iter())
            .map(|(p, a)| (p - a).powi(2))
            .sum::<f64>()
            / y.len() as f64;
        assert!(mse < 2.0, "MSE too high: {mse}");
    }

    #[test]
    fn test_deterministic_with_same_seed() {
        let (x, y) = training_data();

        let mut a = RandomForestRegressor::new(10).with_random_state(42);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForestRegressor::new(10).with_random_state(42);
        b.fit(&x, &y).unwrap();

        let pa = a.predict(&x).unwrap();
        let pb = b.predict(&x).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_different_seeds_differ() {
        let (x, y) = training_data();

        let mut a = RandomForestRegressor::new(10).with_random_state(1);
        a.fit(&x, &y).unwrap();
        let mut b = RandomForestRegressor::new(10).with_random_state(2);
        b.fit(&x, &y).unwrap();

        assert_ne!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let forest = RandomForestRegressor::new(5);
        assert!(matches!(
            forest.predict(&array![[1.0]]),
            Err(ScorecastError::NotFitted)
        ));
    }
}
