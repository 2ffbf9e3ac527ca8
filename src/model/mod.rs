//! Model training, persistence, and prediction
//!
//! Two candidate regressors compete on every training run: a
//! standard-scaled ridge regression and a bagged random forest. The one
//! with the lower holdout RMSE is persisted as the single model bundle
//! that prediction calls read.

pub mod bundle;
pub mod forest;
pub mod linear;
pub mod metrics;
pub mod predictor;
pub mod trainer;
pub mod tree;

pub use bundle::{CandidateReport, ModelBundle, Regressor};
pub use forest::RandomForestRegressor;
pub use linear::{RidgeRegression, ScaledRidge, StandardScaler};
pub use metrics::RegressionMetrics;
pub use predictor::{PredictResponse, Predictor};
pub use trainer::{TrainReport, Trainer};
pub use tree::DecisionTree;
