//! Gradient-boosted trees backed by the `gbdt` crate.

use std::fmt;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::ModelError;
use super::metrics::log_loss;

/// gbdt's binary log-loss objective; labels must be encoded as -1 / +1
const LOG_LOSS_OBJECTIVE: &str = "LogLikelyhood";

/// Hyperparameters for [`GradientBoostingClassifier`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingParams {
    pub n_estimators: usize,
    pub max_depth: u32,
    pub learning_rate: f32,
    pub min_leaf_size: usize,
    /// Metric reported on the training data after fit
    pub eval_metric: String,
    /// gbdt draws no samples at ratio 1.0; the seed is kept with the params
    pub random_state: u64,
}

impl Default for GradientBoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 5,
            learning_rate: 0.05,
            min_leaf_size: 1,
            eval_metric: "logloss".to_string(),
            random_state: 42,
        }
    }
}

/// Untrained boosted-tree classifier
#[derive(Debug, Clone, PartialEq)]
pub struct GradientBoostingClassifier {
    pub params: GradientBoostingParams,
}

impl GradientBoostingClassifier {
    pub fn new(params: GradientBoostingParams) -> Self {
        Self { params }
    }

    fn config(&self, n_features: usize) -> Config {
        let mut cfg = Config::new();
        cfg.set_feature_size(n_features);
        cfg.set_max_depth(self.params.max_depth);
        cfg.set_iterations(self.params.n_estimators);
        cfg.set_shrinkage(self.params.learning_rate);
        cfg.set_min_leaf_size(self.params.min_leaf_size);
        cfg.set_loss(LOG_LOSS_OBJECTIVE);
        cfg.set_data_sample_ratio(1.0);
        cfg.set_feature_sample_ratio(1.0);
        cfg.set_training_optimization_level(2);
        cfg.set_debug(false);
        cfg
    }

    pub fn fit(&self, x: &Array2<f64>, y: &[u8]) -> Result<FittedGradientBoosting, ModelError> {
        let n_features = x.ncols();
        let mut train: DataVec = x
            .rows()
            .into_iter()
            .zip(y.iter())
            .map(|(row, &label)| {
                let target = if label == 1 { 1.0 } else { -1.0 };
                Data::new_training_data(to_f32(row), 1.0, target, None)
            })
            .collect();

        let mut model = GBDT::new(&self.config(n_features));
        model.fit(&mut train);

        let fitted = FittedGradientBoosting {
            params: self.params.clone(),
            n_features,
            model,
        };

        let train_loss = log_loss(y, &fitted.predict_proba(x)?);
        debug!(
            n_estimators = self.params.n_estimators,
            metric = %self.params.eval_metric,
            train_loss,
            "boosted trees fitted"
        );

        Ok(fitted)
    }
}

/// Trained boosted-tree classifier
#[derive(Serialize, Deserialize)]
pub struct FittedGradientBoosting {
    pub params: GradientBoostingParams,
    pub n_features: usize,
    model: GBDT,
}

impl FittedGradientBoosting {
    /// Probability of the positive class for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let data: DataVec = x
            .rows()
            .into_iter()
            .map(|row| Data::new_test_data(to_f32(row), None))
            .collect();

        Ok(self
            .model
            .predict(&data)
            .into_iter()
            .map(|p| f64::from(p).clamp(0.0, 1.0))
            .collect())
    }
}

impl fmt::Debug for FittedGradientBoosting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FittedGradientBoosting")
            .field("params", &self.params)
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

fn to_f32(row: ArrayView1<'_, f64>) -> Vec<f32> {
    row.iter().map(|&v| v as f32).collect()
}
