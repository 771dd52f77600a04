//! Classifier factory and the trained-model wrapper.

pub mod boosting;
pub mod error;
pub mod logistic;
pub mod metrics;

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use boosting::{FittedGradientBoosting, GradientBoostingClassifier, GradientBoostingParams};
pub use error::ModelError;
pub use logistic::{FittedLogisticRegression, LogisticRegression, LogisticRegressionParams};

/// Probability above which a row is classified as the positive class
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Model families selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Xgb,
    Logreg,
}

impl ModelKind {
    /// Human readable family name, used as the run-name prefix
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelKind::Xgb => "XGBoost",
            ModelKind::Logreg => "LogisticRegression",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xgb" => Ok(ModelKind::Xgb),
            "logreg" => Ok(ModelKind::Logreg),
            _ => Err(ModelError::UnknownModel(s.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelKind::Xgb => write!(f, "xgb"),
            ModelKind::Logreg => write!(f, "logreg"),
        }
    }
}

/// An unfitted classifier with its hyperparameters fixed
#[derive(Debug, Clone, PartialEq)]
pub enum Classifier {
    GradientBoosting(GradientBoostingClassifier),
    Logistic(LogisticRegression),
}

/// Build the classifier for a model family with its standard hyperparameters.
///
/// * `xgb`: 200 trees of depth 5, learning rate 0.05, log-loss, seed 42
/// * `logreg`: L2 logistic regression capped at 1000 iterations
pub fn get_model(kind: ModelKind) -> Classifier {
    match kind {
        ModelKind::Xgb => Classifier::GradientBoosting(GradientBoostingClassifier::new(
            GradientBoostingParams::default(),
        )),
        ModelKind::Logreg => {
            Classifier::Logistic(LogisticRegression::new(LogisticRegressionParams::default()))
        }
    }
}

/// Same as [`get_model`] but resolves the family from its selector string
pub fn get_model_by_name(name: &str) -> Result<Classifier, ModelError> {
    Ok(get_model(name.parse()?))
}

impl Classifier {
    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::GradientBoosting(_) => ModelKind::Xgb,
            Classifier::Logistic(_) => ModelKind::Logreg,
        }
    }

    /// Train on a dense feature matrix with 0/1 labels
    pub fn fit(&self, x: &Array2<f64>, y: &[u8]) -> Result<FittedClassifier, ModelError> {
        validate_training_data(x, y)?;
        match self {
            Classifier::GradientBoosting(m) => m.fit(x, y).map(FittedClassifier::GradientBoosting),
            Classifier::Logistic(m) => m.fit(x, y).map(FittedClassifier::Logistic),
        }
    }
}

fn validate_training_data(x: &Array2<f64>, y: &[u8]) -> Result<(), ModelError> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::LengthMismatch {
            rows: x.nrows(),
            labels: y.len(),
        });
    }
    let positives = y.iter().filter(|&&v| v == 1).count();
    if positives == 0 {
        return Err(ModelError::SingleClass(0));
    }
    if positives == y.len() {
        return Err(ModelError::SingleClass(1));
    }
    Ok(())
}

/// A trained classifier
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", content = "model", rename_all = "snake_case")]
pub enum FittedClassifier {
    GradientBoosting(FittedGradientBoosting),
    Logistic(FittedLogisticRegression),
}

impl FittedClassifier {
    pub fn kind(&self) -> ModelKind {
        match self {
            FittedClassifier::GradientBoosting(_) => ModelKind::Xgb,
            FittedClassifier::Logistic(_) => ModelKind::Logreg,
        }
    }

    /// Probability of the positive class for every row
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>, ModelError> {
        match self {
            FittedClassifier::GradientBoosting(m) => m.predict_proba(x),
            FittedClassifier::Logistic(m) => m.predict_proba(x),
        }
    }

    /// Hard 0/1 labels, positive when the probability exceeds 0.5
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>, ModelError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > DECISION_THRESHOLD))
            .collect())
    }
}
