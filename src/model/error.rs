//! Error types for model construction, training and inference.

use thiserror::Error;

/// Errors raised by the model factory and classifiers
#[derive(Debug, Error)]
pub enum ModelError {
    /// Selector did not name a known model
    #[error("Unknown model type: '{0}'. Use 'xgb' or 'logreg'.")]
    UnknownModel(String),

    #[error("cannot train on an empty feature matrix")]
    EmptyTrainingSet,

    /// Binary classifiers need both labels present in the training data
    #[error("training labels contain a single class ({0}); both 0 and 1 are required")]
    SingleClass(u8),

    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },

    /// Inference input width differs from the width seen during fit
    #[error("model expects {expected} features, got {got}")]
    ShapeMismatch { expected: usize, got: usize },
}
