//! Error types for feature preprocessing.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors raised while fitting or applying the feature pipeline
#[derive(Debug, Error)]
pub enum FeatureError {
    /// A fitted column is absent from the frame being transformed
    #[error("column '{0}' not found in input frame")]
    MissingColumn(String),

    /// Fitting requires at least one row
    #[error("cannot fit feature pipeline on an empty frame")]
    EmptyData,

    /// Branch outputs disagree on their row count
    #[error("feature blocks could not be joined: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Column could not be read with the expected element type
    #[error("column '{column}' could not be read: {source}")]
    Polars {
        column: String,
        #[source]
        source: PolarsError,
    },
}
