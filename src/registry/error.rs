//! Error types for the tracking store and model registry.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// Tracking directory does not exist
    #[error("tracking store not found at {0}")]
    StoreNotFound(PathBuf),

    #[error("registered model '{0}' not found")]
    ModelNotFound(String),

    #[error("version {version} of registered model '{name}' not found")]
    VersionNotFound { name: String, version: u32 },

    #[error("run '{0}' not found")]
    RunNotFound(String),

    #[error("artifact '{artifact}' not found in run '{run_id}'")]
    ArtifactNotFound { run_id: String, artifact: String },

    /// URI is neither `models:/<name>/<version>` nor `runs:/<run_id>/<artifact>`
    #[error("invalid model URI '{0}'")]
    InvalidUri(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Input example could not be read from the frame
    #[error("failed to serialize input example: {0}")]
    InputExample(#[from] PolarsError),
}
