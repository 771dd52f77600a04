//! Experiment tracking and the model registry.
//!
//! Training talks to an [`ExperimentTracker`] (runs, metrics, logged
//! artifacts) and a [`ModelRegistry`] (named, versioned artifacts). Both are
//! implemented by the directory-backed [`FileStore`].

pub mod error;
pub mod store;
pub mod uri;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

pub use error::RegistryError;
pub use store::FileStore;
pub use uri::{ModelUri, VersionSpec};

use crate::pipeline::FittedModelPipeline;

/// Lifecycle state of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Running,
    Finished,
    Failed,
}

/// Metadata of one tracked run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    pub run_name: String,
    pub experiment: String,
    pub status: RunStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// One registered version of a named model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub name: String,
    pub version: u32,
    /// `runs:/` URI the version was registered from
    pub source: String,
    pub run_id: String,
    pub created_at: DateTime<Utc>,
}

/// Example rows stored next to a logged model, in `split` orientation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputExample {
    pub columns: Vec<String>,
    pub data: Vec<Vec<serde_json::Value>>,
}

impl InputExample {
    /// Take the first `n` rows of `df`
    pub fn from_frame(df: &DataFrame, n: usize) -> Result<Self, RegistryError> {
        let rows = n.min(df.height());
        let columns = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut data = Vec::with_capacity(rows);
        for row in 0..rows {
            let values = df
                .get_columns()
                .iter()
                .map(|col| col.get(row).map(|v| any_value_to_json(&v)))
                .collect::<PolarsResult<Vec<_>>>()?;
            data.push(values);
        }

        Ok(Self { columns, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn any_value_to_json(value: &AnyValue<'_>) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(*b),
        AnyValue::String(s) => Value::from(*s),
        AnyValue::StringOwned(s) => Value::from(s.as_str()),
        AnyValue::Int8(v) => Value::from(*v),
        AnyValue::Int16(v) => Value::from(*v),
        AnyValue::Int32(v) => Value::from(*v),
        AnyValue::Int64(v) => Value::from(*v),
        AnyValue::UInt8(v) => Value::from(*v),
        AnyValue::UInt16(v) => Value::from(*v),
        AnyValue::UInt32(v) => Value::from(*v),
        AnyValue::UInt64(v) => Value::from(*v),
        // NaN and infinities have no JSON form
        AnyValue::Float32(v) => serde_json::Number::from_f64(f64::from(*v))
            .map(Value::Number)
            .unwrap_or(Value::Null),
        AnyValue::Float64(v) => serde_json::Number::from_f64(*v)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => Value::String(other.to_string()),
    }
}

/// Records runs, their metrics and the artifacts they produce
pub trait ExperimentTracker {
    fn start_run(&self, experiment: &str, run_name: &str) -> Result<RunInfo, RegistryError>;

    fn log_metrics(&self, run: &RunInfo, metrics: &BTreeMap<String, f64>)
        -> Result<(), RegistryError>;

    /// Store an arbitrary JSON document under the run's artifact directory
    fn log_json_artifact(
        &self,
        run: &RunInfo,
        file_name: &str,
        value: &serde_json::Value,
    ) -> Result<PathBuf, RegistryError>;

    /// Persist a fitted pipeline plus example rows; returns its `runs:/` URI
    fn log_model(
        &self,
        run: &RunInfo,
        artifact: &str,
        pipeline: &FittedModelPipeline,
        input_example: &InputExample,
    ) -> Result<ModelUri, RegistryError>;

    fn end_run(&self, run: &mut RunInfo, status: RunStatus) -> Result<(), RegistryError>;
}

/// Named, versioned pipeline artifacts
pub trait ModelRegistry: Send + Sync {
    /// Register the artifact at `source` as the next version of `name`
    fn register_model(&self, source: &ModelUri, name: &str) -> Result<ModelVersion, RegistryError>;

    fn list_versions(&self, name: &str) -> Result<Vec<ModelVersion>, RegistryError>;

    fn get_model_version(&self, name: &str, version: VersionSpec)
        -> Result<ModelVersion, RegistryError>;

    /// Load the fitted pipeline addressed by either URI form
    fn load_pipeline(&self, uri: &ModelUri) -> Result<FittedModelPipeline, RegistryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_example_takes_head_rows() {
        let df = df! {
            "Age" => [22i64, 45, 35, 50, 28, 61],
            "Saving accounts" => [Some("little"), None, Some("rich"), None, None, None],
            "Credit amount" => [1.5f64, f64::NAN, 3.0, 4.0, 5.0, 6.0],
        }
        .unwrap();

        let example = InputExample::from_frame(&df, 5).unwrap();
        assert_eq!(example.columns, vec!["Age", "Saving accounts", "Credit amount"]);
        assert_eq!(example.len(), 5);
        assert_eq!(example.data[0][0], serde_json::json!(22));
        assert_eq!(example.data[0][1], serde_json::json!("little"));
        assert!(example.data[1][1].is_null());
        assert!(example.data[1][2].is_null());
    }

    #[test]
    fn test_input_example_short_frame() {
        let df = df! { "Age" => [30i64, 40] }.unwrap();
        assert_eq!(InputExample::from_frame(&df, 5).unwrap().len(), 2);
    }

    #[test]
    fn test_run_status_serialises_uppercase() {
        assert_eq!(
            serde_json::to_string(&RunStatus::Finished).unwrap(),
            "\"FINISHED\""
        );
    }
}
