//! Evaluation report export

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::train::{Evaluation, TrainConfig, TrainOutcome};

/// Metadata about the training run
#[derive(Serialize)]
pub struct RunMetadata {
    /// Timestamp of the export (ISO 8601 format)
    pub timestamp: String,
    pub credit_risk_version: String,
    pub input_file: String,
    pub label_column: String,
    pub model: String,
    pub test_size: f64,
    pub seed: u64,
    pub run_id: String,
    pub run_name: String,
    /// `runs:/` URI of the logged pipeline
    pub model_uri: String,
    pub registered_model: String,
    pub registered_version: u32,
}

/// Complete evaluation export with metadata
#[derive(Serialize)]
pub struct EvaluationExport<'a> {
    pub metadata: RunMetadata,
    pub feature_names: Vec<String>,
    pub evaluation: &'a Evaluation,
}

/// Write the evaluation of a finished run to `output_path` as pretty JSON
pub fn export_evaluation(
    outcome: &TrainOutcome,
    config: &TrainConfig,
    feature_names: Vec<String>,
    output_path: &Path,
) -> Result<()> {
    let export = EvaluationExport {
        metadata: RunMetadata {
            timestamp: Utc::now().to_rfc3339(),
            credit_risk_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.data_path.display().to_string(),
            label_column: config.label_column.clone(),
            model: config.model.to_string(),
            test_size: config.test_size,
            seed: config.seed,
            run_id: outcome.run.run_id.clone(),
            run_name: outcome.run.run_name.clone(),
            model_uri: outcome.model_uri.to_string(),
            registered_model: outcome.version.name.clone(),
            registered_version: outcome.version.version,
        },
        feature_names,
        evaluation: &outcome.evaluation,
    };

    let json = serde_json::to_string_pretty(&export)
        .context("Failed to serialize evaluation report to JSON")?;

    std::fs::write(output_path, json).with_context(|| {
        format!(
            "Failed to write evaluation report to {}",
            output_path.display()
        )
    })?;

    Ok(())
}
