//! One train / evaluate / publish cycle.
//!
//! The steps are exposed individually so the CLI can wrap each in a spinner;
//! [`train_model`] runs them back to back.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::model::metrics::{
    accuracy_score, classification_report, f1_score, roc_auc_score, ClassificationReport,
    ConfusionMatrix,
};
use crate::model::{get_model, ModelKind};
use crate::pipeline::{
    drop_index_column, load_dataset, split_features_and_label, stratified_split,
    FittedModelPipeline, ModelPipeline, TargetMapping, TrainTestSplit, DEFAULT_LABEL_COLUMN,
};
use crate::registry::{
    ExperimentTracker, InputExample, ModelRegistry, ModelUri, ModelVersion, RunInfo, RunStatus,
};

pub const DEFAULT_DATA_PATH: &str = "data/german_credit_data.csv";
pub const DEFAULT_EXPERIMENT: &str = "credit-risk";
pub const DEFAULT_ARTIFACT: &str = "credit-risk-pipeline";
pub const DEFAULT_MODEL_NAME: &str = "CreditRiskModel";
pub const DEFAULT_TRACKING_DIR: &str = "mlruns";
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_SEED: u64 = 42;

/// Rows of `X_train` stored with the logged model
pub const INPUT_EXAMPLE_ROWS: usize = 5;

const EVALUATION_ARTIFACT: &str = "evaluation.json";

/// Everything a training run needs
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub model: ModelKind,
    pub experiment: String,
    pub artifact_name: String,
    pub model_name: String,
    pub label_column: String,
    pub test_size: f64,
    pub seed: u64,
    pub infer_schema_length: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            model: ModelKind::Xgb,
            experiment: DEFAULT_EXPERIMENT.to_string(),
            artifact_name: DEFAULT_ARTIFACT.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            infer_schema_length: 10000,
        }
    }
}

impl TrainConfig {
    /// `<ModelLabel>_<YYYYmmdd_HHMMSS>`
    pub fn run_name(&self) -> String {
        format!(
            "{}_{}",
            self.model.display_name(),
            Local::now().format("%Y%m%d_%H%M%S")
        )
    }
}

/// Held-out evaluation of a fitted pipeline
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub accuracy: f64,
    /// `None` when the test labels hold a single class
    pub roc_auc: Option<f64>,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub report: ClassificationReport,
    pub test_rows: usize,
}

impl Evaluation {
    /// Metrics in the form logged to the tracker
    pub fn metrics(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        metrics.insert("accuracy".to_string(), self.accuracy);
        if let Some(auc) = self.roc_auc {
            metrics.insert("roc_auc".to_string(), auc);
        }
        metrics.insert("f1_score".to_string(), self.f1_score);
        metrics
    }
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub run: RunInfo,
    /// `runs:/<run_id>/<artifact>` of the logged pipeline
    pub model_uri: ModelUri,
    pub version: ModelVersion,
    pub evaluation: Evaluation,
}

/// Load the dataset, drop the index column, remap the label and split it
pub fn prepare_data(config: &TrainConfig) -> Result<TrainTestSplit> {
    let raw = load_dataset(&config.data_path, config.infer_schema_length)?;
    let df = drop_index_column(&raw)?;
    let (x, y) = split_features_and_label(&df, &config.label_column, &TargetMapping::credit_risk())?;

    let split = stratified_split(&x, &y, config.test_size, config.seed)?;
    info!(
        rows = df.height(),
        features = x.width(),
        train = split.y_train.len(),
        test = split.y_test.len(),
        "dataset prepared"
    );
    Ok(split)
}

/// Fit the feature pipeline and the selected model together on the train split
pub fn fit_pipeline(split: &TrainTestSplit, model: ModelKind) -> Result<FittedModelPipeline> {
    let pipeline = ModelPipeline::for_frame(&split.x_train, get_model(model));
    let fitted = pipeline.fit(&split.x_train, &split.y_train)?;
    info!(
        model = %model,
        features_out = fitted.features.n_features_out(),
        "pipeline fitted"
    );
    Ok(fitted)
}

/// Score the held-out split
pub fn evaluate(pipeline: &FittedModelPipeline, x_test: &DataFrame, y_test: &[u8]) -> Result<Evaluation> {
    let probabilities = pipeline.predict_proba(x_test)?;
    let predictions = pipeline.predict(x_test)?;

    let roc_auc = roc_auc_score(y_test, &probabilities);
    if roc_auc.is_none() {
        warn!("test split holds a single class; ROC-AUC is undefined");
    }

    let evaluation = Evaluation {
        accuracy: accuracy_score(y_test, &predictions),
        roc_auc,
        f1_score: f1_score(y_test, &predictions),
        confusion_matrix: ConfusionMatrix::from_predictions(y_test, &predictions),
        report: classification_report(y_test, &predictions),
        test_rows: y_test.len(),
    };
    info!(
        accuracy = evaluation.accuracy,
        roc_auc = ?evaluation.roc_auc,
        f1 = evaluation.f1_score,
        "evaluation complete"
    );
    Ok(evaluation)
}

/// Log metrics and the pipeline under a new run, then register it.
///
/// The run is marked failed if any step after `start_run` errors.
pub fn publish<S>(
    store: &S,
    config: &TrainConfig,
    pipeline: &FittedModelPipeline,
    x_train: &DataFrame,
    evaluation: &Evaluation,
) -> Result<TrainOutcome>
where
    S: ExperimentTracker + ModelRegistry,
{
    let mut run = store
        .start_run(&config.experiment, &config.run_name())
        .context("Failed to start tracking run")?;

    let logged = log_run(store, &run, config, pipeline, x_train, evaluation);
    let status = if logged.is_ok() {
        RunStatus::Finished
    } else {
        RunStatus::Failed
    };
    store
        .end_run(&mut run, status)
        .context("Failed to close tracking run")?;
    let model_uri = logged?;

    let version = store
        .register_model(&model_uri, &config.model_name)
        .with_context(|| format!("Failed to register model '{}'", config.model_name))?;

    Ok(TrainOutcome {
        run,
        model_uri,
        version,
        evaluation: evaluation.clone(),
    })
}

fn log_run<S: ExperimentTracker>(
    store: &S,
    run: &RunInfo,
    config: &TrainConfig,
    pipeline: &FittedModelPipeline,
    x_train: &DataFrame,
    evaluation: &Evaluation,
) -> Result<ModelUri> {
    store
        .log_metrics(run, &evaluation.metrics())
        .context("Failed to log metrics")?;

    let evaluation_json =
        serde_json::to_value(evaluation).context("Failed to serialize evaluation")?;
    store
        .log_json_artifact(run, EVALUATION_ARTIFACT, &evaluation_json)
        .context("Failed to log evaluation")?;

    let example = InputExample::from_frame(x_train, INPUT_EXAMPLE_ROWS)?;
    let uri = store
        .log_model(run, &config.artifact_name, pipeline, &example)
        .context("Failed to log model")?;
    Ok(uri)
}

/// Run the full cycle: prepare, fit, evaluate, publish
pub fn train_model<S>(store: &S, config: &TrainConfig) -> Result<TrainOutcome>
where
    S: ExperimentTracker + ModelRegistry,
{
    let split = prepare_data(config)?;
    let pipeline = fit_pipeline(&split, config.model)?;
    let evaluation = evaluate(&pipeline, &split.x_test, &split.y_test)?;
    let outcome = publish(store, config, &pipeline, &split.x_train, &evaluation)?;

    info!(
        run_id = %outcome.run.run_id,
        model = %config.model_name,
        version = outcome.version.version,
        "training run complete"
    );
    Ok(outcome)
}
