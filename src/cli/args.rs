//! Command-line argument definitions using clap

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::ModelKind;
use crate::pipeline::DEFAULT_LABEL_COLUMN;
use crate::registry::ModelUri;
use crate::train::{
    TrainConfig, DEFAULT_ARTIFACT, DEFAULT_DATA_PATH, DEFAULT_EXPERIMENT, DEFAULT_MODEL_NAME,
    DEFAULT_TRACKING_DIR,
};

/// credit-risk - Train a German credit classifier, register it and serve predictions
#[derive(Parser, Debug)]
#[command(name = "credit-risk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train a model, log it to the tracking store and register a new version
    Train(TrainArgs),

    /// Serve GET /health and POST /predict from a registered model
    Serve(ServeArgs),

    /// Score a single JSON record from a file
    Predict(PredictArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Dataset path (CSV or Parquet). The first column is a row index and is dropped.
    #[arg(short, long, default_value = DEFAULT_DATA_PATH)]
    pub data: PathBuf,

    /// Model family: "xgb" (boosted trees) or "logreg" (logistic regression)
    #[arg(short, long, default_value = "xgb", value_parser = parse_model_kind)]
    pub model: ModelKind,

    /// Directory of the tracking store and model registry
    #[arg(long, default_value = DEFAULT_TRACKING_DIR)]
    pub tracking_dir: PathBuf,

    /// Experiment the run is recorded under
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Artifact name of the logged pipeline inside the run
    #[arg(long, default_value = DEFAULT_ARTIFACT)]
    pub artifact_name: String,

    /// Registered model name; each run adds a version
    #[arg(long, default_value = DEFAULT_MODEL_NAME)]
    pub model_name: String,

    /// Label column coded 1 (good) / 2 (bad)
    #[arg(long, default_value = DEFAULT_LABEL_COLUMN)]
    pub label_column: String,

    /// Held-out share for evaluation (0.0 to 1.0, exclusive)
    #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the stratified split
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Also write the evaluation report to this JSON file
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl TrainArgs {
    pub fn to_config(&self) -> TrainConfig {
        TrainConfig {
            data_path: self.data.clone(),
            model: self.model,
            experiment: self.experiment.clone(),
            artifact_name: self.artifact_name.clone(),
            model_name: self.model_name.clone(),
            label_column: self.label_column.clone(),
            test_size: self.test_size,
            seed: self.seed,
            infer_schema_length: self.infer_schema_length,
        }
    }
}

/// Where the serving model comes from
#[derive(Args, Debug, Clone)]
pub struct ModelSource {
    /// Directory of the tracking store and model registry
    #[arg(long, default_value = DEFAULT_TRACKING_DIR)]
    pub tracking_dir: PathBuf,

    /// models:/<name>/<version|latest> or runs:/<run_id>/<artifact>
    #[arg(long, default_value = "models:/CreditRiskModel/latest", value_parser = parse_model_uri)]
    pub model_uri: ModelUri,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub source: ModelSource,

    #[arg(long, default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(short, long, default_value = "8000")]
    pub port: u16,
}

impl ServeArgs {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[derive(Args, Debug, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub source: ModelSource,

    /// JSON file holding one record in the POST /predict body format
    #[arg(short, long)]
    pub input: PathBuf,
}

fn parse_model_kind(s: &str) -> Result<ModelKind, String> {
    s.parse().map_err(|e: crate::model::ModelError| e.to_string())
}

fn parse_model_uri(s: &str) -> Result<ModelUri, String> {
    s.parse().map_err(|e: crate::registry::RegistryError| e.to_string())
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}
