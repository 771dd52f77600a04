//! Single-record inference against a registered pipeline.

use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::model::DECISION_THRESHOLD;
use crate::pipeline::FittedModelPipeline;
use crate::record::CreditRecord;
use crate::registry::{ModelRegistry, ModelUri};

/// Class label returned to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Low Risk")]
    Low,
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::High => write!(f, "High Risk"),
            RiskLabel::Low => write!(f, "Low Risk"),
        }
    }
}

/// Strictly above 0.5 is high risk; exactly 0.5 is low risk
pub fn risk_label(probability: f64) -> RiskLabel {
    if probability > DECISION_THRESHOLD {
        RiskLabel::High
    } else {
        RiskLabel::Low
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Positive-class probability rounded to 4 decimals
    pub probability: f64,
    pub prediction: RiskLabel,
}

impl PredictionResult {
    /// The label is taken from the unrounded probability
    pub fn from_probability(probability: f64) -> Self {
        Self {
            probability: round4(probability),
            prediction: risk_label(probability),
        }
    }
}

/// Anything that can score one applicant
pub trait RiskPredictor: Send + Sync {
    fn predict(&self, record: &CreditRecord) -> Result<PredictionResult>;
}

/// Predictor backed by a loaded pipeline artifact
#[derive(Debug)]
pub struct CreditRiskPredictor {
    pipeline: FittedModelPipeline,
}

impl CreditRiskPredictor {
    pub fn new(pipeline: FittedModelPipeline) -> Self {
        Self { pipeline }
    }

    /// Resolve and load `uri`; any failure here is fatal to the caller
    pub fn from_registry(registry: &dyn ModelRegistry, uri: &ModelUri) -> Result<Self> {
        let pipeline = registry
            .load_pipeline(uri)
            .with_context(|| format!("Failed to load model from {}", uri))?;
        info!(
            %uri,
            model = %pipeline.kind(),
            features = pipeline.features.n_features_out(),
            "predictor ready"
        );
        Ok(Self::new(pipeline))
    }

    pub fn pipeline(&self) -> &FittedModelPipeline {
        &self.pipeline
    }
}

impl RiskPredictor for CreditRiskPredictor {
    fn predict(&self, record: &CreditRecord) -> Result<PredictionResult> {
        let frame = record
            .to_dataframe()
            .context("Failed to build input frame")?;
        let probability = self
            .pipeline
            .predict_proba(&frame)?
            .first()
            .copied()
            .context("Model returned no probability")?;

        let result = PredictionResult::from_probability(probability);
        debug!(probability, prediction = %result.prediction, "scored record");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_strict() {
        assert_eq!(risk_label(0.5), RiskLabel::Low);
        assert_eq!(risk_label(0.500_01), RiskLabel::High);
        assert_eq!(risk_label(0.0), RiskLabel::Low);
        assert_eq!(risk_label(1.0), RiskLabel::High);
    }

    #[test]
    fn test_label_uses_unrounded_probability() {
        // Rounds to 0.5 but is above the threshold
        let result = PredictionResult::from_probability(0.500_004);
        assert_eq!(result.probability, 0.5);
        assert_eq!(result.prediction, RiskLabel::High);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(0.987_64), 0.9876);
    }

    #[test]
    fn test_result_json_shape() {
        let json = serde_json::to_value(PredictionResult::from_probability(0.73)).unwrap();
        assert_eq!(json, serde_json::json!({"probability": 0.73, "prediction": "High Risk"}));
    }
}
