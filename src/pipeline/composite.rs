//! Feature pipeline and classifier fitted and applied as one unit.

use anyhow::{Context, Result};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::features::{build_feature_pipeline, ColumnKind, FeaturePipeline, FittedFeaturePipeline};
use crate::model::{Classifier, FittedClassifier, ModelKind};

/// One input column as seen at fit time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
}

/// Ordered input schema recorded with the artifact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSchema {
    pub columns: Vec<ColumnSpec>,
}

impl InputSchema {
    pub fn from_frame(df: &DataFrame) -> Self {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| ColumnSpec {
                name: col.name().to_string(),
                dtype: col.dtype().to_string(),
                kind: ColumnKind::of(col.dtype()),
            })
            .collect();
        Self { columns }
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Unfitted feature pipeline + classifier
#[derive(Debug, Clone)]
pub struct ModelPipeline {
    pub features: FeaturePipeline,
    pub classifier: Classifier,
}

/// Fitted feature pipeline + classifier, the unit that gets registered
#[derive(Debug, Serialize, Deserialize)]
pub struct FittedModelPipeline {
    pub schema: InputSchema,
    pub features: FittedFeaturePipeline,
    pub classifier: FittedClassifier,
}

impl ModelPipeline {
    pub fn new(features: FeaturePipeline, classifier: Classifier) -> Self {
        Self {
            features,
            classifier,
        }
    }

    /// Build the feature pipeline from the dtypes of `x` and pair it with `classifier`
    pub fn for_frame(x: &DataFrame, classifier: Classifier) -> Self {
        Self::new(build_feature_pipeline(x), classifier)
    }

    pub fn fit(&self, x: &DataFrame, y: &[u8]) -> Result<FittedModelPipeline> {
        let (features, matrix) = self
            .features
            .fit_transform(x)
            .context("Failed to fit feature pipeline")?;

        debug!(
            rows = matrix.nrows(),
            features = matrix.ncols(),
            "feature matrix built"
        );

        let classifier = self
            .classifier
            .fit(&matrix, y)
            .with_context(|| format!("Failed to fit {} model", self.classifier.kind()))?;

        Ok(FittedModelPipeline {
            schema: InputSchema::from_frame(x),
            features,
            classifier,
        })
    }
}

impl FittedModelPipeline {
    pub fn kind(&self) -> ModelKind {
        self.classifier.kind()
    }

    pub fn input_columns(&self) -> Vec<&str> {
        self.schema.names()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.feature_names()
    }

    fn transform(&self, x: &DataFrame) -> Result<Array2<f64>> {
        self.features
            .transform(x)
            .context("Failed to transform input frame")
    }

    /// Positive-class probability for every row of `x`
    pub fn predict_proba(&self, x: &DataFrame) -> Result<Vec<f64>> {
        let matrix = self.transform(x)?;
        Ok(self.classifier.predict_proba(&matrix)?)
    }

    /// Hard 0/1 labels for every row of `x`
    pub fn predict(&self, x: &DataFrame) -> Result<Vec<u8>> {
        let matrix = self.transform(x)?;
        Ok(self.classifier.predict(&matrix)?)
    }
}
