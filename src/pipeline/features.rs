//! Feature pipeline: a column transformer with a numeric and a categorical branch
//!
//! The pipeline is an ordered list of `(name, columns, stage)` entries. Each
//! stage is fitted on its own column subset and the stage outputs are
//! concatenated left to right, so fit and transform stay symmetric and the
//! output layout is frozen at fit time:
//!
//! ```text
//! [ num__Age, num__Job, ... | cat__Sex_female, cat__Sex_male, ... ]
//! ```

use ndarray::{concatenate, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use super::encode::{FittedOneHotEncoder, OneHotEncoder};
use super::error::FeatureError;
use super::impute::{ConstantImputer, FittedMedianImputer, MedianImputer};

/// Name of the numeric branch, used as the output name prefix
pub const NUMERIC_BRANCH: &str = "num";

/// Name of the categorical branch, used as the output name prefix
pub const CATEGORICAL_BRANCH: &str = "cat";

/// How a column is treated by the builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    /// Integer and floating dtypes are numeric; everything else is categorical
    pub fn of(dtype: &DataType) -> Self {
        if dtype.is_primitive_numeric() {
            ColumnKind::Numeric
        } else {
            ColumnKind::Categorical
        }
    }
}

/// Unfitted transformation applied to one column subset
#[derive(Debug, Clone)]
pub enum Stage {
    /// Median imputation
    Numeric { imputer: MedianImputer },
    /// Constant imputation followed by one-hot encoding
    Categorical {
        imputer: ConstantImputer,
        encoder: OneHotEncoder,
    },
}

impl Stage {
    pub fn numeric() -> Self {
        Stage::Numeric {
            imputer: MedianImputer,
        }
    }

    pub fn categorical() -> Self {
        Stage::Categorical {
            imputer: ConstantImputer::default(),
            encoder: OneHotEncoder::new(),
        }
    }
}

/// Fitted counterpart of [`Stage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FittedStage {
    Numeric {
        imputer: FittedMedianImputer,
    },
    Categorical {
        imputer: ConstantImputer,
        encoder: FittedOneHotEncoder,
    },
}

/// Unfitted column transformer
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    transformers: Vec<(String, Vec<String>, Stage)>,
}

/// One fitted `(name, columns, stage)` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedColumnTransformer {
    pub name: String,
    pub columns: Vec<String>,
    pub stage: FittedStage,
}

/// Fitted column transformer, ready for inference and serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedFeaturePipeline {
    pub transformers: Vec<FittedColumnTransformer>,
}

/// Build the two-branch pipeline for `df` by inspecting column dtypes.
///
/// Numeric columns get median imputation; all other columns get `"Unknown"`
/// imputation and one-hot encoding. Either branch may end up empty.
pub fn build_feature_pipeline(df: &DataFrame) -> FeaturePipeline {
    let mut numeric = Vec::new();
    let mut categorical = Vec::new();

    for col in df.get_columns() {
        let name = col.name().to_string();
        match ColumnKind::of(col.dtype()) {
            ColumnKind::Numeric => numeric.push(name),
            ColumnKind::Categorical => categorical.push(name),
        }
    }

    FeaturePipeline::new(vec![
        (NUMERIC_BRANCH.to_string(), numeric, Stage::numeric()),
        (CATEGORICAL_BRANCH.to_string(), categorical, Stage::categorical()),
    ])
}

impl FeaturePipeline {
    pub fn new(transformers: Vec<(String, Vec<String>, Stage)>) -> Self {
        Self { transformers }
    }

    pub fn transformers(&self) -> &[(String, Vec<String>, Stage)] {
        &self.transformers
    }

    /// Columns assigned to the branch called `name`
    pub fn columns_for(&self, name: &str) -> &[String] {
        self.transformers
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, cols, _)| cols.as_slice())
            .unwrap_or(&[])
    }

    pub fn fit(&self, df: &DataFrame) -> Result<FittedFeaturePipeline, FeatureError> {
        if df.height() == 0 {
            return Err(FeatureError::EmptyData);
        }

        let mut fitted = Vec::with_capacity(self.transformers.len());
        for (name, columns, stage) in &self.transformers {
            let stage = match stage {
                Stage::Numeric { imputer } => {
                    let values = numeric_columns(df, columns)?;
                    FittedStage::Numeric {
                        imputer: imputer.fit(&values),
                    }
                }
                Stage::Categorical { imputer, encoder } => {
                    let values = imputer.transform(&categorical_columns(df, columns)?);
                    FittedStage::Categorical {
                        imputer: imputer.clone(),
                        encoder: encoder.fit(&values),
                    }
                }
            };
            fitted.push(FittedColumnTransformer {
                name: name.clone(),
                columns: columns.clone(),
                stage,
            });
        }

        Ok(FittedFeaturePipeline {
            transformers: fitted,
        })
    }

    pub fn fit_transform(
        &self,
        df: &DataFrame,
    ) -> Result<(FittedFeaturePipeline, Array2<f64>), FeatureError> {
        let fitted = self.fit(df)?;
        let matrix = fitted.transform(df)?;
        Ok((fitted, matrix))
    }
}

impl FittedFeaturePipeline {
    /// Transform `df` into a dense feature matrix with one row per input row.
    ///
    /// Only the fitted columns are read; extra columns are ignored.
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>, FeatureError> {
        let rows = df.height();
        let mut blocks = Vec::with_capacity(self.transformers.len());

        for t in &self.transformers {
            let block = match &t.stage {
                FittedStage::Numeric { imputer } => {
                    let filled = imputer.transform(&numeric_columns(df, &t.columns)?);
                    Array2::from_shape_fn((rows, filled.len()), |(r, c)| filled[c][r])
                }
                FittedStage::Categorical { imputer, encoder } => {
                    let filled = imputer.transform(&categorical_columns(df, &t.columns)?);
                    if filled.is_empty() {
                        Array2::zeros((rows, 0))
                    } else {
                        encoder.transform(&filled)
                    }
                }
            };
            blocks.push(block);
        }

        if blocks.is_empty() {
            return Ok(Array2::zeros((rows, 0)));
        }

        let views: Vec<_> = blocks.iter().map(|b| b.view()).collect();
        Ok(concatenate(Axis(1), &views)?)
    }

    /// Output column names, `<branch>__<column>[_<category>]`
    pub fn feature_names(&self) -> Vec<String> {
        self.transformers
            .iter()
            .flat_map(|t| {
                let names: Vec<String> = match &t.stage {
                    FittedStage::Numeric { .. } => t.columns.clone(),
                    FittedStage::Categorical { encoder, .. } => encoder.feature_names(&t.columns),
                };
                names
                    .into_iter()
                    .map(|n| format!("{}__{}", t.name, n))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn n_features_out(&self) -> usize {
        self.transformers
            .iter()
            .map(|t| match &t.stage {
                FittedStage::Numeric { imputer } => imputer.n_features(),
                FittedStage::Categorical { encoder, .. } => encoder.n_features_out(),
            })
            .sum()
    }

    /// Input columns the pipeline reads, in fit order
    pub fn input_columns(&self) -> Vec<&str> {
        self.transformers
            .iter()
            .flat_map(|t| t.columns.iter().map(String::as_str))
            .collect()
    }
}

fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, FeatureError> {
    df.column(name)
        .map_err(|_| FeatureError::MissingColumn(name.to_string()))
}

fn polars_err(column: &str) -> impl Fn(PolarsError) -> FeatureError + '_ {
    move |source| FeatureError::Polars {
        column: column.to_string(),
        source,
    }
}

/// Read numeric columns as `f64`, treating nulls and NaN as missing
fn numeric_columns(df: &DataFrame, names: &[String]) -> Result<Vec<Vec<Option<f64>>>, FeatureError> {
    names
        .iter()
        .map(|name| {
            let cast = get_column(df, name)?
                .cast(&DataType::Float64)
                .map_err(polars_err(name))?;
            let values = cast
                .f64()
                .map_err(polars_err(name))?
                .into_iter()
                .map(|v| v.filter(|x| !x.is_nan()))
                .collect();
            Ok(values)
        })
        .collect()
}

/// Read categorical columns as strings, keeping nulls
fn categorical_columns(
    df: &DataFrame,
    names: &[String],
) -> Result<Vec<Vec<Option<String>>>, FeatureError> {
    names
        .iter()
        .map(|name| {
            let cast = get_column(df, name)?
                .cast(&DataType::String)
                .map_err(polars_err(name))?;
            let values = cast
                .str()
                .map_err(polars_err(name))?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect();
            Ok(values)
        })
        .collect()
}
