//! Pipeline module - data loading, preprocessing and the fitted model pipeline

pub mod composite;
pub mod encode;
pub mod error;
pub mod features;
pub mod impute;
pub mod loader;
pub mod split;
pub mod target;

pub use composite::{ColumnSpec, FittedModelPipeline, InputSchema, ModelPipeline};
pub use encode::{FittedOneHotEncoder, OneHotEncoder};
pub use error::FeatureError;
pub use features::{
    build_feature_pipeline, ColumnKind, FeaturePipeline, FittedFeaturePipeline, Stage,
    CATEGORICAL_BRANCH, NUMERIC_BRANCH,
};
pub use impute::{ConstantImputer, FittedMedianImputer, MedianImputer, UNKNOWN_CATEGORY};
pub use loader::*;
pub use split::{positive_rate, stratified_indices, stratified_split, SplitIndices, TrainTestSplit};
pub use target::*;
