//! Missing value imputation
//!
//! Two imputers cover the two feature branches:
//! - [`MedianImputer`] learns one median per numeric column.
//! - [`ConstantImputer`] fills categorical nulls with a fixed literal and
//!   needs no fitting.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Fill literal used for missing categorical values
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Median imputer (unfitted)
#[derive(Debug, Clone, Copy, Default)]
pub struct MedianImputer;

/// Median imputer with one learned statistic per column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedMedianImputer {
    /// Fill value for each column, in fit order
    pub statistics: Vec<f64>,
}

impl MedianImputer {
    /// Learn the median of every column, ignoring missing entries.
    ///
    /// A column without a single observed value gets `0.0`.
    pub fn fit(&self, columns: &[Vec<Option<f64>>]) -> FittedMedianImputer {
        let statistics = columns
            .par_iter()
            .map(|values| median(values).unwrap_or(0.0))
            .collect();
        FittedMedianImputer { statistics }
    }
}

impl FittedMedianImputer {
    /// Replace missing entries with the learned medians.
    ///
    /// Callers pass exactly the columns seen during fit, in the same order.
    pub fn transform(&self, columns: &[Vec<Option<f64>>]) -> Vec<Vec<f64>> {
        columns
            .iter()
            .zip(self.statistics.iter())
            .map(|(values, &fill)| values.iter().map(|v| v.unwrap_or(fill)).collect())
            .collect()
    }

    pub fn n_features(&self) -> usize {
        self.statistics.len()
    }
}

/// Constant-fill imputer for categorical values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantImputer {
    pub fill_value: String,
}

impl ConstantImputer {
    pub fn new(fill_value: impl Into<String>) -> Self {
        Self {
            fill_value: fill_value.into(),
        }
    }

    pub fn transform(&self, columns: &[Vec<Option<String>>]) -> Vec<Vec<String>> {
        columns
            .iter()
            .map(|values| {
                values
                    .iter()
                    .map(|v| v.clone().unwrap_or_else(|| self.fill_value.clone()))
                    .collect()
            })
            .collect()
    }
}

impl Default for ConstantImputer {
    fn default() -> Self {
        Self::new(UNKNOWN_CATEGORY)
    }
}

/// Median of the observed (non-missing, non-NaN) values
pub fn median(values: &[Option<f64>]) -> Option<f64> {
    let mut observed: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect();

    if observed.is_empty() {
        return None;
    }

    observed.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = observed.len();
    if n % 2 == 0 {
        Some((observed[n / 2 - 1] + observed[n / 2]) / 2.0)
    } else {
        Some(observed[n / 2])
    }
}
