//! One-hot encoding for categorical features.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One-hot encoder (unfitted)
#[derive(Debug, Clone, Copy, Default)]
pub struct OneHotEncoder;

impl OneHotEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Learn the sorted set of categories for every column
    pub fn fit(&self, columns: &[Vec<String>]) -> FittedOneHotEncoder {
        let categories = columns
            .iter()
            .map(|values| {
                values
                    .iter()
                    .cloned()
                    .collect::<BTreeSet<String>>()
                    .into_iter()
                    .collect()
            })
            .collect();

        FittedOneHotEncoder { categories }
    }
}

/// One-hot encoder with frozen categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FittedOneHotEncoder {
    /// Sorted categories per input column
    pub categories: Vec<Vec<String>>,
}

impl FittedOneHotEncoder {
    /// Total output width: one slot per learned category
    pub fn n_features_out(&self) -> usize {
        self.categories.iter().map(Vec::len).sum()
    }

    /// Encode `columns` (same order as fit) into a `rows x n_features_out` matrix.
    ///
    /// A category not seen during fit leaves its column's block all zeros.
    pub fn transform(&self, columns: &[Vec<String>]) -> Array2<f64> {
        let rows = columns.first().map(Vec::len).unwrap_or(0);
        let mut out = Array2::<f64>::zeros((rows, self.n_features_out()));

        let mut offset = 0;
        for (values, cats) in columns.iter().zip(self.categories.iter()) {
            for (row, value) in values.iter().enumerate() {
                if let Ok(pos) = cats.binary_search(value) {
                    out[[row, offset + pos]] = 1.0;
                }
            }
            offset += cats.len();
        }

        out
    }

    /// Output names as `<column>_<category>`
    pub fn feature_names(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .zip(self.categories.iter())
            .flat_map(|(name, cats)| cats.iter().map(move |c| format!("{}_{}", name, c)))
            .collect()
    }
}
