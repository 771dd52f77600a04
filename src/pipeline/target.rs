//! Label column analysis and mapping
//!
//! The credit dataset codes its label as `1` (good) / `2` (bad). Training
//! needs `0` (low risk) / `1` (high risk), so the label column is mapped
//! through a [`TargetMapping`] before the model ever sees it.

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default label column in the German credit dataset
pub const DEFAULT_LABEL_COLUMN: &str = "Credit Risk";

/// Mapping configuration for converting label values to binary 0/1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMapping {
    /// Value that maps to 1 (high risk)
    pub event_value: String,
    /// Value that maps to 0 (low risk)
    pub non_event_value: String,
}

impl TargetMapping {
    /// Create a new target mapping
    pub fn new(event_value: impl Into<String>, non_event_value: impl Into<String>) -> Self {
        Self {
            event_value: event_value.into(),
            non_event_value: non_event_value.into(),
        }
    }

    /// Mapping used by the credit dataset: `2 → 1`, `1 → 0`
    pub fn credit_risk() -> Self {
        Self::new("2", "1")
    }

    fn map(&self, value: &str) -> Option<u8> {
        if value == self.event_value {
            Some(1)
        } else if value == self.non_event_value {
            Some(0)
        } else {
            None
        }
    }
}

impl Default for TargetMapping {
    fn default() -> Self {
        Self::credit_risk()
    }
}

/// Create a binary label mask based on the mapping
///
/// Returns one entry per row:
/// - `Some(1)` for event values
/// - `Some(0)` for non-event values
/// - `None` for nulls and values matching neither side
pub fn create_target_mask(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> Result<Vec<Option<u8>>> {
    let target_col = df
        .column(target)
        .with_context(|| format!("Label column '{}' not found", target))?;

    let mask = column_to_string_vec(target_col)?
        .iter()
        .map(|v| v.as_deref().and_then(|s| mapping.map(s)))
        .collect();

    Ok(mask)
}

/// Split a frame into its feature columns and the mapped 0/1 label vector.
///
/// Every row must map; a single unmapped label fails the whole split since
/// silently dropping rows would shift the stratification.
pub fn split_features_and_label(
    df: &DataFrame,
    target: &str,
    mapping: &TargetMapping,
) -> Result<(DataFrame, Vec<u8>)> {
    if df.height() == 0 {
        anyhow::bail!("Dataset is empty");
    }

    let mask = create_target_mask(df, target, mapping)?;
    let unmapped = mask.iter().filter(|v| v.is_none()).count();
    if unmapped > 0 {
        warn!(
            target,
            unmapped,
            event = %mapping.event_value,
            non_event = %mapping.non_event_value,
            "label values outside mapping"
        );
        anyhow::bail!(
            "Label column '{}' has {} value(s) that are neither '{}' nor '{}'",
            target,
            unmapped,
            mapping.event_value,
            mapping.non_event_value
        );
    }

    let labels: Vec<u8> = mask.into_iter().flatten().collect();
    let features = df
        .drop(target)
        .with_context(|| format!("Failed to drop label column '{}'", target))?;

    Ok((features, labels))
}

/// Convert a column to a Vec of Option<String> for comparison
fn column_to_string_vec(col: &Column) -> Result<Vec<Option<String>>> {
    let values: Vec<Option<String>> = match col.dtype() {
        DataType::String => col
            .str()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
        dtype if dtype.is_integer() => {
            let cast = col.cast(&DataType::Int64)?;
            cast.i64()?
                .into_iter()
                .map(|v| v.map(|n| n.to_string()))
                .collect()
        }
        DataType::Float32 | DataType::Float64 => {
            // 2.0 must still match the "2" mapping value
            let cast = col.cast(&DataType::Float64)?;
            cast.f64()?
                .into_iter()
                .map(|v| {
                    v.map(|n| {
                        if n.fract() == 0.0 {
                            format!("{}", n as i64)
                        } else {
                            format!("{}", n)
                        }
                    })
                })
                .collect()
        }
        _ => {
            let cast = col.cast(&DataType::String)?;
            cast.str()?
                .into_iter()
                .map(|v| v.map(|s| s.to_string()))
                .collect()
        }
    };

    Ok(values)
}
