//! Dataset loader for CSV and Parquet files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

/// Tokens treated as missing when reading CSV input
const NULL_TOKENS: [&str; 2] = ["NA", ""];

/// Load a dataset from a file (CSV or Parquet based on extension)
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    // 0 means full table scan, mirroring polars' own convention
    let infer = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let df = match extension.as_str() {
        "csv" => {
            let null_values = NullValues::AllColumns(
                NULL_TOKENS.iter().map(|t| PlSmallStr::from(*t)).collect(),
            );
            CsvReadOptions::default()
                .with_has_header(true)
                .with_infer_schema_length(infer)
                .map_parse_options(|opts| opts.with_null_values(Some(null_values.clone())))
                .try_into_reader_with_file_path(Some(path.to_path_buf()))
                .with_context(|| format!("Failed to open CSV file: {}", path.display()))?
                .finish()
                .with_context(|| format!("Failed to load CSV file: {}", path.display()))?
        }
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: csv, parquet",
            extension
        ),
    };

    Ok(df)
}

/// Drop the leading column (the unnamed row index written by pandas exports)
pub fn drop_index_column(df: &DataFrame) -> Result<DataFrame> {
    let first = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow::anyhow!("Dataset has no columns"))?;

    df.drop(&first)
        .with_context(|| format!("Failed to drop index column '{}'", first))
}
