//! Integration tests for dataset loading and label preparation

use credit_risk::pipeline::{
    drop_index_column, load_dataset, split_features_and_label, TargetMapping,
};
use credit_risk::record::RECORD_COLUMNS;
use polars::prelude::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_load_credit_csv_shape() {
    let (_temp_dir, csv) = common::create_credit_csv();

    let df = load_dataset(&csv, 10000).unwrap();
    assert_eq!(df.height(), common::FIXTURE_ROWS);
    assert_eq!(df.width(), 11, "index + 9 features + label");
}

#[test]
fn test_index_column_dropped_and_label_split() {
    let (_temp_dir, csv) = common::create_credit_csv();
    let df = drop_index_column(&load_dataset(&csv, 10000).unwrap()).unwrap();

    let (x, y) = split_features_and_label(&df, "Credit Risk", &TargetMapping::credit_risk()).unwrap();

    let names: Vec<&str> = x.get_column_names().iter().map(|n| n.as_str()).collect();
    assert_eq!(names, RECORD_COLUMNS.to_vec());
    assert_eq!(y.len(), common::FIXTURE_ROWS);
    assert!(y.iter().all(|&v| v <= 1));
    assert!(y.contains(&0) && y.contains(&1));
}

#[test]
fn test_declared_dtypes() {
    let (_temp_dir, csv) = common::create_credit_csv();
    let df = load_dataset(&csv, 10000).unwrap();

    assert!(df.column("Age").unwrap().dtype().is_integer());
    assert!(df.column("Credit amount").unwrap().dtype().is_integer());
    assert_eq!(df.column("Purpose").unwrap().dtype(), &DataType::String);

    // "NA" tokens in the account columns load as nulls
    assert!(df.column("Saving accounts").unwrap().null_count() > 0);
    assert!(df.column("Checking account").unwrap().null_count() > 0);
}

#[test]
fn test_load_parquet_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("credit.parquet");

    let mut df = df! {
        "idx" => [0i64, 1, 2],
        "Age" => [30i64, 40, 50],
        "Credit Risk" => [1i64, 2, 1],
    }
    .unwrap();
    let file = std::fs::File::create(&path).unwrap();
    ParquetWriter::new(file).finish(&mut df).unwrap();

    let loaded = load_dataset(&path, 0).unwrap();
    assert_eq!(loaded.shape(), (3, 3));
}

#[test]
fn test_unsupported_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("credit.xlsx");
    std::fs::write(&path, "not a spreadsheet").unwrap();

    let err = load_dataset(&path, 100).unwrap_err();
    assert!(err.to_string().contains("Unsupported file format"));
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(load_dataset(&temp_dir.path().join("missing.csv"), 100).is_err());
}
