//! End-to-end tests for the training run and what it leaves in the store

use credit_risk::model::ModelKind;
use credit_risk::pipeline::positive_rate;
use credit_risk::registry::{FileStore, ModelRegistry, ModelUri, RunStatus, VersionSpec};
use credit_risk::train::{prepare_data, train_model, DEFAULT_ARTIFACT, DEFAULT_MODEL_NAME};
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_split_is_stratified() {
    let (_temp_dir, csv) = common::create_credit_csv();
    let split = prepare_data(&common::train_config(&csv, ModelKind::Logreg)).unwrap();

    assert_eq!(split.y_train.len() + split.y_test.len(), common::FIXTURE_ROWS);
    assert_eq!(split.y_test.len(), 60);
    assert_eq!(split.x_train.height(), split.y_train.len());
    assert!((positive_rate(&split.y_train) - positive_rate(&split.y_test)).abs() < 0.02);
}

#[test]
fn test_full_run_registers_exactly_one_version() {
    let (_temp_dir, store, outcome) = common::trained_store(ModelKind::Logreg);

    let versions = store.list_versions(DEFAULT_MODEL_NAME).unwrap();
    assert_eq!(versions.len(), 1);
    assert_eq!(versions[0].version, 1);
    assert_eq!(outcome.version.version, 1);
    assert_eq!(
        versions[0].source,
        format!("runs:/{}/{}", outcome.run.run_id, DEFAULT_ARTIFACT)
    );
}

#[test]
fn test_run_records_metrics_and_example() {
    let (_temp_dir, store, outcome) = common::trained_store(ModelKind::Logreg);

    let metrics = store.get_metrics(&outcome.run.run_id).unwrap();
    for key in ["accuracy", "roc_auc", "f1_score"] {
        let value = metrics[key];
        assert!((0.0..=1.0).contains(&value), "{} = {}", key, value);
    }

    let run = store.get_run(&outcome.run.run_id).unwrap();
    assert_eq!(run.status, RunStatus::Finished);
    assert!(run.run_name.starts_with("LogisticRegression_"));

    let example = store
        .load_input_example(&outcome.run.run_id, DEFAULT_ARTIFACT)
        .unwrap();
    assert_eq!(example.len(), 5);
    assert_eq!(example.columns.len(), 9);
    assert!(!example.columns.contains(&"Credit Risk".to_string()));

    let evaluation = &outcome.evaluation;
    assert_eq!(evaluation.test_rows, 60);
    let cm_total: u32 = evaluation.confusion_matrix.counts.iter().sum();
    assert_eq!(cm_total, 60);
    assert_eq!(evaluation.report.classes.len(), 2);
}

#[test]
fn test_boosted_trees_run() {
    let (_temp_dir, store, outcome) = common::trained_store(ModelKind::Xgb);

    assert!(outcome.run.run_name.starts_with("XGBoost_"));
    let pipeline = store
        .load_pipeline(&ModelUri::latest(DEFAULT_MODEL_NAME))
        .unwrap();
    assert_eq!(pipeline.kind(), ModelKind::Xgb);
    // Learned something beyond the majority class
    assert!(outcome.evaluation.roc_auc.unwrap() > 0.5);
}

#[test]
fn test_second_run_adds_version_two() {
    let (temp_dir, csv) = common::create_credit_csv();
    let store = FileStore::create(temp_dir.path().join("mlruns")).unwrap();
    let config = common::train_config(&csv, ModelKind::Logreg);

    let first = train_model(&store, &config).unwrap();
    let second = train_model(&store, &config).unwrap();

    assert_ne!(first.run.run_id, second.run.run_id);
    assert_eq!(second.version.version, 2);
    assert_eq!(
        store
            .get_model_version(DEFAULT_MODEL_NAME, VersionSpec::Latest)
            .unwrap()
            .run_id,
        second.run.run_id
    );
    assert_eq!(store.list_versions(DEFAULT_MODEL_NAME).unwrap().len(), 2);
}

#[test]
fn test_unmapped_label_fails_without_registering() {
    let temp_dir = TempDir::new().unwrap();
    let csv = temp_dir.path().join("bad.csv");
    let mut body = common::credit_csv(50, 3);
    body.push_str("50,30,male,1,own,little,little,1000,12,car,3\n");
    std::fs::write(&csv, body).unwrap();

    let store = FileStore::create(temp_dir.path().join("mlruns")).unwrap();
    let err = train_model(&store, &common::train_config(&csv, ModelKind::Logreg)).unwrap_err();
    assert!(err.to_string().contains("neither"), "{}", err);
    assert!(store.list_versions(DEFAULT_MODEL_NAME).is_err());
}

#[test]
fn test_missing_dataset_fails() {
    let temp_dir = TempDir::new().unwrap();
    let store = FileStore::create(temp_dir.path().join("mlruns")).unwrap();
    let config = common::train_config(&temp_dir.path().join("nope.csv"), ModelKind::Xgb);
    assert!(train_model(&store, &config).is_err());
}
