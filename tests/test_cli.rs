//! Tests for the command-line interface

use assert_cmd::Command;
use predicates::prelude::*;

#[path = "common/mod.rs"]
mod common;

fn credit_risk() -> Command {
    Command::cargo_bin("credit-risk").unwrap()
}

#[test]
fn test_help_lists_subcommands() {
    credit_risk()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("predict"));
}

#[test]
fn test_unknown_model_fails_before_training() {
    let (temp_dir, csv) = common::create_credit_csv();

    credit_risk()
        .args(["train", "--model", "svm", "--data"])
        .arg(&csv)
        .arg("--tracking-dir")
        .arg(temp_dir.path().join("mlruns"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown model type"));

    assert!(!temp_dir.path().join("mlruns").exists());
}

#[test]
fn test_test_size_out_of_range() {
    credit_risk()
        .args(["train", "--test-size", "1.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("test_size must be between"));
}

#[test]
fn test_serve_without_store_fails() {
    let temp_dir = tempfile::TempDir::new().unwrap();

    credit_risk()
        .args(["serve", "--port", "0", "--tracking-dir"])
        .arg(temp_dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("tracking store"));
}

#[test]
fn test_train_with_unwritable_store_fails() {
    let (temp_dir, csv) = common::create_credit_csv();
    // A regular file where the store's parent directory should be
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    credit_risk()
        .args(["train", "--model", "logreg", "--data"])
        .arg(&csv)
        .arg("--tracking-dir")
        .arg(blocker.join("mlruns"))
        .assert()
        .failure()
        .stdout(predicate::str::contains("Registered").not())
        .stderr(predicate::str::contains("Failed to open tracking store"));
}

#[test]
fn test_train_then_predict() {
    let (temp_dir, csv) = common::create_credit_csv();
    let tracking = temp_dir.path().join("mlruns");
    let report = temp_dir.path().join("evaluation.json");

    credit_risk()
        .args(["train", "--model", "logreg", "--data"])
        .arg(&csv)
        .arg("--tracking-dir")
        .arg(&tracking)
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("Registered CreditRiskModel version 1"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(exported["metadata"]["registered_version"], 1);
    assert!(exported["evaluation"]["accuracy"].is_number());

    let record = temp_dir.path().join("record.json");
    std::fs::write(&record, common::sample_payload().to_string()).unwrap();

    credit_risk()
        .arg("predict")
        .arg("--tracking-dir")
        .arg(&tracking)
        .arg("--input")
        .arg(&record)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"probability\""))
        .stdout(predicate::str::contains("Risk\""));
}
