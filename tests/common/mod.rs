//! Shared test utilities and fixture generators
#![allow(dead_code)]

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use credit_risk::model::ModelKind;
use credit_risk::registry::FileStore;
use credit_risk::train::{train_model, TrainConfig, TrainOutcome};

pub const FIXTURE_ROWS: usize = 300;

const SEXES: [&str; 2] = ["male", "female"];
const HOUSING: [&str; 3] = ["own", "rent", "free"];
const SAVINGS: [&str; 4] = ["little", "moderate", "quite rich", "rich"];
const CHECKING: [&str; 3] = ["little", "moderate", "rich"];
const PURPOSES: [&str; 6] = ["car", "radio/TV", "furniture/equipment", "business", "education", "repairs"];

/// Render a German-credit shaped CSV: unnamed index column first, `NA` for
/// missing accounts, `Credit Risk` coded 1 (good) / 2 (bad).
///
/// Bad credit is more likely for large amounts, long durations and a
/// "little" checking account, so both models have signal to learn.
pub fn credit_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = String::from(
        ",Age,Sex,Job,Housing,Saving accounts,Checking account,Credit amount,Duration,Purpose,Credit Risk\n",
    );

    for i in 0..rows {
        let age: i64 = rng.gen_range(19..75);
        let sex = SEXES[rng.gen_range(0..SEXES.len())];
        let job: i64 = rng.gen_range(0..4);
        let housing = HOUSING[rng.gen_range(0..HOUSING.len())];
        let savings = if rng.gen_bool(0.2) {
            "NA"
        } else {
            SAVINGS[rng.gen_range(0..SAVINGS.len())]
        };
        let checking = if rng.gen_bool(0.35) {
            "NA"
        } else {
            CHECKING[rng.gen_range(0..CHECKING.len())]
        };
        let amount: i64 = rng.gen_range(250..15000);
        let duration: i64 = rng.gen_range(4..72);
        let purpose = PURPOSES[rng.gen_range(0..PURPOSES.len())];

        let mut score = -3.0 + amount as f64 / 5000.0 + duration as f64 / 24.0;
        if checking == "little" {
            score += 1.0;
        }
        let p_bad = 1.0 / (1.0 + (-score).exp());
        let risk = if rng.gen_bool(p_bad.clamp(0.05, 0.95)) { 2 } else { 1 };

        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{},{},{}",
            i, age, sex, job, housing, savings, checking, amount, duration, purpose, risk
        )
        .unwrap();
    }
    out
}

/// Write the fixture CSV into `dir` and return its path
pub fn write_credit_csv(dir: &Path, rows: usize, seed: u64) -> PathBuf {
    let path = dir.join("german_credit_data.csv");
    std::fs::write(&path, credit_csv(rows, seed)).unwrap();
    path
}

/// Create a temporary directory with a fixture CSV
pub fn create_credit_csv() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = write_credit_csv(temp_dir.path(), FIXTURE_ROWS, 7);
    (temp_dir, path)
}

pub fn train_config(data_path: &Path, model: ModelKind) -> TrainConfig {
    TrainConfig {
        data_path: data_path.to_path_buf(),
        model,
        ..Default::default()
    }
}

/// Train one model into `<temp>/mlruns` and return the store with the outcome
pub fn trained_store(model: ModelKind) -> (TempDir, FileStore, TrainOutcome) {
    let (temp_dir, csv) = create_credit_csv();
    let store = FileStore::create(temp_dir.path().join("mlruns")).unwrap();
    let outcome = train_model(&store, &train_config(&csv, model)).unwrap();
    (temp_dir, store, outcome)
}

/// The documented example request body
pub fn sample_payload() -> serde_json::Value {
    serde_json::json!({
        "Age": 35,
        "Sex": "male",
        "Job": 2,
        "Housing": "own",
        "Saving_accounts": "moderate",
        "Checking_account": "little",
        "Credit_amount": 5000,
        "Duration": 24,
        "Purpose": "car"
    })
}

/// Same applicant with both optional account fields omitted
pub fn payload_without_optionals() -> serde_json::Value {
    serde_json::json!({
        "Age": 35,
        "Sex": "male",
        "Job": 2,
        "Housing": "own",
        "Credit_amount": 5000,
        "Duration": 24,
        "Purpose": "car"
    })
}
