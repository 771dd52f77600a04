//! Request handlers and payload types.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use crate::predict::{PredictionResult, RiskPredictor};
use crate::record::CreditRecord;

/// Shared, read-only state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<dyn RiskPredictor>,
}

impl AppState {
    pub fn new(predictor: Arc<dyn RiskPredictor>) -> Self {
        Self { predictor }
    }
}

/// `POST /predict` body
///
/// Field names use underscores where the dataset columns use spaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditInput {
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Job")]
    pub job: i64,
    #[serde(rename = "Housing")]
    pub housing: String,
    #[serde(rename = "Saving_accounts", default)]
    pub saving_accounts: Option<String>,
    #[serde(rename = "Checking_account", default)]
    pub checking_account: Option<String>,
    #[serde(rename = "Credit_amount")]
    pub credit_amount: f64,
    #[serde(rename = "Duration")]
    pub duration: i64,
    #[serde(rename = "Purpose")]
    pub purpose: String,
}

impl From<CreditInput> for CreditRecord {
    fn from(input: CreditInput) -> Self {
        CreditRecord {
            age: input.age,
            sex: input.sex,
            job: input.job,
            housing: input.housing,
            saving_accounts: input.saving_accounts,
            checking_account: input.checking_account,
            credit_amount: input.credit_amount,
            duration: input.duration,
            purpose: input.purpose,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Rename the payload into a record and score it on the blocking pool
pub async fn predict(
    State(state): State<AppState>,
    Json(input): Json<CreditInput>,
) -> Result<Json<PredictionResult>, ApiError> {
    let record = CreditRecord::from(input);
    let predictor = Arc::clone(&state.predictor);
    let result = tokio::task::spawn_blocking(move || predictor.predict(&record)).await??;
    Ok(Json(result))
}
