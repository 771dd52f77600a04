//! HTTP service: `GET /health` and `POST /predict`.

mod error;
mod handlers;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::info;

pub use error::ApiError;
pub use handlers::{health, predict, AppState, CreditInput, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict))
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve_with_shutdown<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("Failed to read listener address")?;
    info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

/// Bind `addr` and serve until Ctrl-C
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::extract::State;
    use axum::response::IntoResponse;
    use axum::Json;

    use super::*;
    use crate::predict::{PredictionResult, RiskLabel, RiskPredictor};
    use crate::record::CreditRecord;

    struct FixedPredictor(f64);

    impl RiskPredictor for FixedPredictor {
        fn predict(&self, _record: &CreditRecord) -> anyhow::Result<PredictionResult> {
            Ok(PredictionResult::from_probability(self.0))
        }
    }

    struct FailingPredictor;

    impl RiskPredictor for FailingPredictor {
        fn predict(&self, _record: &CreditRecord) -> anyhow::Result<PredictionResult> {
            anyhow::bail!("model exploded")
        }
    }

    /// Records the thread it was called on
    struct ThreadRecorder(std::sync::Mutex<Option<std::thread::ThreadId>>);

    impl RiskPredictor for ThreadRecorder {
        fn predict(&self, _record: &CreditRecord) -> anyhow::Result<PredictionResult> {
            if let Ok(mut seen) = self.0.lock() {
                *seen = Some(std::thread::current().id());
            }
            Ok(PredictionResult::from_probability(0.2))
        }
    }

    fn sample_input() -> CreditInput {
        serde_json::from_value(serde_json::json!({
            "Age": 35, "Sex": "male", "Job": 2, "Housing": "own",
            "Saving_accounts": "moderate", "Checking_account": "little",
            "Credit_amount": 5000, "Duration": 24, "Purpose": "car"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_health_is_ok() {
        let Json(body) = health().await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn test_predict_returns_predictor_result() {
        let state = AppState::new(Arc::new(FixedPredictor(0.8123456)));
        let Json(result) = predict(State(state), Json(sample_input())).await.unwrap();
        assert_eq!(result.probability, 0.8123);
        assert_eq!(result.prediction, RiskLabel::High);
    }

    #[tokio::test]
    async fn test_inference_runs_off_the_request_thread() {
        let recorder = Arc::new(ThreadRecorder(std::sync::Mutex::new(None)));
        let state = AppState::new(recorder.clone());

        let Json(result) = predict(State(state), Json(sample_input())).await.unwrap();
        assert_eq!(result.prediction, RiskLabel::Low);

        let seen = recorder.0.lock().unwrap().expect("predictor was not called");
        assert_ne!(seen, std::thread::current().id());
    }

    #[tokio::test]
    async fn test_predictor_failure_maps_to_500() {
        let state = AppState::new(Arc::new(FailingPredictor));
        let err = predict(State(state), Json(sample_input())).await.unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_payload_renames_account_fields() {
        let record = CreditRecord::from(sample_input());
        assert_eq!(record.saving_accounts.as_deref(), Some("moderate"));
        assert_eq!(record.checking_account.as_deref(), Some("little"));
        assert_eq!(record.credit_amount, 5000.0);
    }

    #[test]
    fn test_optional_fields_may_be_omitted() {
        let input: CreditInput = serde_json::from_value(serde_json::json!({
            "Age": 35, "Sex": "male", "Job": 2, "Housing": "own",
            "Credit_amount": 5000.0, "Duration": 24, "Purpose": "car"
        }))
        .unwrap();
        assert!(input.saving_accounts.is_none());
        assert!(input.checking_account.is_none());
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let parsed = serde_json::from_value::<CreditInput>(serde_json::json!({
            "Age": "thirty", "Sex": "male", "Job": 2, "Housing": "own",
            "Credit_amount": 5000.0, "Duration": 24, "Purpose": "car"
        }));
        assert!(parsed.is_err());
    }
}
