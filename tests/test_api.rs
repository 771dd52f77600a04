//! HTTP tests against a live server on an ephemeral port

use std::net::SocketAddr;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use credit_risk::model::ModelKind;
use credit_risk::predict::{CreditRiskPredictor, PredictionResult, RiskPredictor};
use credit_risk::record::CreditRecord;
use credit_risk::registry::ModelUri;
use credit_risk::serve::{serve_with_shutdown, AppState};
use tokio::net::TcpListener;

#[path = "common/mod.rs"]
mod common;

/// Start the service in a background thread and return its base URL
fn spawn_server(state: AppState) -> String {
    let (tx, rx) = mpsc::channel::<SocketAddr>();
    thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            serve_with_shutdown(listener, state, std::future::pending())
                .await
                .unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

fn trained_server() -> (tempfile::TempDir, String) {
    let (temp_dir, store, _) = common::trained_store(ModelKind::Logreg);
    let predictor =
        CreditRiskPredictor::from_registry(&store, &ModelUri::latest("CreditRiskModel")).unwrap();
    let url = spawn_server(AppState::new(Arc::new(predictor)));
    (temp_dir, url)
}

struct Unavailable;

impl RiskPredictor for Unavailable {
    fn predict(&self, _record: &CreditRecord) -> anyhow::Result<PredictionResult> {
        anyhow::bail!("inference backend unavailable")
    }
}

fn status_of(result: Result<ureq::Response, ureq::Error>) -> u16 {
    match result {
        Ok(response) => response.status(),
        Err(ureq::Error::Status(code, _)) => code,
        Err(e) => panic!("transport error: {}", e),
    }
}

#[test]
fn test_health() {
    let (_temp_dir, url) = trained_server();

    let response = ureq::get(&format!("{}/health", url)).call().unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.into_json().unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[test]
fn test_predict_sample_payload() {
    let (_temp_dir, url) = trained_server();

    let response = ureq::post(&format!("{}/predict", url))
        .send_json(common::sample_payload())
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.into_json().unwrap();
    let probability = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&probability));
    let prediction = body["prediction"].as_str().unwrap();
    assert!(prediction == "High Risk" || prediction == "Low Risk");
}

#[test]
fn test_predict_without_optional_fields() {
    let (_temp_dir, url) = trained_server();

    let response = ureq::post(&format!("{}/predict", url))
        .send_json(common::payload_without_optionals())
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.into_json().unwrap();
    assert!(body["probability"].is_number());
}

#[test]
fn test_schema_violations_are_client_errors() {
    let (_temp_dir, url) = trained_server();
    let endpoint = format!("{}/predict", url);

    let mut missing_required = common::sample_payload();
    missing_required.as_object_mut().unwrap().remove("Age");
    let code = status_of(ureq::post(&endpoint).send_json(missing_required));
    assert_eq!(code, 422);

    let mut wrong_type = common::sample_payload();
    wrong_type["Duration"] = serde_json::json!("two years");
    let code = status_of(ureq::post(&endpoint).send_json(wrong_type));
    assert_eq!(code, 422);

    let code = status_of(
        ureq::post(&endpoint)
            .set("Content-Type", "application/json")
            .send_string("{not json"),
    );
    assert_eq!(code, 400);

    let code = status_of(ureq::post(&endpoint).send_string("plain text"));
    assert_eq!(code, 415);
}

#[test]
fn test_inference_failure_is_500_with_message() {
    let url = spawn_server(AppState::new(Arc::new(Unavailable)));

    let result = ureq::post(&format!("{}/predict", url)).send_json(common::sample_payload());
    match result {
        Err(ureq::Error::Status(500, response)) => {
            let body: serde_json::Value = response.into_json().unwrap();
            assert!(body["error"]
                .as_str()
                .unwrap()
                .contains("inference backend unavailable"));
        }
        other => panic!("expected 500, got {:?}", other.map(|r| r.status())),
    }

    // Health does not depend on the predictor
    let response = ureq::get(&format!("{}/health", url)).call().unwrap();
    assert_eq!(response.status(), 200);
}
