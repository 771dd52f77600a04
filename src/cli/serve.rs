//! `credit-risk serve` and `credit-risk predict`

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use super::args::{ModelSource, PredictArgs, ServeArgs};
use crate::predict::{CreditRiskPredictor, RiskPredictor};
use crate::record::CreditRecord;
use crate::registry::FileStore;
use crate::serve::{serve, AppState, CreditInput};

/// Load the predictor once; any failure aborts startup
fn load_predictor(source: &ModelSource) -> Result<CreditRiskPredictor> {
    let store = FileStore::open(&source.tracking_dir).with_context(|| {
        format!(
            "Failed to open tracking store at {}",
            source.tracking_dir.display()
        )
    })?;
    CreditRiskPredictor::from_registry(&store, &source.model_uri)
}

pub fn run_serve(args: &ServeArgs) -> Result<()> {
    let predictor = load_predictor(&args.source)?;
    let state = AppState::new(Arc::new(predictor));

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(serve(args.addr(), state))?;
    info!("server stopped");
    Ok(())
}

pub fn run_predict(args: &PredictArgs) -> Result<()> {
    let predictor = load_predictor(&args.source)?;

    let body = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let input: CreditInput = serde_json::from_str(&body)
        .with_context(|| format!("{} is not a valid record", args.input.display()))?;

    let result = predictor.predict(&CreditRecord::from(input))?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
