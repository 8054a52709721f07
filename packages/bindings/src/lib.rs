use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;
use std::path::Path;

use vwap_execution_core::execution;
use vwap_execution_core::market_data::{
    build_interval_panel, DirectoryArchive, SessionWindow,
};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

#[napi]
pub fn solve_trajectory(input_json: String) -> NapiResult<String> {
    let input: execution::TrajectoryInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = execution::solve_trajectory(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn evaluate_realized_cost(input_json: String) -> NapiResult<String> {
    let input: execution::RealizedCostInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = execution::evaluate_realized_cost(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn estimate_risk_adjusted_cost(input_json: String) -> NapiResult<String> {
    let input: execution::RiskAdjustedCostInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = execution::estimate_risk_adjusted_cost(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct AggregateRequest {
    trades_dir: String,
    symbols: Vec<String>,
    out_dir: String,
    #[serde(default)]
    window: Option<SessionWindow>,
}

/// Bucket an on-disk trade archive and write the price/volume CSV pair.
#[napi]
pub fn aggregate_trades(input_json: String) -> NapiResult<String> {
    let req: AggregateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let window = req.window.unwrap_or_default();
    let archive = DirectoryArchive::new(&req.trades_dir);
    let days = archive.trading_days().map_err(to_napi_error)?;
    let panel =
        build_interval_panel(&archive, &days, &req.symbols, &window).map_err(to_napi_error)?;
    let (price_file, volume_file) = panel
        .write_csv_files(Path::new(&req.out_dir))
        .map_err(to_napi_error)?;
    let summary = serde_json::json!({
        "instruments": panel.symbols.len(),
        "days": panel.days.len(),
        "intervals_per_day": panel.intervals_per_day,
        "skipped": panel.skipped,
        "price_file": price_file.display().to_string(),
        "volume_file": volume_file.display().to_string(),
    });
    serde_json::to_string(&summary).map_err(to_napi_error)
}
