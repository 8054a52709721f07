use clap::Args;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use vwap_execution_core::execution::{
    estimate_risk_adjusted_cost, evaluate_realized_cost, solve_trajectory, RealizedCostInput,
    RiskAdjustedCostInput, TrajectoryInput,
};

use crate::input;

#[derive(Args)]
pub struct TrajectoryArgs {
    /// Path to JSON file with forecast, order size, risk aversion, market and grid
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct RealizedCostArgs {
    /// Path to JSON file with trajectory, interval prices/volumes, market and grid
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct RiskCostArgs {
    /// Path to JSON file with order size, forecast moments, market and grid
    #[arg(long)]
    pub input: Option<String>,

    /// Override the risk aversion in the input (default 1e-6)
    #[arg(long, allow_hyphen_values = true)]
    pub risk_aversion: Option<Decimal>,
}

fn read_input<T: DeserializeOwned>(
    path: &Option<String>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(ref path) = path {
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        Ok(serde_json::from_value(data)?)
    } else {
        Err(format!("--input <file.json> or stdin required for {}", what).into())
    }
}

pub fn run_trajectory(args: TrajectoryArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: TrajectoryInput = read_input(&args.input, "trajectory")?;
    let result = solve_trajectory(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_realized_cost(args: RealizedCostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: RealizedCostInput = read_input(&args.input, "realized cost")?;
    let result = evaluate_realized_cost(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_risk_cost(args: RiskCostArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input: RiskAdjustedCostInput = read_input(&args.input, "risk-adjusted cost")?;
    if let Some(lambda) = args.risk_aversion {
        input.risk_aversion = lambda;
    }
    let result = estimate_risk_adjusted_cost(&input)?;
    Ok(serde_json::to_value(result)?)
}
