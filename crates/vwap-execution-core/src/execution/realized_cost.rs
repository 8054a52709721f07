//! Realized cost of a trajectory against observed interval prices and volumes.
//!
//! Two figures come out:
//! - the nonlinear impact `trading_cost` of the trajectory's interval trades;
//! - the `spread` between guaranteeing the whole order at the session VWAP and
//!   what trading at each interval's price actually realised,
//!   `spread = x[0] * VWAP - sum_k(-n[k] * price[k])`.
//!
//! For a sell (`x` running down from a positive `x[0]`) the spread is VWAP
//! notional minus proceeds; for a buy (`x` running up from a negative `x[0]`)
//! it is cash paid minus VWAP notional. Either way a positive spread means the
//! execution did worse than VWAP.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::grid::TimeGrid;
use super::impact::{interval_impacts, ImpactParameters};
use super::math::checked_sum;
use crate::error::ExecutionError;
use crate::types::{with_metadata, ComputationOutput, Price, Shares};
use crate::ExecutionResult;

/// Input for realized cost evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedCostInput {
    /// Remaining position at each grid point (N+1)
    pub trajectory: Vec<Shares>,
    /// Average trade price per interval (N)
    pub prices: Vec<Price>,
    /// Market volume per interval (N)
    pub volumes: Vec<Decimal>,
    pub market: ImpactParameters,
    pub grid: TimeGrid,
}

/// One interval of a realized execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalExecution {
    pub interval: u32,
    /// Shares sold in the interval, `-n[k]` (negative when buying)
    pub shares_executed: Shares,
    pub price: Price,
    pub market_volume: Decimal,
    pub trade_rate: Decimal,
    pub impact_cost: Decimal,
}

/// Realized execution cost breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealizedCostOutput {
    /// Total nonlinear impact cost
    pub trading_cost: Decimal,
    /// Shortfall against guaranteed VWAP execution
    pub spread: Decimal,
    /// Session volume-weighted average price
    pub vwap: Price,
    /// Initial position `x[0]`
    pub order_size: Shares,
    /// `sum_k(-n[k] * price[k])`
    pub executed_notional: Decimal,
    pub intervals: Vec<IntervalExecution>,
}

/// Volume-weighted average of `prices`.
pub fn vwap(prices: &[Price], volumes: &[Decimal]) -> ExecutionResult<Price> {
    if prices.len() != volumes.len() {
        return Err(ExecutionError::LengthMismatch {
            field: "volumes".into(),
            expected: prices.len(),
            actual: volumes.len(),
        });
    }
    let total_volume = checked_sum(volumes.iter().copied(), "total observed volume")?;
    if total_volume.is_zero() {
        return Err(ExecutionError::DivisionByZero {
            context: "VWAP (total observed volume is zero)".into(),
        });
    }
    let notional = prices
        .iter()
        .zip(volumes)
        .try_fold(Decimal::ZERO, |acc, (p, v)| acc.checked_add(p.checked_mul(*v)?))
        .ok_or_else(|| ExecutionError::overflow("VWAP notional"))?;
    notional
        .checked_div(total_volume)
        .ok_or_else(|| ExecutionError::overflow("VWAP"))
}

fn evaluate(
    trajectory: &[Shares],
    prices: &[Price],
    volumes: &[Decimal],
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<RealizedCostOutput> {
    grid.validate()?;
    params.validate()?;
    grid.check_points("trajectory", trajectory.len())?;
    grid.check_intervals("prices", prices.len())?;
    grid.check_intervals("volumes", volumes.len())?;
    if volumes.iter().any(|v| *v < Decimal::ZERO) {
        return Err(ExecutionError::invalid("volumes", "must be non-negative"));
    }

    let impacts = interval_impacts(trajectory, params, grid)?;
    let vwap = vwap(prices, volumes)?;
    let order_size = trajectory[0];

    let intervals: Vec<IntervalExecution> = impacts
        .iter()
        .zip(prices.iter().zip(volumes))
        .map(|(imp, (price, volume))| IntervalExecution {
            interval: imp.interval,
            shares_executed: -imp.trade,
            price: *price,
            market_volume: *volume,
            trade_rate: imp.trade_rate,
            impact_cost: imp.cost,
        })
        .collect();

    let trading_cost = checked_sum(intervals.iter().map(|i| i.impact_cost), "total trading cost")?;
    let executed_notional = intervals
        .iter()
        .try_fold(Decimal::ZERO, |acc, i| {
            acc.checked_add(i.shares_executed.checked_mul(i.price)?)
        })
        .ok_or_else(|| ExecutionError::overflow("executed notional"))?;
    let spread = order_size
        .checked_mul(vwap)
        .and_then(|benchmark| benchmark.checked_sub(executed_notional))
        .ok_or_else(|| ExecutionError::overflow("VWAP spread"))?;

    Ok(RealizedCostOutput {
        trading_cost,
        spread,
        vwap,
        order_size,
        executed_notional,
        intervals,
    })
}

/// Realized `(trading_cost, spread)` of `trajectory` against observed
/// interval `prices` and `volumes`.
pub fn realized_cost(
    trajectory: &[Shares],
    prices: &[Price],
    volumes: &[Decimal],
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<(Decimal, Decimal)> {
    let out = evaluate(trajectory, prices, volumes, params, grid)?;
    Ok((out.trading_cost, out.spread))
}

/// Evaluate realized cost with the full per-interval breakdown.
pub fn evaluate_realized_cost(
    input: &RealizedCostInput,
) -> ExecutionResult<ComputationOutput<RealizedCostOutput>> {
    let start = Instant::now();
    let output = evaluate(
        &input.trajectory,
        &input.prices,
        &input.volumes,
        &input.market,
        &input.grid,
    )?;

    let mut warnings = Vec::new();
    if let Some(last) = input.trajectory.last() {
        if !last.is_zero() {
            warnings.push(format!("trajectory ends with {} shares unexecuted", last));
        }
    }
    let mut has_sells = false;
    let mut has_buys = false;
    for i in &output.intervals {
        has_sells |= i.shares_executed > Decimal::ZERO;
        has_buys |= i.shares_executed < Decimal::ZERO;
    }
    if has_sells && has_buys {
        warnings.push("trajectory mixes buys and sells; spread assumes one direction".into());
    }
    let empty = input.volumes.iter().filter(|v| v.is_zero()).count();
    if empty > 0 {
        warnings.push(format!("{} interval(s) with zero market volume", empty));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Realized square-root impact cost and VWAP shortfall",
        &serde_json::json!({
            "intervals": input.grid.intervals,
            "horizon": input.grid.horizon.to_string(),
            "benchmark": "session VWAP of observed intervals",
        }),
        warnings,
        elapsed,
        output,
    ))
}
