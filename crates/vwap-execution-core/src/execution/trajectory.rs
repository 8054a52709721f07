//! Optimal liquidation trajectory against a stochastic VWAP benchmark.
//!
//! Closed-form Almgren-Chriss solution extended to a forecast cumulative volume
//! profile `EV`. The remaining position at grid time `t` is
//!
//! ```text
//! x(t) = sinh(k (T - t)) / sinh(k T) * X
//!      + [1 - (sinh(k (T - t)) + sinh(k t)) / sinh(k T)] * EV(t) * X
//! ```
//!
//! a pure risk-driven decay blended with a volume-tracking term. With zero risk
//! aversion (`k = 0`) this is the linear drawdown `(1 - t / T) * X`.
//!
//! Sign convention: a positive `order_size` is a sell (the position runs down
//! from `X` to zero); a negative `order_size` is a buy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::grid::TimeGrid;
use super::impact::{trade_increments, ImpactParameters};
use super::math::trajectory_weights;
use crate::error::ExecutionError;
use crate::types::{with_metadata, ComputationOutput, Fraction, Shares};
use crate::ExecutionResult;

/// Input for the optimal trajectory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryInput {
    /// Expected cumulative fraction of daily volume at each grid point (N+1)
    pub volume_forecast: Vec<Fraction>,
    /// Signed shares to execute: positive sells, negative buys
    pub order_size: Shares,
    /// Risk aversion `lambda`; zero, positive or negative
    pub risk_aversion: Decimal,
    pub market: ImpactParameters,
    pub grid: TimeGrid,
}

/// Optimal trajectory with its grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrajectoryOutput {
    /// Decay rate used by the solution
    pub kappa: Decimal,
    /// Grid times `t[k]`
    pub times: Vec<Decimal>,
    /// Remaining position `x[k]` at each grid time
    pub positions: Vec<Shares>,
    /// Signed interval trades `x[k] - x[k-1]`
    pub trades: Vec<Shares>,
}

/// Remaining-position trajectory of length `N + 1` minimising expected impact
/// cost plus `risk_aversion` times the variance of tracking error to VWAP.
///
/// The forecast is only checked for length; monotonicity and the `0 -> 1`
/// endpoints are the caller's responsibility.
pub fn optimal_trajectory(
    volume_forecast: &[Fraction],
    order_size: Shares,
    risk_aversion: Decimal,
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<Vec<Shares>> {
    Ok(solve(volume_forecast, order_size, risk_aversion, params, grid)?.positions)
}

/// Full solution: the `kappa` actually used, the grid times, positions and trades.
pub(crate) fn solve(
    volume_forecast: &[Fraction],
    order_size: Shares,
    risk_aversion: Decimal,
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<TrajectoryOutput> {
    grid.validate()?;
    params.validate()?;
    grid.check_points("volume_forecast", volume_forecast.len())?;

    let kappa = params.kappa(risk_aversion)?;
    let horizon = grid.horizon;
    let times = grid.times()?;

    let positions: Vec<Shares> = if kappa.is_zero() {
        log::debug!("zero risk aversion, using linear drawdown over {} intervals", grid.intervals);
        times
            .iter()
            .map(|t| (Decimal::ONE - t / horizon) * order_size)
            .collect()
    } else {
        log::debug!("solving trajectory with kappa={} over {} intervals", kappa, grid.intervals);
        times
            .iter()
            .zip(volume_forecast)
            .map(|(t, ev)| {
                let (decay, tracking) = trajectory_weights(kappa, *t, horizon)?;
                tracking
                    .checked_mul(*ev)
                    .and_then(|tracked| tracked.checked_add(decay))
                    .and_then(|weight| weight.checked_mul(order_size))
                    .ok_or_else(|| ExecutionError::overflow(format!("trajectory at t={}", t)))
            })
            .collect::<ExecutionResult<_>>()?
    };

    Ok(TrajectoryOutput {
        kappa,
        times,
        trades: trade_increments(&positions)?,
        positions,
    })
}

/// Non-fatal observations about a cumulative volume forecast.
pub(crate) fn forecast_warnings(field: &str, forecast: &[Fraction]) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some(first) = forecast.first() {
        if !first.is_zero() {
            warnings.push(format!("{} starts at {} rather than 0", field, first));
        }
    }
    if let Some(last) = forecast.last() {
        if *last != Decimal::ONE {
            warnings.push(format!("{} ends at {} rather than 1", field, last));
        }
    }
    if forecast.windows(2).any(|w| w[1] < w[0]) {
        warnings.push(format!("{} is not non-decreasing", field));
    }
    if forecast
        .iter()
        .any(|v| *v < Decimal::ZERO || *v > Decimal::ONE)
    {
        warnings.push(format!("{} has values outside [0, 1]", field));
    }
    warnings
}

/// Solve the optimal trajectory and wrap it with methodology and warnings.
pub fn solve_trajectory(
    input: &TrajectoryInput,
) -> ExecutionResult<ComputationOutput<TrajectoryOutput>> {
    let start = Instant::now();

    let output = solve(
        &input.volume_forecast,
        input.order_size,
        input.risk_aversion,
        &input.market,
        &input.grid,
    )?;

    let mut warnings = forecast_warnings("volume_forecast", &input.volume_forecast);
    if input.risk_aversion < Decimal::ZERO {
        warnings.push(format!(
            "negative risk aversion {}; the trajectory equals that of |lambda|",
            input.risk_aversion
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Almgren-Chriss optimal execution against a stochastic VWAP benchmark",
        &serde_json::json!({
            "order_size": input.order_size.to_string(),
            "risk_aversion": input.risk_aversion.to_string(),
            "horizon": input.grid.horizon.to_string(),
            "intervals": input.grid.intervals,
            "impact_law": "1.5 * eta * sigma * sqrt(rate)",
        }),
        warnings,
        elapsed,
        output,
    ))
}
