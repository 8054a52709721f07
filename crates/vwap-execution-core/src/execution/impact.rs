//! Power-law temporary market impact shared by the realized-cost evaluator
//! and the risk-adjusted estimator.
//!
//! Trading `n` shares over an interval of length `tau` is a trade rate
//! `d = n / (tau * ADV)` in units of average daily volume. The per-share
//! impact cost of that rate is `sign(d) * 1.5 * eta * sigma * sqrt(|d|)`, so
//! the interval costs `n * sign(d) * 1.5 * eta * sigma * sqrt(|d|)`, which is
//! non-negative for buys and sells alike.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::grid::TimeGrid;
use super::math::{checked_sum, sign_decimal, sqrt_decimal};
use crate::error::ExecutionError;
use crate::types::{Price, Shares};
use crate::ExecutionResult;

/// Scale of the square-root impact law.
pub const IMPACT_SCALE: Decimal = dec!(1.5);

/// Volatility and liquidity of the instrument being executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactParameters {
    /// Volatility in price units (return volatility times arrival price), `sigma`
    pub volatility: Price,
    /// Average daily volume (or notional) used to normalise trade rates, `ADV`
    pub average_daily_volume: Decimal,
    /// Impact coefficient, `eta`
    pub impact_coefficient: Decimal,
}

/// Impact detail for one interval of a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalImpact {
    /// 1-based interval index
    pub interval: u32,
    /// Signed change in remaining position, `x[k] - x[k-1]`
    pub trade: Shares,
    /// Trade rate as a fraction of ADV per unit time
    pub trade_rate: Decimal,
    /// Signed per-share impact cost
    pub cost_per_share: Decimal,
    /// Impact cost of the interval, `trade * cost_per_share`
    pub cost: Decimal,
}

impl ImpactParameters {
    pub fn validate(&self) -> ExecutionResult<()> {
        if self.volatility < Decimal::ZERO {
            return Err(ExecutionError::invalid("volatility", "must be non-negative"));
        }
        if self.average_daily_volume <= Decimal::ZERO {
            return Err(ExecutionError::invalid(
                "average_daily_volume",
                "must be positive",
            ));
        }
        if self.impact_coefficient <= Decimal::ZERO {
            return Err(ExecutionError::invalid(
                "impact_coefficient",
                "must be positive",
            ));
        }
        Ok(())
    }

    /// Risk-adjusted decay rate
    /// `kappa = sign(lambda) * sqrt(|lambda| * sigma / (1.5 * eta / sqrt(ADV)))`.
    ///
    /// Negative risk aversion is accepted and yields a negative `kappa`.
    pub fn kappa(&self, risk_aversion: Decimal) -> ExecutionResult<Decimal> {
        if risk_aversion.is_zero() {
            return Ok(Decimal::ZERO);
        }
        let sqrt_adv = sqrt_decimal(self.average_daily_volume, "average_daily_volume")?;
        let radicand = IMPACT_SCALE
            .checked_mul(self.impact_coefficient)
            .and_then(|scaled| scaled.checked_div(sqrt_adv))
            .and_then(|linear_impact| {
                risk_aversion
                    .abs()
                    .checked_mul(self.volatility)?
                    .checked_div(linear_impact)
            })
            .ok_or_else(|| ExecutionError::overflow("kappa"))?;
        Ok(sign_decimal(risk_aversion) * sqrt_decimal(radicand, "kappa")?)
    }

    /// Signed per-share impact cost of trading at `trade_rate`.
    pub fn cost_per_share(&self, trade_rate: Decimal) -> ExecutionResult<Decimal> {
        let root = sqrt_decimal(trade_rate.abs(), "trade_rate")?;
        let magnitude = IMPACT_SCALE
            .checked_mul(self.impact_coefficient)
            .and_then(|v| v.checked_mul(self.volatility))
            .and_then(|v| v.checked_mul(root))
            .ok_or_else(|| ExecutionError::overflow("impact cost per share"))?;
        Ok(sign_decimal(trade_rate) * magnitude)
    }
}

/// Interval trades `n[k] = x[k] - x[k-1]` for `k = 1..=N`.
pub fn trade_increments(trajectory: &[Shares]) -> ExecutionResult<Vec<Shares>> {
    trajectory
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            w[1].checked_sub(w[0])
                .ok_or_else(|| ExecutionError::overflow(format!("trade of interval {}", i + 1)))
        })
        .collect()
}

/// Per-interval impact of following `trajectory` on `grid`.
pub fn interval_impacts(
    trajectory: &[Shares],
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<Vec<IntervalImpact>> {
    let volume_per_interval = grid
        .step()
        .checked_mul(params.average_daily_volume)
        .ok_or_else(|| ExecutionError::overflow("volume per interval (tau * ADV)"))?;
    if volume_per_interval.is_zero() {
        return Err(ExecutionError::DivisionByZero {
            context: "trade rate normalisation (tau * ADV)".into(),
        });
    }

    trade_increments(trajectory)?
        .into_iter()
        .enumerate()
        .map(|(i, trade)| {
            let trade_rate = trade.checked_div(volume_per_interval).ok_or_else(|| {
                ExecutionError::overflow(format!("trade rate of interval {}", i + 1))
            })?;
            let cost_per_share = params.cost_per_share(trade_rate)?;
            let cost = trade
                .checked_mul(cost_per_share)
                .ok_or_else(|| {
                    ExecutionError::overflow(format!("impact cost of interval {}", i + 1))
                })?;
            Ok(IntervalImpact {
                interval: i as u32 + 1,
                trade,
                trade_rate,
                cost_per_share,
                cost,
            })
        })
        .collect()
}

/// Total impact cost `sum_k n[k] * sign(d[k]) * 1.5 * eta * sigma * sqrt(|d[k]|)`.
pub fn trading_cost(
    trajectory: &[Shares],
    params: &ImpactParameters,
    grid: &TimeGrid,
) -> ExecutionResult<Decimal> {
    let impacts = interval_impacts(trajectory, params, grid)?;
    checked_sum(impacts.iter().map(|i| i.cost), "total trading cost")
}
