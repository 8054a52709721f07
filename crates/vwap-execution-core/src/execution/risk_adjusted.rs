//! Expected risk-adjusted cost per share of a guaranteed VWAP execution.
//!
//! The optimal trajectory is solved for the forecast, its expected impact cost
//! is computed with the square-root law, and the variance of tracking error to
//! the stochastic VWAP position is
//!
//! ```text
//! var = sum_{k=0..N} sigma^2 * tau * (x[k]^2 - 2 EV[k] x[k] X + EV2[k] X^2)
//! ```
//!
//! The estimate is `(trading_cost + lambda * var) / |X|`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::grid::TimeGrid;
use super::impact::{trading_cost, ImpactParameters};
use super::trajectory::{forecast_warnings, solve};
use crate::error::ExecutionError;
use crate::types::{with_metadata, ComputationOutput, Fraction, Shares};
use crate::ExecutionResult;

/// Near risk-neutral baseline risk aversion.
pub const DEFAULT_RISK_AVERSION: Decimal = dec!(0.000001);

fn default_risk_aversion() -> Decimal {
    DEFAULT_RISK_AVERSION
}

/// Input for the risk-adjusted cost estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAdjustedCostInput {
    /// Signed shares to execute: positive sells, negative buys
    pub order_size: Shares,
    /// Expected cumulative volume fraction at each grid point (N+1)
    pub volume_forecast: Vec<Fraction>,
    /// Second moment of the cumulative volume fraction at each grid point (N+1)
    pub volume_second_moment: Vec<Fraction>,
    pub market: ImpactParameters,
    pub grid: TimeGrid,
    /// Risk aversion `lambda`; defaults to `DEFAULT_RISK_AVERSION`
    #[serde(default = "default_risk_aversion")]
    pub risk_aversion: Decimal,
}

/// Risk-adjusted cost breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskAdjustedCostOutput {
    /// `(trading_cost + risk_penalty) / |X|`
    pub cost_per_share: Decimal,
    /// Expected impact cost of the optimal trajectory
    pub trading_cost: Decimal,
    /// Variance of tracking error against the VWAP position
    pub variance: Decimal,
    /// `lambda * variance`
    pub risk_penalty: Decimal,
    pub kappa: Decimal,
    /// Optimal remaining position at each grid point (empty when `X = 0`)
    pub trajectory: Vec<Shares>,
}

/// Variance of tracking error between `trajectory` and the stochastic VWAP
/// position `EV * X`.
pub fn tracking_variance(
    trajectory: &[Shares],
    volume_forecast: &[Fraction],
    volume_second_moment: &[Fraction],
    order_size: Shares,
    volatility: Decimal,
    grid: &TimeGrid,
) -> ExecutionResult<Decimal> {
    grid.validate()?;
    grid.check_points("trajectory", trajectory.len())?;
    grid.check_points("volume_forecast", volume_forecast.len())?;
    grid.check_points("volume_second_moment", volume_second_moment.len())?;

    let rate = volatility
        .checked_mul(volatility)
        .and_then(|v| v.checked_mul(grid.step()))
        .ok_or_else(|| ExecutionError::overflow("tracking variance rate (sigma^2 * tau)"))?;
    let two = dec!(2);
    let mut sum = Decimal::ZERO;
    for ((x, ev), ev2) in trajectory
        .iter()
        .zip(volume_forecast)
        .zip(volume_second_moment)
    {
        sum = (|| {
            let x2 = x.checked_mul(*x)?;
            let cross = two.checked_mul(*ev)?.checked_mul(*x)?.checked_mul(order_size)?;
            let second = ev2.checked_mul(order_size)?.checked_mul(order_size)?;
            let term = rate.checked_mul(x2.checked_sub(cross)?.checked_add(second)?)?;
            sum.checked_add(term)
        })()
        .ok_or_else(|| ExecutionError::overflow("tracking variance"))?;
    }
    Ok(sum)
}

fn estimate(input: &RiskAdjustedCostInput) -> ExecutionResult<RiskAdjustedCostOutput> {
    if input.order_size.is_zero() {
        return Ok(RiskAdjustedCostOutput::default());
    }
    input
        .grid
        .check_points("volume_second_moment", input.volume_second_moment.len())?;

    let solved = solve(
        &input.volume_forecast,
        input.order_size,
        input.risk_aversion,
        &input.market,
        &input.grid,
    )?;
    let trajectory = solved.positions;
    let cost = trading_cost(&trajectory, &input.market, &input.grid)?;
    let variance = tracking_variance(
        &trajectory,
        &input.volume_forecast,
        &input.volume_second_moment,
        input.order_size,
        input.market.volatility,
        &input.grid,
    )?;
    let risk_penalty = input
        .risk_aversion
        .checked_mul(variance)
        .ok_or_else(|| ExecutionError::overflow("risk penalty (lambda * variance)"))?;
    let cost_per_share = cost
        .checked_add(risk_penalty)
        .and_then(|total| total.checked_div(input.order_size.abs()))
        .ok_or_else(|| ExecutionError::overflow("risk-adjusted cost per share"))?;

    Ok(RiskAdjustedCostOutput {
        cost_per_share,
        trading_cost: cost,
        variance,
        risk_penalty,
        kappa: solved.kappa,
        trajectory,
    })
}

/// Expected risk-adjusted cost per share of optimally executing `order_size`.
/// Zero for a zero order.
pub fn risk_adjusted_cost_per_share(input: &RiskAdjustedCostInput) -> ExecutionResult<Decimal> {
    Ok(estimate(input)?.cost_per_share)
}

/// Estimate risk-adjusted cost with its breakdown and the optimal trajectory.
pub fn estimate_risk_adjusted_cost(
    input: &RiskAdjustedCostInput,
) -> ExecutionResult<ComputationOutput<RiskAdjustedCostOutput>> {
    let start = Instant::now();
    let output = estimate(input)?;

    let mut warnings = forecast_warnings("volume_forecast", &input.volume_forecast);
    if input
        .volume_forecast
        .iter()
        .zip(&input.volume_second_moment)
        .any(|(ev, ev2)| ev.checked_mul(*ev).is_some_and(|sq| *ev2 < sq))
    {
        warnings.push("volume_second_moment below squared forecast (negative variance)".into());
    }
    if input.order_size.is_zero() {
        warnings.push("zero order size; nothing to execute".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk-adjusted guaranteed VWAP cost (Almgren-Chriss with stochastic volume)",
        &serde_json::json!({
            "order_size": input.order_size.to_string(),
            "risk_aversion": input.risk_aversion.to_string(),
            "intervals": input.grid.intervals,
            "horizon": input.grid.horizon.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
#[cfg(test)]
mod tests {
    use super::*;

    fn basic_input() -> RiskAdjustedCostInput {
        RiskAdjustedCostInput {
            order_size: dec!(1000),
            volume_forecast: vec![dec!(0), dec!(0.1), dec!(0.5), dec!(0.9)],
            volume_second_moment: vec![dec!(0), dec!(0.01), dec!(0.25), dec!(0.81)],
            market: ImpactParameters {
                volatility: dec!(0.02),
                average_daily_volume: dec!(1000000),
                impact_coefficient: dec!(0.1),
            },
            grid: TimeGrid::new(dec!(1), 3),
            risk_aversion: DEFAULT_RISK_AVERSION,
        }
    }

    #[test]
    fn test_typical_case_non_negative() {
        let cost = risk_adjusted_cost_per_share(&basic_input()).unwrap();
        assert!(cost > Decimal::ZERO);
    }

    #[test]
    fn test_zero_risk_aversion_is_pure_trading_cost() {
        let mut input = basic_input();
        input.risk_aversion = Decimal::ZERO;
        let out = estimate(&input).unwrap();
        assert_eq!(out.risk_penalty, Decimal::ZERO);
        assert_eq!(out.cost_per_share, out.trading_cost / dec!(1000));
        assert!(out.cost_per_share >= Decimal::ZERO);
    }

    #[test]
    fn test_zero_volatility_is_zero() {
        let mut input = basic_input();
        input.market.volatility = Decimal::ZERO;
        let out = estimate(&input).unwrap();
        assert_eq!(out.variance, Decimal::ZERO);
        assert_eq!(out.trading_cost, Decimal::ZERO);
        assert_eq!(out.cost_per_share, Decimal::ZERO);
    }

    #[test]
    fn test_zero_order_is_zero() {
        let mut input = basic_input();
        input.order_size = Decimal::ZERO;
        assert_eq!(risk_adjusted_cost_per_share(&input).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_zero_order_skips_validation() {
        let mut input = basic_input();
        input.order_size = Decimal::ZERO;
        input.volume_second_moment.clear();
        assert_eq!(risk_adjusted_cost_per_share(&input).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_buy_and_sell_cost_the_same_per_share() {
        let sell = risk_adjusted_cost_per_share(&basic_input()).unwrap();
        let mut input = basic_input();
        input.order_size = dec!(-1000);
        let buy = risk_adjusted_cost_per_share(&input).unwrap();
        assert_eq!(sell, buy);
    }

    #[test]
    fn test_linear_trajectory_variance_closed_form() {
        let mut input = basic_input();
        input.risk_aversion = Decimal::ZERO;
        let out = estimate(&input).unwrap();
        // x = [1000, 666.67, 333.33, 0]; per-point terms (in X^2 units):
        // 1 - 0 + 0, (2/3)^2 - 2*0.1*(2/3) + 0.01, (1/3)^2 - 2*0.5*(1/3) + 0.25, 0.81
        // = 1 + 0.3211111 + 0.0277778 + 0.81 = 2.1588889
        // var = 0.0004 * (1/3) * 1e6 * 2.1588889 = 287.851852
        assert!((out.variance - dec!(287.851852)).abs() < dec!(0.00001), "{}", out.variance);
    }

    #[test]
    fn test_risk_penalty_scales_with_lambda() {
        let out = estimate(&basic_input()).unwrap();
        assert_eq!(out.risk_penalty, DEFAULT_RISK_AVERSION * out.variance);
        assert_eq!(out.trajectory.len(), 4);
        assert!(out.kappa > Decimal::ZERO);
    }

    #[test]
    fn test_second_moment_length_mismatch() {
        let mut input = basic_input();
        input.volume_second_moment.pop();
        assert!(matches!(
            risk_adjusted_cost_per_share(&input),
            Err(ExecutionError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_default_risk_aversion_from_json() {
        let json = serde_json::json!({
            "order_size": "1000",
            "volume_forecast": ["0", "0.1", "0.5", "0.9"],
            "volume_second_moment": ["0", "0.01", "0.25", "0.81"],
            "market": {
                "volatility": "0.02",
                "average_daily_volume": "1000000",
                "impact_coefficient": "0.1"
            },
            "grid": { "horizon": "1", "intervals": 3 }
        });
        let input: RiskAdjustedCostInput = serde_json::from_value(json).unwrap();
        assert_eq!(input.risk_aversion, DEFAULT_RISK_AVERSION);
    }

    #[test]
    fn test_envelope_warnings() {
        let out = estimate_risk_adjusted_cost(&basic_input()).unwrap();
        assert!(out.result.cost_per_share > Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("ends at 0.9")));
    }

    #[test]
    fn test_risk_penalty_out_of_range_is_overflow() {
        // variance ~ 2.4e8 fits; lambda * variance ~ 2.4e29 does not
        let mut input = basic_input();
        input.order_size = dec!(1000000);
        input.risk_aversion = dec!(1000000000000000000000);
        match risk_adjusted_cost_per_share(&input) {
            Err(ExecutionError::NumericalOverflow { context }) => {
                assert!(context.contains("risk penalty"), "{}", context)
            }
            other => panic!("expected NumericalOverflow, got {:?}", other),
        }
    }

    #[test]
    fn test_variance_accumulation_out_of_range_is_overflow() {
        let grid = TimeGrid::new(dec!(1000000), 1);
        let big = dec!(10000000000000);
        let err = tracking_variance(
            &[big, big],
            &[Decimal::ZERO, Decimal::ZERO],
            &[Decimal::ZERO, Decimal::ZERO],
            big,
            dec!(100),
            &grid,
        );
        assert!(matches!(err, Err(ExecutionError::NumericalOverflow { .. })));
    }

    #[test]
    fn test_tracking_variance_rejects_invalid_grid() {
        let grid = TimeGrid::new(dec!(1), 0);
        let err = tracking_variance(&[dec!(1)], &[dec!(0)], &[dec!(0)], dec!(1), dec!(0.02), &grid);
        assert!(matches!(err, Err(ExecutionError::InvalidInput { .. })));
    }
}
