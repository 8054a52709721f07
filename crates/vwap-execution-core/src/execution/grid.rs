use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ExecutionError;
use crate::ExecutionResult;

/// Equally spaced trading grid: `intervals + 1` points over `horizon`.
///
/// Every routine that touches the same trajectory must be given the same
/// grid; the step `tau = horizon / intervals` is always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeGrid {
    /// Horizon length `T` (any consistent unit, typically trading days)
    pub horizon: Decimal,
    /// Number of intervals `N`
    pub intervals: u32,
}

impl TimeGrid {
    pub fn new(horizon: Decimal, intervals: u32) -> Self {
        Self { horizon, intervals }
    }

    pub fn validate(&self) -> ExecutionResult<()> {
        if self.horizon <= Decimal::ZERO {
            return Err(ExecutionError::invalid("horizon", "must be positive"));
        }
        if self.intervals == 0 {
            return Err(ExecutionError::invalid("intervals", "must be at least 1"));
        }
        Ok(())
    }

    /// Interval length `tau = T / N`.
    pub fn step(&self) -> Decimal {
        self.horizon / Decimal::from(self.intervals)
    }

    /// Number of grid points, `N + 1`.
    pub fn points(&self) -> usize {
        self.intervals as usize + 1
    }

    /// Grid times `t[k] = k * T / N` for `k = 0..=N`.
    ///
    /// Multiplying before dividing keeps `t[N] == T` exact, so `k * T` must
    /// stay inside the Decimal range.
    pub fn times(&self) -> ExecutionResult<Vec<Decimal>> {
        self.validate()?;
        let n = Decimal::from(self.intervals);
        (0..=self.intervals)
            .map(|k| {
                self.horizon
                    .checked_mul(Decimal::from(k))
                    .map(|v| v / n)
                    .ok_or_else(|| ExecutionError::overflow(format!("grid time t[{}]", k)))
            })
            .collect()
    }

    /// Require a per-point series (trajectory, forecast) of length `N + 1`.
    pub fn check_points(&self, field: &str, len: usize) -> ExecutionResult<()> {
        check_len(field, self.points(), len)
    }

    /// Require a per-interval series (prices, volumes) of length `N`.
    pub fn check_intervals(&self, field: &str, len: usize) -> ExecutionResult<()> {
        check_len(field, self.intervals as usize, len)
    }
}

fn check_len(field: &str, expected: usize, actual: usize) -> ExecutionResult<()> {
    if expected != actual {
        return Err(ExecutionError::LengthMismatch {
            field: field.into(),
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_step_and_points() {
        let grid = TimeGrid::new(dec!(1), 4);
        assert_eq!(grid.step(), dec!(0.25));
        assert_eq!(grid.points(), 5);
    }

    #[test]
    fn test_times_end_exactly_on_horizon() {
        let grid = TimeGrid::new(dec!(1), 3);
        let times = grid.times().unwrap();
        assert_eq!(times.len(), 4);
        assert_eq!(times[0], Decimal::ZERO);
        assert_eq!(times[3], dec!(1));
        assert!((times[1] - dec!(0.333333333333)).abs() < dec!(0.000000000001));
    }

    #[test]
    fn test_times_out_of_decimal_range_is_overflow() {
        let grid = TimeGrid::new(dec!(1000000000000000000000000000), 100);
        assert!(grid.validate().is_ok());
        assert!(matches!(
            grid.times(),
            Err(ExecutionError::NumericalOverflow { .. })
        ));
    }

    #[test]
    fn test_zero_intervals_rejected() {
        assert!(TimeGrid::new(dec!(1), 0).validate().is_err());
    }

    #[test]
    fn test_non_positive_horizon_rejected() {
        assert!(TimeGrid::new(Decimal::ZERO, 5).validate().is_err());
        assert!(TimeGrid::new(dec!(-1), 5).validate().is_err());
    }

    #[test]
    fn test_length_checks() {
        let grid = TimeGrid::new(dec!(1), 5);
        assert!(grid.check_points("trajectory", 6).is_ok());
        assert!(grid.check_intervals("prices", 5).is_ok());
        match grid.check_points("trajectory", 5) {
            Err(ExecutionError::LengthMismatch {
                field,
                expected,
                actual,
            }) => {
                assert_eq!(field, "trajectory");
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("expected LengthMismatch, got {:?}", other),
        }
    }
}
