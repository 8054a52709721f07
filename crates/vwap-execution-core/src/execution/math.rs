//! Decimal helpers for the hyperbolic-sine trajectory weights.
//!
//! `rust_decimal` has no NaN or infinity, so every helper here stays inside
//! the representable range: exponentials are only ever taken of non-positive
//! arguments, and underflow collapses to zero.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::ExecutionError;
use crate::ExecutionResult;

/// Below this `|kappa| * T` the sinh ratios are replaced by their
/// second-order series, which is exact to well under 1e-15 there.
pub const SMALL_KAPPA_HORIZON: Decimal = dec!(0.0001);

pub(crate) fn sign_decimal(x: Decimal) -> Decimal {
    if x > Decimal::ZERO {
        Decimal::ONE
    } else if x < Decimal::ZERO {
        -Decimal::ONE
    } else {
        Decimal::ZERO
    }
}

pub(crate) fn sqrt_decimal(x: Decimal, context: &str) -> ExecutionResult<Decimal> {
    x.sqrt().ok_or_else(|| ExecutionError::InvalidInput {
        field: context.into(),
        reason: format!("square root of negative value {}", x),
    })
}

/// `e^{-x}` for `x >= 0`. Halves the argument until it is at most one, then
/// squares back up; results below the Decimal scale underflow to zero.
fn exp_neg(x: Decimal) -> Decimal {
    if x > Decimal::ONE {
        let half = exp_neg(x / dec!(2));
        return half * half;
    }
    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1u32..=30 {
        term = -term * x / Decimal::from(n);
        sum += term;
    }
    sum
}

/// `sinh(a) / sinh(b)` for `0 <= a <= b`, `b > 0`, without overflow:
/// `e^{-(b-a)} * (1 - e^{-2a}) / (1 - e^{-2b})`.
fn sinh_ratio(a: Decimal, b: Decimal) -> Decimal {
    let ea = exp_neg(a);
    let eb = exp_neg(b);
    exp_neg(b - a) * (Decimal::ONE - ea * ea) / (Decimal::ONE - eb * eb)
}

/// Sum that reports leaving the Decimal range instead of panicking.
pub(crate) fn checked_sum<I>(values: I, context: &str) -> ExecutionResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v))
        .ok_or_else(|| ExecutionError::overflow(context))
}

/// Trajectory weights at time `t` on a horizon `horizon` for decay rate `kappa`:
///
/// - `decay    = sinh(kappa (T - t)) / sinh(kappa T)`
/// - `tracking = 1 - (sinh(kappa (T - t)) + sinh(kappa t)) / sinh(kappa T)`
///
/// Both are even in `kappa`. At `kappa = 0` they reduce to `(T - t) / T` and `0`.
/// Requires `0 <= t <= horizon`; only `kappa * T` itself can leave the range.
pub(crate) fn trajectory_weights(
    kappa: Decimal,
    t: Decimal,
    horizon: Decimal,
) -> ExecutionResult<(Decimal, Decimal)> {
    let remaining = horizon - t;
    let k = kappa.abs();
    let b = k
        .checked_mul(horizon)
        .ok_or_else(|| ExecutionError::overflow("kappa * horizon"))?;

    if b < SMALL_KAPPA_HORIZON {
        // sinh(k s) / sinh(k T) ~ (s / T) (1 + k^2 (s^2 - T^2) / 6)
        // with k T tiny: k^2 s^2 <= b^2, so scale by k before squaring
        let ks = k * remaining;
        let correction = (ks * ks - b * b) / dec!(6);
        let decay = remaining / horizon * (Decimal::ONE + correction);
        let tracking = (k * t) * ks / dec!(2);
        return Ok((decay, tracking));
    }

    let decay = sinh_ratio(k * remaining, b);
    let growth = sinh_ratio(k * t, b);
    Ok((decay, Decimal::ONE - decay - growth))
}
