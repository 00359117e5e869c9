//! Floating point helpers shared by the simulator and its tests.

use approx::AbsDiffEq;

/// Compares if two floats are close via `approx::abs_diff_eq` using a maximum absolute difference
/// (epsilon) of `acc`.
#[must_use]
pub fn almost_eq(a: f64, b: f64, acc: f64) -> bool {
    if a.is_infinite() && b.is_infinite() {
        return a == b;
    }
    a.abs_diff_eq(&b, acc)
}

/// Floors negative values at zero and saturates at `f64::MAX`. NaN maps to zero, so the result
/// is always finite and non-negative.
#[must_use]
pub fn clamp_nonnegative(x: f64) -> f64 {
    // `f64::max` returns the non-NaN operand.
    x.max(0.0).min(f64::MAX)
}
