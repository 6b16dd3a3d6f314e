//! Centralized numeric tolerance for the fire model.
//!
//! The ignition-path simulator compares geometric and thermal quantities
//! that accumulate floating-point error over many time steps; every such
//! comparison in the crate goes through this module instead of a raw
//! `==` or `<`.

/// Absolute tolerance used throughout the model for "close enough to zero"
/// and "close enough to equal" comparisons.
pub const EPSILON: f64 = 1e-9;

/// True if `value` is within [`EPSILON`] of zero.
#[inline]
#[must_use]
pub fn almost_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// True if `a` is strictly greater than `b` by more than [`EPSILON`].
#[inline]
#[must_use]
pub fn gt(a: f64, b: f64) -> bool {
    a - b > EPSILON
}

/// True if `a` and `b` differ by more than [`EPSILON`].
#[inline]
#[must_use]
pub fn distinct_from(a: f64, b: f64) -> bool {
    (a - b).abs() > EPSILON
}
