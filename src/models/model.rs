//! Rate model evaluation.
//!
//! The fitter relies on three primitive operations per model kind:
//! - evaluate the expected count at a sample index (the model function)
//! - produce a heuristic starting point from the observations
//! - declare per-parameter bounds
//!
//! These are implemented here for each model kind.

use std::f64::consts::PI;

use crate::domain::{Bound, ModelKind, RateFn};

/// Floor for the heuristic rate guess so a zero first observation does not
/// start the minimizer on a zero rate.
const MIN_INITIAL_RATE: f64 = 0.5;

/// Lower bound on the level parameter `A`. Every built-in rate is exactly
/// zero somewhere at `A = 0`, so the bound stays strictly above it.
pub const MIN_LEVEL: f64 = 1e-10;

/// Starting value for the oscillating model's shape parameter `B`.
const INITIAL_SHAPE: f64 = 0.1;

/// `rate = A`.
pub fn constant_rate(params: &[f64], _n: usize) -> f64 {
    params[0]
}

/// `rate = A + n`.
pub fn linear_rate(params: &[f64], n: usize) -> f64 {
    params[0] + n as f64
}

/// `rate = A + sqrt(A)·sin(sqrt(B·n·π)) + sqrt(n)`.
pub fn oscillating_rate(params: &[f64], n: usize) -> f64 {
    let a = params[0];
    let b = params[1];
    let n = n as f64;
    a + a.sqrt() * (b * n * PI).sqrt().sin() + n.sqrt()
}

/// Model function for the given kind.
pub fn rate_fn(model: ModelKind) -> RateFn {
    match model {
        ModelKind::Constant => constant_rate,
        ModelKind::Linear => linear_rate,
        ModelKind::Oscillating => oscillating_rate,
    }
}

/// Evaluate the expected count at index `n`.
///
/// # Panics
/// Panics if `params` is shorter than `model.param_count()`.
pub fn rate(model: ModelKind, params: &[f64], n: usize) -> f64 {
    rate_fn(model)(params, n)
}

/// Expected counts for `n = 0..count`.
pub fn rates(model: ModelKind, params: &[f64], count: usize) -> Vec<f64> {
    let f = rate_fn(model);
    (0..count).map(|n| f(params, n)).collect()
}

/// Heuristic starting point: the first observation for the level parameter
/// and a small positive constant for the shape parameter.
pub fn initial_guess(model: ModelKind, observations: &[u64]) -> Vec<f64> {
    let level = observations
        .first()
        .map(|&x| x as f64)
        .unwrap_or(MIN_INITIAL_RATE)
        .max(MIN_INITIAL_RATE);
    match model {
        ModelKind::Constant | ModelKind::Linear => vec![level],
        ModelKind::Oscillating => vec![level, INITIAL_SHAPE],
    }
}

/// `A >= MIN_LEVEL`, `B >= 0`; nothing is bounded above.
pub fn default_bounds(model: ModelKind) -> Vec<Bound> {
    let level = Bound::new(MIN_LEVEL, None);
    match model {
        ModelKind::Constant | ModelKind::Linear => vec![level],
        ModelKind::Oscillating => vec![level, Bound::non_negative()],
    }
}
