//! `ln(k!)` for Poisson normalization.
//!
//! Small arguments are summed exactly; large ones use the Stirling series for
//! `ln Γ(k + 1)`, which is accurate to well below 1e-10 past the cutoff.

use std::f64::consts::PI;

const EXACT_CUTOFF: u64 = 256;

/// Natural log of `k!`.
pub fn ln_factorial(k: u64) -> f64 {
    if k < 2 {
        return 0.0;
    }
    if k <= EXACT_CUTOFF {
        return (2..=k).map(|i| (i as f64).ln()).sum();
    }
    let x = k as f64;
    let inv = 1.0 / x;
    let inv3 = inv * inv * inv;
    x * x.ln() - x + 0.5 * (2.0 * PI * x).ln() + inv / 12.0 - inv3 / 360.0 + inv3 * inv * inv / 1260.0
}
