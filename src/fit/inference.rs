//! Standard errors from the observed information.
//!
//! The Hessian of `L` at the minimizer is the observed Fisher information; its
//! inverse approximates the covariance of the estimates. We approximate the
//! Hessian by finite differences and invert it with nalgebra.

use nalgebra::DMatrix;

use crate::fit::objective::PoissonObjective;
use crate::math::hessian;

/// Per-parameter standard errors at `params`.
///
/// An entry is `None` when the information matrix is singular, the variance is
/// not positive, or the Hessian stencil steps outside the model's domain.
pub fn standard_errors(objective: &PoissonObjective, params: &[f64]) -> Vec<Option<f64>> {
    let n = params.len();
    let none = vec![None; n];

    let h = match hessian(&|p: &[f64]| objective.value(p), params) {
        Ok(h) => h,
        Err(err) => {
            tracing::debug!(error = %err, "Hessian stencil left the model domain");
            return none;
        }
    };
    if h.iter().any(|v| !v.is_finite()) {
        return none;
    }

    let Some(cov) = DMatrix::from_row_slice(n, n, &h).try_inverse() else {
        return none;
    };

    (0..n)
        .map(|i| {
            let var = cov[(i, i)];
            if var.is_finite() && var > 0.0 {
                Some(var.sqrt())
            } else {
                None
            }
        })
        .collect()
}
