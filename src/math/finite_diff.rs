//! Finite-difference derivatives of a scalar objective.
//!
//! The minimizer needs a gradient and the standard-error pass needs a Hessian.
//! Neither of the built-in objectives ships analytic derivatives, so both are
//! approximated here.
//!
//! Step choices:
//! - gradient: central differences with `h = ε^(1/3)·max(1, |x|)` in the
//!   interior; one-sided with `h = ε^(1/2)·max(1, |x|)` when the central stencil
//!   would leave the box (the objective may be undefined outside it)
//! - Hessian: second-order central stencils with `h = ε^(1/4)·max(1, |x|)`
//!
//! Evaluation errors are propagated, never replaced by a placeholder value.

use crate::domain::Bound;

fn central_step(x: f64) -> f64 {
    f64::EPSILON.cbrt() * x.abs().max(1.0)
}

fn one_sided_step(x: f64) -> f64 {
    f64::EPSILON.sqrt() * x.abs().max(1.0)
}

fn hessian_step(x: f64) -> f64 {
    f64::EPSILON.powf(0.25) * x.abs().max(1.0)
}

/// Gradient of `f` at `x`, respecting `bounds`.
///
/// `fx` must be `f(x)`; it is reused by the one-sided stencils.
///
/// # Errors
/// Returns the first error produced by `f`.
pub fn gradient<F, E>(f: &F, x: &[f64], fx: f64, bounds: &[Bound]) -> Result<Vec<f64>, E>
where
    F: Fn(&[f64]) -> Result<f64, E>,
{
    let mut work = x.to_vec();
    let mut grad = vec![0.0; x.len()];

    for i in 0..x.len() {
        let xi = x[i];
        let bound = bounds.get(i).copied().unwrap_or(Bound::new(f64::NEG_INFINITY, None));

        let h = central_step(xi);
        if bound.contains(xi - h) && bound.contains(xi + h) {
            work[i] = xi + h;
            let f_plus = f(&work)?;
            work[i] = xi - h;
            let f_minus = f(&work)?;
            grad[i] = (f_plus - f_minus) / (2.0 * h);
        } else {
            let h = one_sided_step(xi);
            if bound.contains(xi + h) {
                work[i] = xi + h;
                grad[i] = (f(&work)? - fx) / h;
            } else {
                work[i] = xi - h;
                grad[i] = (fx - f(&work)?) / h;
            }
        }
        work[i] = xi;
    }

    Ok(grad)
}

/// Symmetric Hessian of `f` at `x` (row-major, `n × n`).
///
/// # Errors
/// Returns the first error produced by `f`.
pub fn hessian<F, E>(f: &F, x: &[f64]) -> Result<Vec<f64>, E>
where
    F: Fn(&[f64]) -> Result<f64, E>,
{
    let n = x.len();
    let fx = f(x)?;
    let steps: Vec<f64> = x.iter().map(|&v| hessian_step(v)).collect();
    let mut work = x.to_vec();
    let mut out = vec![0.0; n * n];

    for i in 0..n {
        let hi = steps[i];
        work[i] = x[i] + hi;
        let f_plus = f(&work)?;
        work[i] = x[i] - hi;
        let f_minus = f(&work)?;
        work[i] = x[i];
        out[i * n + i] = (f_plus - 2.0 * fx + f_minus) / (hi * hi);

        for j in (i + 1)..n {
            let hj = steps[j];
            let mut corner = |si: f64, sj: f64| -> Result<f64, E> {
                work[i] = x[i] + si * hi;
                work[j] = x[j] + sj * hj;
                let v = f(&work);
                work[i] = x[i];
                work[j] = x[j];
                v
            };
            let fpp = corner(1.0, 1.0)?;
            let fpm = corner(1.0, -1.0)?;
            let fmp = corner(-1.0, 1.0)?;
            let fmm = corner(-1.0, -1.0)?;
            let hij = (fpp - fpm - fmp + fmm) / (4.0 * hi * hj);
            out[i * n + j] = hij;
            out[j * n + i] = hij;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &[f64]) -> Result<f64, ()> {
        // f = 3a² + ab + 2b² - a
        Ok(3.0 * x[0] * x[0] + x[0] * x[1] + 2.0 * x[1] * x[1] - x[0])
    }

    #[test]
    fn gradient_matches_analytic_quadratic() {
        let x = [1.5, -0.5];
        let fx = quadratic(&x).unwrap();
        let bounds = [Bound::new(-10.0, None), Bound::new(-10.0, Some(10.0))];
        let g = gradient(&quadratic, &x, fx, &bounds).unwrap();
        assert!((g[0] - (6.0 * 1.5 - 0.5 - 1.0)).abs() < 1e-6, "g0={}", g[0]);
        assert!((g[1] - (1.5 + 4.0 * -0.5)).abs() < 1e-6, "g1={}", g[1]);
    }

    #[test]
    fn gradient_stays_inside_lower_bound() {
        // ln(x) is undefined below zero; at the bound the stencil must be forward.
        let f = |x: &[f64]| -> Result<f64, String> {
            if x[0] < 0.0 {
                Err(format!("evaluated outside bounds at {}", x[0]))
            } else {
                Ok((x[0] + 1.0).ln())
            }
        };
        let x = [0.0];
        let fx = f(&x).unwrap();
        let g = gradient(&f, &x, fx, &[Bound::non_negative()]).unwrap();
        assert!((g[0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn gradient_propagates_errors() {
        let f = |_: &[f64]| -> Result<f64, &'static str> { Err("boom") };
        let err = gradient(&f, &[1.0], 0.0, &[Bound::non_negative()]).unwrap_err();
        assert_eq!(err, "boom");
    }

    #[test]
    fn hessian_matches_analytic_quadratic() {
        let h = hessian(&quadratic, &[0.3, 0.7]).unwrap();
        let expected = [6.0, 1.0, 1.0, 4.0];
        for (got, want) in h.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-4, "got {got}, want {want}");
        }
    }
}
