//! Bounded minimization of a likelihood objective.
//!
//! Given:
//! - a [`PoissonObjective`] (observations + model function)
//! - an initial parameter guess
//! - one [`Bound`] per parameter
//!
//! we run L-BFGS-B on the objective, with gradients from finite differences,
//! and return a [`FitOutcome`].
//!
//! Failure policy:
//! - malformed inputs are rejected before the minimizer starts
//! - a domain error from any objective evaluation aborts the fit and is returned
//! - a minimizer that stops early (abnormal line search, evaluation budget) is
//!   *not* an error: the outcome carries `converged = false` and the caller
//!   decides whether the parameters are usable

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{Bound, FitOutcome};
use crate::error::FitError;
use crate::fit::objective::PoissonObjective;
use crate::math::gradient;

/// Default cap on objective evaluations (gradient stencils included).
pub const DEFAULT_MAX_EVALS: usize = 15_000;

/// Minimizer settings. Defaults follow the reference L-BFGS-B settings.
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Number of correction pairs kept by L-BFGS.
    pub memory: usize,
    /// Relative cost-reduction tolerance, in units of machine epsilon.
    pub factr: f64,
    /// Projected-gradient tolerance.
    pub pgtol: f64,
    pub max_evals: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            memory: 10,
            factr: 1e7,
            pgtol: 1e-5,
            max_evals: DEFAULT_MAX_EVALS,
        }
    }
}

/// Check inputs and return the starting point clamped into the bounds.
pub fn validate_inputs(
    objective: &PoissonObjective,
    initial_guess: &[f64],
    bounds: &[Bound],
) -> Result<Vec<f64>, FitError> {
    if objective.is_empty() {
        return Err(FitError::EmptyObservations);
    }
    if initial_guess.is_empty() {
        return Err(FitError::LengthMismatch {
            what: "initial guess",
            expected: bounds.len().max(1),
            got: 0,
        });
    }
    if let Some(expected) = objective.param_count() {
        check_param_count(expected, initial_guess)?;
    }
    if bounds.len() != initial_guess.len() {
        return Err(FitError::LengthMismatch {
            what: "bounds",
            expected: initial_guess.len(),
            got: bounds.len(),
        });
    }

    for (index, b) in bounds.iter().enumerate() {
        let upper_ok = b.upper.is_none_or(|u| !u.is_nan() && u >= b.lower);
        if !b.lower.is_finite() || !upper_ok {
            return Err(FitError::InvalidBounds {
                index,
                lower: b.lower,
                upper: b.upper,
            });
        }
    }

    initial_guess
        .iter()
        .zip(bounds)
        .enumerate()
        .map(|(index, (&value, b))| {
            if value.is_finite() {
                Ok(b.clamp(value))
            } else {
                Err(FitError::InvalidInitialGuess { index, value })
            }
        })
        .collect()
}

/// Check that the parameter count matches what the model expects.
pub fn check_param_count(expected: usize, initial_guess: &[f64]) -> Result<(), FitError> {
    if initial_guess.len() == expected {
        Ok(())
    } else {
        Err(FitError::LengthMismatch {
            what: "parameters",
            expected,
            got: initial_guess.len(),
        })
    }
}

/// Minimize `objective` from `initial_guess` subject to `bounds`.
///
/// # Errors
/// - input validation errors (see [`validate_inputs`])
/// - [`FitError::NonPositiveRate`] raised by any objective evaluation
/// - [`FitError::Minimizer`] if the minimizer leaves non-finite parameters
pub fn fit(
    objective: &PoissonObjective,
    initial_guess: &[f64],
    bounds: &[Bound],
    opts: &FitOptions,
) -> Result<FitOutcome, FitError> {
    let x0 = validate_inputs(objective, initial_guess, bounds)?;
    let initial_objective = objective.value(&x0)?;

    tracing::debug!(
        x0 = ?x0,
        objective = initial_objective,
        n = objective.len(),
        "starting L-BFGS-B"
    );

    let evals = Arc::new(AtomicUsize::new(0));
    let hit_limit = Arc::new(AtomicBool::new(false));
    let failure: Arc<Mutex<Option<FitError>>> = Arc::new(Mutex::new(None));

    let evaluate = {
        let objective = objective.clone();
        let bounds = bounds.to_vec();
        let evals = Arc::clone(&evals);
        let hit_limit = Arc::clone(&hit_limit);
        let failure = Arc::clone(&failure);
        let max_evals = opts.max_evals;

        move |x: &[f64], g: &mut [f64]| -> anyhow::Result<f64> {
            let record = |err: FitError| -> anyhow::Error {
                let msg = err.to_string();
                if let Ok(mut slot) = failure.lock() {
                    slot.get_or_insert(err);
                }
                anyhow::anyhow!(msg)
            };

            let count = |k: usize| evals.fetch_add(k, Ordering::Relaxed);
            let fx = objective.value(x).map_err(record)?;
            count(1);

            // The solver has no iteration cap of its own; a zero gradient makes
            // it stop at the current point once the budget is spent.
            if evals.load(Ordering::Relaxed) >= max_evals {
                hit_limit.store(true, Ordering::Relaxed);
                g.iter_mut().for_each(|gi| *gi = 0.0);
                return Ok(fx);
            }

            let f = |p: &[f64]| {
                count(1);
                objective.value(p)
            };
            let grad = gradient(&f, x, fx, &bounds).map_err(record)?;
            g.copy_from_slice(&grad);
            Ok(fx)
        }
    };

    let param = lbfgsb::LbfgsbParameter {
        m: opts.memory,
        factr: opts.factr,
        pgtol: opts.pgtol,
        iprint: -1,
    };

    let mut problem = lbfgsb::LbfgsbProblem::build(x0.clone(), evaluate);
    problem.set_bounds(bounds.iter().map(|b| (Some(b.lower), b.upper)).collect::<Vec<_>>());

    let mut state = lbfgsb::LbfgsbState::new(problem, param);
    let run = state.minimize();

    if let Some(err) = failure.lock().ok().and_then(|mut slot| slot.take()) {
        tracing::debug!(error = %err, "objective evaluation failed");
        return Err(err);
    }

    let params = state.x().to_vec();
    if params.iter().any(|v| !v.is_finite()) {
        return Err(FitError::Minimizer(format!("non-finite parameters {params:?}")));
    }
    let value = objective.value(&params)?;

    let (converged, status) = match run {
        Ok(_) if hit_limit.load(Ordering::Relaxed) => (
            false,
            format!("stopped: evaluation budget of {} exhausted", opts.max_evals),
        ),
        Ok(_) => (true, "converged".to_string()),
        Err(e) => (false, format!("stopped: {e}")),
    };

    let evaluations = evals.load(Ordering::Relaxed);
    tracing::debug!(
        params = ?params,
        objective = value,
        converged,
        evaluations,
        "L-BFGS-B finished"
    );

    Ok(FitOutcome {
        params,
        objective: value,
        initial_guess: x0,
        initial_objective,
        converged,
        status,
        evaluations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;
    use crate::models::{default_bounds, linear_rate, rate_fn};

    const WORKED_EXAMPLE: [u64; 10] = [5, 6, 5, 7, 6, 5, 6, 7, 8, 7];

    fn tight() -> FitOptions {
        FitOptions {
            factr: 10.0,
            pgtol: 1e-9,
            ..FitOptions::default()
        }
    }

    /// Root of the linear model's score equation `Σ x[n]/(A+n) = N` by bisection.
    fn linear_score_root(x: &[u64]) -> f64 {
        let score = |a: f64| -> f64 {
            x.iter()
                .enumerate()
                .map(|(n, &xi)| xi as f64 / (a + n as f64))
                .sum::<f64>()
                - x.len() as f64
        };
        let (mut lo, mut hi) = (1e-9, 1e6);
        for _ in 0..200 {
            let mid = 0.5 * (lo + hi);
            if score(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }

    #[test]
    fn worked_example_improves_on_initial_guess() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let out = fit(&obj, &[5.0], &default_bounds(ModelKind::Linear), &FitOptions::default()).unwrap();

        let a = out.params[0];
        assert!(a.is_finite() && a >= 0.0);
        assert!(out.objective <= obj.value(&[5.0]).unwrap());
        assert_eq!(out.initial_guess, vec![5.0]);
    }

    #[test]
    fn linear_fit_solves_score_equation() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let out = fit(&obj, &[5.0], &default_bounds(ModelKind::Linear), &tight()).unwrap();

        let expected = linear_score_root(&WORKED_EXAMPLE);
        assert!(
            (out.params[0] - expected).abs() < 1e-4,
            "fit={} root={expected}",
            out.params[0]
        );
    }

    #[test]
    fn constant_fit_matches_sample_mean() {
        let x = vec![3, 0, 4, 7, 2, 5, 5, 1, 0, 6, 4, 3];
        let mean = x.iter().sum::<u64>() as f64 / x.len() as f64;
        let obj = PoissonObjective::new(x, rate_fn(ModelKind::Constant)).unwrap();
        let out = fit(&obj, &[3.0], &default_bounds(ModelKind::Constant), &tight()).unwrap();
        assert!((out.params[0] - mean).abs() < 1e-5, "fit={} mean={mean}", out.params[0]);
    }

    #[test]
    fn fit_is_idempotent() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let bounds = default_bounds(ModelKind::Linear);
        let a = fit(&obj, &[5.0], &bounds, &FitOptions::default()).unwrap();
        let b = fit(&obj, &[5.0], &bounds, &FitOptions::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn length_mismatch_rejected_before_minimizing() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let err = fit(&obj, &[5.0, 0.1], &default_bounds(ModelKind::Linear), &FitOptions::default())
            .unwrap_err();
        assert!(matches!(err, FitError::LengthMismatch { what: "bounds", .. }));

        let err = fit(&obj, &[], &[], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, FitError::LengthMismatch { .. }));
    }

    #[test]
    fn non_finite_guess_and_inverted_bounds_rejected() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let err = fit(&obj, &[f64::NAN], &default_bounds(ModelKind::Linear), &FitOptions::default())
            .unwrap_err();
        assert!(matches!(err, FitError::InvalidInitialGuess { index: 0, .. }));

        let err = fit(&obj, &[5.0], &[Bound::new(2.0, Some(1.0))], &FitOptions::default()).unwrap_err();
        assert!(matches!(err, FitError::InvalidBounds { index: 0, .. }));
    }

    #[test]
    fn domain_error_at_start_is_fatal() {
        // Bounds admit A = 0, where the linear rate at n = 0 is zero.
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let err = fit(&obj, &[0.0], &[Bound::non_negative()], &FitOptions::default()).unwrap_err();
        assert_eq!(err, FitError::NonPositiveRate { index: 0, rate: 0.0 });
    }

    #[test]
    fn short_guess_for_two_parameter_model_is_rejected() {
        let obj = PoissonObjective::for_model(WORKED_EXAMPLE.to_vec(), ModelKind::Oscillating).unwrap();
        let err = fit(&obj, &[5.0], &[Bound::non_negative()], &FitOptions::default()).unwrap_err();
        assert_eq!(
            err,
            FitError::LengthMismatch {
                what: "parameters",
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn initial_guess_clamped_into_bounds() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let bounds = [Bound::new(1.0, Some(4.0))];
        let out = fit(&obj, &[10.0], &bounds, &FitOptions::default()).unwrap();
        assert_eq!(out.initial_guess, vec![4.0]);
        assert!(out.params[0] >= 1.0 && out.params[0] <= 4.0);
    }

    #[test]
    fn evaluation_budget_reports_non_convergence() {
        let obj = PoissonObjective::new(WORKED_EXAMPLE.to_vec(), linear_rate).unwrap();
        let opts = FitOptions {
            max_evals: 1,
            ..FitOptions::default()
        };
        let out = fit(&obj, &[5.0], &default_bounds(ModelKind::Linear), &opts).unwrap();
        assert!(!out.converged);
        assert!(out.status.contains("budget"));
    }
}
