//! Poisson negative-log-likelihood objective.
//!
//! For observations `x[n]` and a model function `f(θ, n)`:
//!
//! ```text
//! L(θ) = Σ_n [ f(θ, n) − x[n]·ln f(θ, n) ]
//! ```
//!
//! This is `−ln p(x | θ)` up to the constant `Σ ln(x[n]!)`, which does not move
//! the minimizer. [`PoissonObjective::full_value`] adds it back for callers that
//! compare absolute likelihoods across datasets.
//!
//! A zero observation still contributes its rate; its log term is `0·ln(rate)`,
//! which is exactly zero for any positive finite rate.

use crate::domain::{ModelKind, RateFn};
use crate::error::FitError;
use crate::math::ln_factorial;
use crate::models::rate_fn;

/// Objective closure over a fixed observation sequence.
///
/// Holds only immutable data, so it may be evaluated concurrently.
#[derive(Debug, Clone)]
pub struct PoissonObjective {
    observations: Vec<u64>,
    rate: RateFn,
    /// Parameter vector length the model function reads; unchecked when `None`.
    param_count: Option<usize>,
    log_normalizer: f64,
}

impl PoissonObjective {
    /// Build the objective for `observations` under the model function `rate`.
    ///
    /// # Errors
    /// [`FitError::EmptyObservations`] if `observations` is empty.
    pub fn new(observations: Vec<u64>, rate: RateFn) -> Result<Self, FitError> {
        if observations.is_empty() {
            return Err(FitError::EmptyObservations);
        }
        let log_normalizer = observations.iter().map(|&x| ln_factorial(x)).sum();
        Ok(Self {
            observations,
            rate,
            param_count: None,
            log_normalizer,
        })
    }

    /// Objective for a built-in model, with its parameter count enforced.
    pub fn for_model(observations: Vec<u64>, model: ModelKind) -> Result<Self, FitError> {
        Ok(Self::new(observations, rate_fn(model))?.with_param_count(model.param_count()))
    }

    /// Reject parameter vectors whose length is not `count`.
    pub fn with_param_count(mut self, count: usize) -> Self {
        self.param_count = Some(count);
        self
    }

    pub fn param_count(&self) -> Option<usize> {
        self.param_count
    }

    fn check_len(&self, params: &[f64]) -> Result<(), FitError> {
        match self.param_count {
            Some(expected) if params.len() != expected => Err(FitError::LengthMismatch {
                what: "parameters",
                expected,
                got: params.len(),
            }),
            _ => Ok(()),
        }
    }

    pub fn observations(&self) -> &[u64] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn rate_fn(&self) -> RateFn {
        self.rate
    }

    /// Model rates at every sample index.
    ///
    /// # Errors
    /// [`FitError::NonPositiveRate`] for the first index whose rate is not a
    /// positive finite number.
    pub fn rates(&self, params: &[f64]) -> Result<Vec<f64>, FitError> {
        self.check_len(params)?;
        (0..self.observations.len())
            .map(|n| checked_rate(self.rate, params, n))
            .collect()
    }

    /// `L(θ)` without the `ln(x!)` constant.
    ///
    /// # Errors
    /// - [`FitError::LengthMismatch`] if a parameter count is set and `params`
    ///   has a different length
    /// - [`FitError::NonPositiveRate`] if any rate is `<= 0` or non-finite; the
    ///   log is undefined there and the evaluation is not recovered
    pub fn value(&self, params: &[f64]) -> Result<f64, FitError> {
        self.check_len(params)?;
        let mut total = 0.0;
        for (n, &x) in self.observations.iter().enumerate() {
            let r = checked_rate(self.rate, params, n)?;
            total += r - x as f64 * r.ln();
        }
        Ok(total)
    }

    /// True negative log-likelihood `L(θ) + Σ ln(x[n]!)`.
    pub fn full_value(&self, params: &[f64]) -> Result<f64, FitError> {
        Ok(self.value(params)? + self.log_normalizer)
    }
}

fn checked_rate(rate: RateFn, params: &[f64], n: usize) -> Result<f64, FitError> {
    let r = rate(params, n);
    if r.is_finite() && r > 0.0 {
        Ok(r)
    } else {
        Err(FitError::NonPositiveRate { index: n, rate: r })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;
    use crate::models::{linear_rate, oscillating_rate, rate_fn};

    #[test]
    fn empty_observations_rejected() {
        let err = PoissonObjective::new(Vec::new(), linear_rate).unwrap_err();
        assert_eq!(err, FitError::EmptyObservations);
    }

    #[test]
    fn value_matches_hand_computation() {
        let obj = PoissonObjective::new(vec![2, 0, 3], linear_rate).unwrap();
        let a: f64 = 1.5;
        let expected = (a - 2.0 * a.ln()) + (a + 1.0) + ((a + 2.0) - 3.0 * (a + 2.0).ln());
        assert!((obj.value(&[a]).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_observation_contributes_only_its_rate() {
        let with_zero = PoissonObjective::new(vec![0], linear_rate).unwrap();
        assert!((with_zero.value(&[7.25]).unwrap() - 7.25).abs() < 1e-12);
    }

    #[test]
    fn non_positive_rate_is_a_domain_error() {
        let obj = PoissonObjective::new(vec![1, 2, 3], linear_rate).unwrap();
        let err = obj.value(&[0.0]).unwrap_err();
        assert_eq!(err, FitError::NonPositiveRate { index: 0, rate: 0.0 });

        let err = obj.value(&[-1.5]).unwrap_err();
        assert!(matches!(err, FitError::NonPositiveRate { index: 0, .. }));
    }

    #[test]
    fn nan_rate_is_a_domain_error() {
        // Negative B puts a negative number under the square root.
        let obj = PoissonObjective::new(vec![800, 810], oscillating_rate).unwrap();
        let err = obj.value(&[800.0, -1.0]).unwrap_err();
        assert!(matches!(err, FitError::NonPositiveRate { index: 1, .. }));
    }

    #[test]
    fn full_value_adds_log_factorials() {
        let obj = PoissonObjective::new(vec![3, 4], linear_rate).unwrap();
        let theta = [2.0];
        let diff = obj.full_value(&theta).unwrap() - obj.value(&theta).unwrap();
        assert!((diff - (6.0_f64.ln() + 24.0_f64.ln())).abs() < 1e-12);
    }

    #[test]
    fn full_value_is_a_probability() {
        // Single observation: exp(-NLL) is the Poisson pmf.
        let obj = PoissonObjective::new(vec![4], rate_fn(ModelKind::Constant)).unwrap();
        let lambda: f64 = 3.0;
        let pmf = (-obj.full_value(&[lambda]).unwrap()).exp();
        let expected = lambda.powi(4) * (-lambda).exp() / 24.0;
        assert!((pmf - expected).abs() < 1e-12);
    }

    #[test]
    fn objective_defined_on_bound_interior_for_both_examples() {
        let x: Vec<u64> = (0..100).map(|i| (i * 7 % 13) as u64).collect();
        let linear = PoissonObjective::new(x.clone(), linear_rate).unwrap();
        let osc = PoissonObjective::new(x, oscillating_rate).unwrap();

        for &a in &[1e-6, 1e-3, 0.5, 5.0, 800.0, 1e6] {
            assert!(linear.value(&[a]).unwrap().is_finite());
            for &b in &[1e-9, 0.07, 0.1, 3.0, 100.0] {
                assert!(osc.value(&[a, b]).unwrap().is_finite(), "a={a} b={b}");
            }
        }
    }
}
