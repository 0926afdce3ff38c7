//! End-to-end checks through the public library API.

use poisson_mle::app::pipeline::run_fit;
use poisson_mle::data::generate_sample;
use poisson_mle::domain::{ExperimentConfig, ModelKind};
use poisson_mle::fit::{FitOptions, PoissonObjective, fit};
use poisson_mle::models::{default_bounds, rate_fn};

fn tight() -> FitOptions {
    FitOptions {
        factr: 10.0,
        pgtol: 1e-9,
        ..FitOptions::default()
    }
}

#[test]
fn large_sample_fit_beats_truth_by_a_little() {
    let mut config = ExperimentConfig::example(ModelKind::Linear, 7);
    config.sample_count = 1_000;
    let sample = generate_sample(&config).unwrap();

    let objective = PoissonObjective::new(sample.observations.clone(), rate_fn(ModelKind::Linear)).unwrap();
    let outcome = fit(&objective, &[sample.observations[0] as f64], &default_bounds(ModelKind::Linear), &tight()).unwrap();

    let at_truth = objective.value(&config.true_params).unwrap();
    let diff = at_truth - outcome.objective;
    // twice this difference is asymptotically chi-squared with one degree of freedom
    assert!(diff >= -1e-6, "fit worse than truth: diff={diff}");
    assert!(diff < 10.0, "diff={diff}");
    assert!((outcome.params[0] - 5.0).abs() < 2.0, "A={}", outcome.params[0]);
}

#[test]
fn oscillating_example_improves_on_its_start() {
    let config = ExperimentConfig::example(ModelKind::Oscillating, 42);
    let run = run_fit(&config).unwrap();

    assert_eq!(run.fit.params.len(), 2);
    assert!(run.fit.params.iter().all(|p| p.is_finite() && *p >= 0.0));
    assert!(run.fit.objective <= run.fit.initial_objective);
    assert!((run.fit.params[0] - 800.0).abs() < 60.0, "A={}", run.fit.params[0]);
    assert_eq!(run.residuals.len(), 100);
}

#[test]
fn same_config_same_answer() {
    let config = ExperimentConfig::example(ModelKind::Oscillating, 11);
    let a = run_fit(&config).unwrap();
    let b = run_fit(&config).unwrap();
    assert_eq!(a.fit, b.fit);
    assert_eq!(a.standard_errors, b.standard_errors);
}

#[test]
fn full_nll_differs_by_the_log_factorials() {
    let config = ExperimentConfig::example(ModelKind::Linear, 3);
    let run = run_fit(&config).unwrap();
    let full = run.objective.full_value(&run.fit.params).unwrap();
    let ln_fact: f64 = run
        .sample
        .observations
        .iter()
        .map(|&x| (1..=x).map(|k| (k as f64).ln()).sum::<f64>())
        .sum();
    assert!((full - run.fit.objective - ln_fact).abs() < 1e-9 * ln_fact.max(1.0));
}
