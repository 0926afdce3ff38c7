//! Shared "fit pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! sample generation -> objective -> fit -> standard errors -> residuals
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::data::{SampleData, generate_sample};
use crate::domain::{ExperimentConfig, FitOutcome, ResidualRow};
use crate::error::AppError;
use crate::fit::{FitOptions, PoissonObjective, fit_model, standard_errors};

/// All computed outputs of a single `mle fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub sample: SampleData,
    pub objective: PoissonObjective,
    pub fit: FitOutcome,
    pub standard_errors: Vec<Option<f64>>,
    pub residuals: Vec<ResidualRow>,
    /// Objective at the generating parameters.
    pub true_objective: Option<f64>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &ExperimentConfig) -> Result<RunOutput, AppError> {
    // 1) Synthetic observations.
    let sample = generate_sample(config)?;
    tracing::info!(
        model = ?config.model,
        n = sample.stats.n_points,
        seed = config.seed,
        "generated sample"
    );

    // 2) Fit.
    let opts = FitOptions {
        max_evals: config.max_evals,
        ..FitOptions::default()
    };
    let (objective, fit) = fit_model(
        config.model,
        sample.observations.clone(),
        config.initial_guess.as_deref(),
        &opts,
    )?;
    tracing::info!(
        params = ?fit.params,
        objective = fit.objective,
        converged = fit.converged,
        "fit finished"
    );

    // 3) Diagnostics around the fit.
    let standard_errors = standard_errors(&objective, &fit.params);
    let residuals = crate::report::compute_residuals(&sample, &objective, &fit)?;
    let true_objective = objective.value(&config.true_params).ok();

    Ok(RunOutput {
        sample,
        objective,
        fit,
        standard_errors,
        residuals,
        true_objective,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    #[test]
    fn linear_example_runs_end_to_end() {
        let config = ExperimentConfig::example(ModelKind::Linear, 42);
        let run = run_fit(&config).unwrap();

        assert_eq!(run.residuals.len(), 10);
        assert_eq!(run.standard_errors.len(), 1);
        assert!(run.fit.params[0] >= 0.0);
        assert!(run.fit.objective <= run.fit.initial_objective + 1e-9);
        assert!(run.true_objective.is_some());
    }

    #[test]
    fn wrong_guess_length_is_a_usage_error() {
        let mut config = ExperimentConfig::example(ModelKind::Oscillating, 1);
        config.initial_guess = Some(vec![1.0]);
        assert_eq!(run_fit(&config).unwrap_err().exit_code(), 2);
    }
}
