//! Likelihood fitting.
//!
//! Responsibilities:
//!
//! - build the Poisson negative-log-likelihood objective
//! - minimize it under per-parameter bounds (L-BFGS-B)
//! - standard errors, profile scans, and replicate studies around a fit

pub mod fitter;
pub mod inference;
pub mod objective;
pub mod profile;
pub mod replicate;

pub use fitter::*;
pub use inference::*;
pub use objective::*;
pub use profile::*;
pub use replicate::*;

use crate::domain::{FitOutcome, ModelKind};
use crate::error::FitError;
use crate::models::{default_bounds, initial_guess};

/// Fit a built-in model to `observations` with its default bounds.
///
/// `guess = None` uses the model's heuristic starting point.
pub fn fit_model(
    model: ModelKind,
    observations: Vec<u64>,
    guess: Option<&[f64]>,
    opts: &FitOptions,
) -> Result<(PoissonObjective, FitOutcome), FitError> {
    let objective = PoissonObjective::for_model(observations, model)?;
    let x0 = match guess {
        Some(g) => g.to_vec(),
        None => initial_guess(model, objective.observations()),
    };

    let outcome = fit(&objective, &x0, &default_bounds(model), opts)?;
    Ok((objective, outcome))
}
