//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Model function contract: `(params, sample index) -> expected rate`.
///
/// Rates must be strictly positive for every index and every parameter vector
/// reachable within the declared bounds.
pub type RateFn = fn(&[f64], usize) -> f64;

/// Built-in rate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    /// `rate = A`.
    Constant,
    /// `rate = A + n`.
    Linear,
    /// `rate = A + sqrt(A)·sin(sqrt(B·n·π)) + sqrt(n)`.
    Oscillating,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Constant, ModelKind::Linear, ModelKind::Oscillating];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelKind::Constant => "constant (A)",
            ModelKind::Linear => "linear (A + n)",
            ModelKind::Oscillating => "oscillating (A, B)",
        }
    }

    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Constant | ModelKind::Linear => &["A"],
            ModelKind::Oscillating => &["A", "B"],
        }
    }

    pub fn param_count(self) -> usize {
        self.param_names().len()
    }

    /// Generating parameters used when none are given on the command line.
    pub fn default_true_params(self) -> Vec<f64> {
        match self {
            ModelKind::Constant => vec![5.0],
            ModelKind::Linear => vec![5.0],
            ModelKind::Oscillating => vec![800.0, 0.07],
        }
    }

    pub fn default_sample_count(self) -> usize {
        match self {
            ModelKind::Constant | ModelKind::Linear => 10,
            ModelKind::Oscillating => 100,
        }
    }

    pub fn next(self) -> Self {
        match self {
            ModelKind::Constant => ModelKind::Linear,
            ModelKind::Linear => ModelKind::Oscillating,
            ModelKind::Oscillating => ModelKind::Constant,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            ModelKind::Constant => ModelKind::Oscillating,
            ModelKind::Linear => ModelKind::Constant,
            ModelKind::Oscillating => ModelKind::Linear,
        }
    }
}

/// Per-parameter box constraint `lower <= θ <= upper`.
///
/// `upper = None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub lower: f64,
    pub upper: Option<f64>,
}

impl Bound {
    pub fn new(lower: f64, upper: Option<f64>) -> Self {
        Self { lower, upper }
    }

    /// `[0, ∞)`.
    pub fn non_negative() -> Self {
        Self::new(0.0, None)
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let v = value.max(self.lower);
        match self.upper {
            Some(u) => v.min(u),
            None => v,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && self.upper.is_none_or(|u| value <= u)
    }
}

/// Summary statistics of an observation sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub n_points: usize,
    pub x_min: u64,
    pub x_max: u64,
    pub x_mean: f64,
    pub zero_count: usize,
}

/// Minimizer output for one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOutcome {
    /// Minimizing parameter vector.
    pub params: Vec<f64>,
    /// Objective value at `params`.
    pub objective: f64,
    /// Initial guess after clamping into the bounds.
    pub initial_guess: Vec<f64>,
    /// Objective value at `initial_guess`.
    pub initial_objective: f64,
    pub converged: bool,
    pub status: String,
    /// Objective evaluations spent by the minimizer (gradient stencils included).
    pub evaluations: usize,
}

/// Per-index fitted value (used for tables and exports).
#[derive(Debug, Clone, PartialEq)]
pub struct ResidualRow {
    pub index: usize,
    pub observed: u64,
    pub true_rate: f64,
    pub fitted_rate: f64,
    pub residual: f64,
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub model: ModelKind,
    pub true_params: Vec<f64>,
    pub sample_count: usize,
    pub seed: u64,
    /// Explicit starting point; `None` uses the model's heuristic guess.
    pub initial_guess: Option<Vec<f64>>,
    pub max_evals: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub residual_rows: usize,

    pub export_results: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    pub debug_bundle: bool,
}

impl ExperimentConfig {
    /// The worked example for a model kind: its generating parameters and sample size.
    pub fn example(model: ModelKind, seed: u64) -> Self {
        Self {
            model,
            true_params: model.default_true_params(),
            sample_count: model.default_sample_count(),
            seed,
            initial_guess: None,
            max_evals: crate::fit::DEFAULT_MAX_EVALS,
            plot: true,
            plot_width: 100,
            plot_height: 25,
            residual_rows: 10,
            export_results: None,
            export_fit: None,
            debug_bundle: false,
        }
    }
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub model: ModelKind,
    pub param_names: Vec<String>,
    pub true_params: Vec<f64>,
    pub seed: u64,
    pub fit: FitOutcome,
    pub standard_errors: Vec<Option<f64>>,
    pub observations: Vec<u64>,
    pub grid: RateGrid,
}

/// Fitted and generating rates at each sample index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateGrid {
    pub index: Vec<usize>,
    pub fitted: Vec<f64>,
    pub truth: Vec<f64>,
}
