//! Command-line parsing for the Poisson MLE fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ModelKind;
use crate::fit::DEFAULT_MAX_EVALS;
use crate::image::Colormap;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mle", version, about = "Poisson Maximum Likelihood Fitter")]
pub struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a Poisson sample, fit the model by maximum likelihood, and report.
    Fit(FitArgs),
    /// Repeat generate-and-fit over consecutive seeds and summarize the estimates.
    Replicate(ReplicateArgs),
    /// Plot a previously exported fit JSON.
    Plot(PlotArgs),
    /// Display 2D numeric arrays as images in the terminal.
    Show(ShowArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying fit pipeline as `mle fit`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Common options for generating and fitting a sample.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Rate model to generate from and fit.
    #[arg(short = 'm', long, value_enum, default_value_t = ModelKind::Linear)]
    pub model: ModelKind,

    /// Generating parameters, comma separated (default: the model's worked example).
    #[arg(long = "true-params", value_delimiter = ',', allow_hyphen_values = true)]
    pub true_params: Option<Vec<f64>>,

    /// Number of observations (default: the model's worked example).
    #[arg(short = 'n', long, env = "MLE_SAMPLES")]
    pub sample_count: Option<usize>,

    /// Random seed for sample generation.
    #[arg(long, env = "MLE_SEED", default_value_t = 42)]
    pub seed: u64,

    /// Starting point for the minimizer, comma separated (default: first observation, B=0.1).
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub guess: Option<Vec<f64>>,

    /// Objective evaluation budget for the minimizer.
    #[arg(long, default_value_t = DEFAULT_MAX_EVALS)]
    pub max_evals: usize,

    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Residual rows to print.
    #[arg(long, default_value_t = 10)]
    pub rows: usize,

    /// Export per-index results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fit (model + params + rate grid) to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,

    /// Write a markdown debug bundle (config, data, fit, profile scans) to ./debug/.
    #[arg(long)]
    pub debug: bool,
}

/// Options for a replicate study.
#[derive(Debug, Args, Clone)]
pub struct ReplicateArgs {
    #[command(flatten)]
    pub fit: FitArgs,

    /// Number of replicates (seeds seed, seed+1, ...).
    #[arg(long, default_value_t = 200)]
    pub count: usize,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `mle fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for displaying images.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Matrix files (one row per line). Prompts for a file when omitted.
    pub files: Vec<PathBuf>,

    /// Show an intensity histogram beside a single image.
    #[arg(long)]
    pub hist: bool,

    /// Histogram bin count.
    #[arg(long)]
    pub nbins: Option<usize>,

    /// Histogram bin width (takes precedence over --nbins).
    #[arg(long)]
    pub bin_width: Option<f64>,

    /// Colour map.
    #[arg(long, value_enum, default_value_t = Colormap::Gray)]
    pub cmap: Colormap,

    /// Lower display limit (default: image minimum).
    #[arg(long, allow_hyphen_values = true)]
    pub vmin: Option<f64>,

    /// Upper display limit (default: image maximum).
    #[arg(long, allow_hyphen_values = true)]
    pub vmax: Option<f64>,

    /// Title; give once for all panels or once per file.
    #[arg(long = "title")]
    pub titles: Vec<String>,

    /// Panel width (columns).
    #[arg(long, default_value_t = 32)]
    pub width: usize,

    /// Panel height (rows).
    #[arg(long, default_value_t = 16)]
    pub height: usize,

    /// Emit 24-bit colour blocks instead of ASCII characters.
    #[arg(long)]
    pub color: bool,
}
