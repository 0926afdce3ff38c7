//! Reporting utilities: residuals, fit summaries, and formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized

use crate::data::SampleData;
use crate::domain::{ExperimentConfig, FitOutcome, ResidualRow};
use crate::error::AppError;
use crate::fit::{PoissonObjective, ReplicateSummary};

/// Compute fitted rates and residuals (`observed - fitted`) for each index.
pub fn compute_residuals(
    sample: &SampleData,
    objective: &PoissonObjective,
    fit: &FitOutcome,
) -> Result<Vec<ResidualRow>, AppError> {
    let fitted = objective.rates(&fit.params)?;
    if fitted.iter().any(|v| !v.is_finite()) {
        return Err(AppError::new(4, "Non-finite model rate during residual computation."));
    }

    Ok(sample
        .observations
        .iter()
        .zip(sample.true_rates.iter())
        .zip(fitted)
        .enumerate()
        .map(|(index, ((&observed, &true_rate), fitted_rate))| ResidualRow {
            index,
            observed,
            true_rate,
            fitted_rate,
            residual: observed as f64 - fitted_rate,
        })
        .collect())
}

/// Format the full run summary (sample stats + parameter comparison + objective).
pub fn format_run_summary(
    config: &ExperimentConfig,
    sample: &SampleData,
    fit: &FitOutcome,
    standard_errors: &[Option<f64>],
    true_objective: Option<f64>,
) -> String {
    let mut out = String::new();

    out.push_str("=== mle - Poisson Maximum Likelihood Fit ===\n");
    out.push_str(&format!("Model: {}\n", config.model.display_name()));
    out.push_str(&format!(
        "Sample: n={} | seed={} | x=[{}, {}] | mean={:.3} | zeros={}\n",
        sample.stats.n_points,
        config.seed,
        sample.stats.x_min,
        sample.stats.x_max,
        sample.stats.x_mean,
        sample.stats.zero_count,
    ));
    out.push('\n');

    for (i, name) in config.model.param_names().iter().enumerate() {
        let truth = config.true_params.get(i).copied().unwrap_or(f64::NAN);
        let est = fit.params.get(i).copied().unwrap_or(f64::NAN);
        let se = match standard_errors.get(i).copied().flatten() {
            Some(s) => format!(" (± {})", fmt_num(s)),
            None => String::new(),
        };
        out.push_str(&format!(
            "True {name}: {}, Best fit {name}: {}{se}\n",
            fmt_num(truth),
            fmt_num(est)
        ));
    }

    out.push_str("\nObjective (NLL without ln x!):\n");
    out.push_str(&format!("- initial guess {}: {:.6}\n", fmt_vec(&fit.initial_guess), fit.initial_objective));
    out.push_str(&format!("- best fit           : {:.6}\n", fit.objective));
    if let Some(v) = true_objective {
        out.push_str(&format!("- true parameters    : {v:.6}\n"));
    }
    out.push_str(&format!(
        "Status: {} ({} evaluations)\n",
        fit.status, fit.evaluations
    ));

    out
}

/// Format the first `limit` residual rows as a table.
pub fn format_residuals(rows: &[ResidualRow], limit: usize) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:>6} {:>10} {:>12} {:>12} {:>12}",
            "n", "observed", "true_rate", "fitted", "residual"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<6} {:-<10} {:-<12} {:-<12} {:-<12}", "", "", "", "", "").trim_end());
    out.push('\n');

    for r in rows.iter().take(limit) {
        out.push_str(&format!(
            "{:>6} {:>10} {:>12.3} {:>12.3} {:>12.3}\n",
            r.index, r.observed, r.true_rate, r.fitted_rate, r.residual
        ));
    }
    if rows.len() > limit {
        out.push_str(&format!("... ({} more rows)\n", rows.len() - limit));
    }

    out
}

/// Format a replicate study summary.
pub fn format_replicates(config: &ExperimentConfig, summary: &ReplicateSummary) -> String {
    let mut out = String::new();

    out.push_str("=== mle - Replicate Study ===\n");
    out.push_str(&format!("Model: {}\n", config.model.display_name()));
    out.push_str(&format!(
        "Replicates: {} (seeds {}..={}) | n={} | converged={}\n\n",
        summary.replicates.len(),
        config.seed,
        config.seed.wrapping_add(summary.replicates.len().saturating_sub(1) as u64),
        config.sample_count,
        summary.converged,
    ));

    out.push_str(&format!(
        "{:<6} {:>12} {:>12} {:>12} {:>12}\n",
        "param", "truth", "mean", "std", "bias"
    ));
    out.push_str(&format!("{:-<6} {:-<12} {:-<12} {:-<12} {:-<12}\n", "", "", "", "", ""));
    for p in &summary.params {
        out.push_str(&format!(
            "{:<6} {:>12} {:>12} {:>12} {:>12}\n",
            p.name,
            fmt_num(p.truth),
            fmt_num(p.mean),
            fmt_num(p.std_dev),
            fmt_num(p.bias),
        ));
    }

    out
}

/// Short numeric format: 4 significant-ish decimals, trailing zeros trimmed.
pub fn fmt_num(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let s = format!("{v:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| fmt_num(*x)).collect();
    format!("[{}]", parts.join(", "))
}
