//! Debug bundle writer for inspecting a fit: inputs, outcome, and objective scans.

use std::fmt::Write as _;
use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::domain::{ExperimentConfig, ModelKind};
use crate::error::AppError;
use crate::fit::{FitOptions, fit_model, lin_space, profile_scan, scan_window};

/// Half-width of each profile scan, in standard errors.
const SCAN_WIDTH_SE: f64 = 4.0;
const SCAN_STEPS: usize = 21;

pub fn write_debug_bundle(config: &ExperimentConfig, run: &RunOutput) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), config, run)
}

pub fn write_debug_bundle_in(
    dir: &Path,
    config: &ExperimentConfig,
    run: &RunOutput,
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let model = format!("{:?}", config.model).to_lowercase();
    let path = dir.join(format!("mle_debug_{model}_seed{}_{ts}.md", config.seed));

    let body = render_bundle(config, run)?;

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;
    file.write_all(body.as_bytes())
        .map_err(|e| AppError::new(4, format!("Failed to write debug file: {e}")))?;

    tracing::info!(path = %path.display(), "wrote debug bundle");
    Ok(path)
}

fn render_bundle(config: &ExperimentConfig, run: &RunOutput) -> Result<String, AppError> {
    let mut out = String::new();
    push_bundle(&mut out, config, run)
        .map_err(|e| AppError::new(4, format!("Failed to format debug bundle: {e}")))?;
    Ok(out)
}

fn push_bundle(out: &mut String, config: &ExperimentConfig, run: &RunOutput) -> Result<(), DebugError> {
    let opts = FitOptions {
        max_evals: config.max_evals,
        ..FitOptions::default()
    };
    let fit = &run.fit;

    writeln!(out, "# mle debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- model: {}", config.model.display_name())?;
    writeln!(out, "- true_params: {}", fmt_vec(&config.true_params))?;
    writeln!(out, "- sample_count: {}", config.sample_count)?;
    writeln!(out, "- seed: {}", config.seed)?;
    writeln!(
        out,
        "- minimizer: L-BFGS-B m={}, factr={:e}, pgtol={:e}, max_evals={}",
        opts.memory, opts.factr, opts.pgtol, opts.max_evals
    )?;

    writeln!(out, "\n## Fit")?;
    writeln!(out, "| field | value |")?;
    writeln!(out, "| - | - |")?;
    writeln!(out, "| initial_guess | {} |", fmt_vec(&fit.initial_guess))?;
    writeln!(out, "| initial_objective | {:.6} |", fit.initial_objective)?;
    writeln!(out, "| params | {} |", fmt_vec(&fit.params))?;
    writeln!(out, "| standard_errors | {} |", fmt_opt_vec(&run.standard_errors))?;
    writeln!(out, "| objective | {:.6} |", fit.objective)?;
    writeln!(out, "| full_nll | {} |", fmt_opt(run.objective.full_value(&fit.params).ok()))?;
    writeln!(out, "| objective_at_truth | {} |", fmt_opt(run.true_objective))?;
    writeln!(out, "| converged | {} |", fit.converged)?;
    writeln!(out, "| status | {} |", fit.status)?;
    writeln!(out, "| evaluations | {} |", fit.evaluations)?;

    // Every model fitted to the same observations.
    writeln!(out, "\n## Model comparison")?;
    writeln!(out, "| model | params | objective | converged |")?;
    writeln!(out, "| - | - | - | - |")?;
    for kind in ModelKind::ALL {
        match fit_model(kind, run.objective.observations().to_vec(), None, &opts) {
            Ok((_, other)) => writeln!(
                out,
                "| {} | {} | {:.6} | {} |",
                kind.display_name(),
                fmt_vec(&other.params),
                other.objective,
                other.converged
            )?,
            Err(e) => writeln!(out, "| {} | - | - | {e} |", kind.display_name())?,
        }
    }

    for (i, name) in config.model.param_names().iter().enumerate() {
        let se = run.standard_errors.get(i).copied().flatten();
        let (lo, hi) = scan_window(fit.params[i], se, SCAN_WIDTH_SE);
        writeln!(out, "\n## Profile scan: {name}")?;
        let grid = match lin_space(lo, hi, SCAN_STEPS) {
            Ok(g) => g,
            Err(e) => {
                writeln!(out, "- skipped: {e}")?;
                continue;
            }
        };
        writeln!(out, "| {name} | objective | delta |")?;
        writeln!(out, "| - | - | - |")?;
        for p in profile_scan(&run.objective, &fit.params, i, &grid)? {
            let delta = p.value.map(|v| v - fit.objective);
            writeln!(out, "| {:.6} | {} | {} |", p.param, fmt_opt(p.value), fmt_opt(delta))?;
        }
    }

    writeln!(out, "\n## Observations")?;
    writeln!(out, "| n | observed | true_rate | fitted | residual |")?;
    writeln!(out, "| - | - | - | - | - |")?;
    for r in &run.residuals {
        writeln!(
            out,
            "| {} | {} | {:.3} | {:.3} | {:.3} |",
            r.index, r.observed, r.true_rate, r.fitted_rate, r.residual
        )?;
    }

    Ok(())
}

#[derive(Debug, thiserror::Error)]
enum DebugError {
    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
    #[error(transparent)]
    Fit(#[from] crate::error::FitError),
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt_vec(values: &[Option<f64>]) -> String {
    let parts: Vec<String> = values.iter().map(|v| fmt_opt(*v)).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_fit;

    #[test]
    fn bundle_contains_every_section() {
        let config = ExperimentConfig::example(ModelKind::Oscillating, 3);
        let run = run_fit(&config).unwrap();
        let dir = std::env::temp_dir().join(format!("mle-debug-{}", std::process::id()));

        let path = write_debug_bundle_in(&dir, &config, &run).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_dir_all(&dir);

        assert!(text.starts_with("# mle debug bundle"));
        assert!(text.contains("## Model comparison"));
        assert!(text.contains("## Profile scan: A"));
        assert!(text.contains("## Profile scan: B"));
        assert!(text.contains("## Observations"));
        // header + separator + one row per observation
        let obs_rows = text
            .split("## Observations")
            .nth(1)
            .map(|s| s.lines().filter(|l| l.starts_with("| ")).count())
            .unwrap();
        assert_eq!(obs_rows, 2 + 100);
    }
}
