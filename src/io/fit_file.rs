//! Read/write fit JSON files.
//!
//! Fit JSON is the "portable" representation of a run:
//! - model kind, generating and fitted parameters, standard errors
//! - the observations the fit was made on
//! - a precomputed rate grid for quick plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;

use crate::domain::{ExperimentConfig, FitFile, FitOutcome, RateGrid, ResidualRow};
use crate::error::AppError;

/// Build the serializable view of a finished run.
pub fn build_fit_file(
    config: &ExperimentConfig,
    fit: &FitOutcome,
    standard_errors: &[Option<f64>],
    residuals: &[ResidualRow],
) -> FitFile {
    FitFile {
        tool: "mle".to_string(),
        generated: Utc::now(),
        model: config.model,
        param_names: config.model.param_names().iter().map(|s| s.to_string()).collect(),
        true_params: config.true_params.clone(),
        seed: config.seed,
        fit: fit.clone(),
        standard_errors: standard_errors.to_vec(),
        observations: residuals.iter().map(|r| r.observed).collect(),
        grid: RateGrid {
            index: residuals.iter().map(|r| r.index).collect(),
            fitted: residuals.iter().map(|r| r.fitted_rate).collect(),
            truth: residuals.iter().map(|r| r.true_rate).collect(),
        },
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, fit_file: &FitFile) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create fit JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, fit_file)
        .map_err(|e| AppError::new(2, format!("Failed to write fit JSON: {e}")))?;

    tracing::info!(path = %path.display(), "wrote fit JSON");
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open fit JSON '{}': {e}", path.display())))?;
    let fit_file: FitFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid fit JSON: {e}")))?;

    let n = fit_file.grid.index.len();
    if fit_file.grid.fitted.len() != n || fit_file.grid.truth.len() != n {
        return Err(AppError::new(2, "Invalid fit JSON: rate grid columns differ in length."));
    }
    Ok(fit_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("mle-{}-{name}", std::process::id()))
    }

    #[test]
    fn fit_json_survives_a_save_and_load() {
        let config = ExperimentConfig::example(ModelKind::Linear, 9);
        let run = crate::app::pipeline::run_fit(&config).unwrap();
        let file = build_fit_file(&config, &run.fit, &run.standard_errors, &run.residuals);

        let path = temp_path("fit.json");
        write_fit_json(&path, &file).unwrap();
        let back = read_fit_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.model, ModelKind::Linear);
        assert_eq!(back.param_names, vec!["A".to_string()]);
        assert_eq!(back.observations, run.sample.observations);
        assert_eq!(back.grid.index.len(), 10);
        assert_eq!(back.fit.converged, run.fit.converged);
    }

    #[test]
    fn missing_file_is_usage_error() {
        let err = read_fit_json(&temp_path("does-not-exist.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let path = temp_path("ragged.json");
        let config = ExperimentConfig::example(ModelKind::Linear, 1);
        let run = crate::app::pipeline::run_fit(&config).unwrap();
        let mut file = build_fit_file(&config, &run.fit, &run.standard_errors, &run.residuals);
        file.grid.truth.pop();
        write_fit_json(&path, &file).unwrap();

        let result = read_fit_json(&path);
        let _ = std::fs::remove_file(&path);
        assert!(result.is_err());
    }
}
