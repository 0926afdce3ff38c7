//! Export per-index results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{ExperimentConfig, ResidualRow};
use crate::error::AppError;

/// Write per-index results to a CSV file.
pub fn write_results_csv(
    path: &Path,
    residuals: &[ResidualRow],
    config: &ExperimentConfig,
) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "model,seed,n,observed,true_rate,fitted_rate,residual")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let model = format!("{:?}", config.model).to_lowercase();
    for r in residuals {
        writeln!(
            file,
            "{},{},{},{},{:.10},{:.10},{:.10}",
            model, config.seed, r.index, r.observed, r.true_rate, r.fitted_rate, r.residual,
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    tracing::info!(path = %path.display(), rows = residuals.len(), "wrote results CSV");
    Ok(())
}
