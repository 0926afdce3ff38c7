//! One-dimensional objective scans.
//!
//! A scan varies one parameter along a linear grid while holding the others at a
//! reference point (normally the fit). It shows how sharply the likelihood
//! pins that parameter down and whether the minimizer stopped at a local dip.

use crate::error::{AppError, FitError};
use crate::fit::objective::PoissonObjective;

/// Generate `steps` evenly spaced points between `min` and `max` (inclusive).
pub fn lin_space(min: f64, max: f64, steps: usize) -> Result<Vec<f64>, AppError> {
    if !(min.is_finite() && max.is_finite() && max > min) {
        return Err(AppError::new(
            2,
            format!("Invalid scan range: min={min}, max={max} (must be finite and max>min)."),
        ));
    }
    if steps < 2 {
        return Err(AppError::new(2, "Scan steps must be >= 2."));
    }

    let step = (max - min) / (steps as f64 - 1.0);
    Ok((0..steps).map(|i| min + step * i as f64).collect())
}

/// One point of a scan. `value` is `None` where the model rate is not positive.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPoint {
    pub param: f64,
    pub value: Option<f64>,
}

/// Evaluate the objective along `grid` for parameter `index`.
pub fn profile_scan(
    objective: &PoissonObjective,
    at: &[f64],
    index: usize,
    grid: &[f64],
) -> Result<Vec<ScanPoint>, FitError> {
    if index >= at.len() {
        return Err(FitError::LengthMismatch {
            what: "scan parameter index",
            expected: at.len(),
            got: index,
        });
    }

    let mut theta = at.to_vec();
    Ok(grid
        .iter()
        .map(|&v| {
            theta[index] = v;
            ScanPoint {
                param: v,
                value: objective.value(&theta).ok(),
            }
        })
        .collect())
}

/// Scan window around a fitted value: `±width` standard errors when known,
/// otherwise `±50%`, clipped at zero for non-negative parameters.
pub fn scan_window(center: f64, se: Option<f64>, width: f64) -> (f64, f64) {
    let half = match se {
        Some(s) if s.is_finite() && s > 0.0 => width * s,
        _ => 0.5 * center.abs().max(1e-3),
    };
    ((center - half).max(0.0), center + half)
}
