//! Synthetic Poisson sample generation.
//!
//! Each sample index `n` gets one independent draw `x[n] ~ Poisson(f(θ_true, n))`.
//! The RNG is seeded from the config so a run is reproducible.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Poisson};

use crate::domain::{DatasetStats, ExperimentConfig};
use crate::error::AppError;
use crate::models::rates;

#[derive(Debug, Clone)]
pub struct SampleData {
    pub observations: Vec<u64>,
    /// Generating rate at each index.
    pub true_rates: Vec<f64>,
    pub stats: DatasetStats,
}

pub fn generate_sample(config: &ExperimentConfig) -> Result<SampleData, AppError> {
    if config.sample_count == 0 {
        return Err(AppError::new(2, "Sample count must be > 0."));
    }
    let k = config.model.param_count();
    if config.true_params.len() != k {
        return Err(AppError::new(
            2,
            format!(
                "Model {} takes {k} parameter(s), got {}.",
                config.model.display_name(),
                config.true_params.len()
            ),
        ));
    }
    if config.true_params.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(AppError::new(2, "True parameters must be finite and non-negative."));
    }

    let true_rates = rates(config.model, &config.true_params, config.sample_count);

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut observations = Vec::with_capacity(config.sample_count);

    for (n, &lambda) in true_rates.iter().enumerate() {
        let dist = Poisson::new(lambda).map_err(|e| {
            AppError::new(4, format!("Invalid generating rate {lambda} at n={n}: {e}"))
        })?;
        let draw: f64 = dist.sample(&mut rng);
        observations.push(draw as u64);
    }

    let stats = compute_stats(&observations)
        .ok_or_else(|| AppError::new(4, "Failed to compute sample stats."))?;

    Ok(SampleData {
        observations,
        true_rates,
        stats,
    })
}

pub fn compute_stats(observations: &[u64]) -> Option<DatasetStats> {
    let x_min = *observations.iter().min()?;
    let x_max = *observations.iter().max()?;
    let total: u64 = observations.iter().sum();

    Some(DatasetStats {
        n_points: observations.len(),
        x_min,
        x_max,
        x_mean: total as f64 / observations.len() as f64,
        zero_count: observations.iter().filter(|&&x| x == 0).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ModelKind;

    #[test]
    fn same_seed_same_sample() {
        let config = ExperimentConfig::example(ModelKind::Oscillating, 7);
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.observations, b.observations);
        assert_eq!(a.observations.len(), 100);
    }

    #[test]
    fn different_seed_different_sample() {
        let a = generate_sample(&ExperimentConfig::example(ModelKind::Oscillating, 1)).unwrap();
        let b = generate_sample(&ExperimentConfig::example(ModelKind::Oscillating, 2)).unwrap();
        assert_ne!(a.observations, b.observations);
    }

    #[test]
    fn sample_mean_tracks_rate() {
        let mut config = ExperimentConfig::example(ModelKind::Constant, 11);
        config.true_params = vec![40.0];
        config.sample_count = 5_000;
        let sample = generate_sample(&config).unwrap();
        // sd of the mean is sqrt(40 / 5000) ≈ 0.09
        assert!((sample.stats.x_mean - 40.0).abs() < 0.5, "mean={}", sample.stats.x_mean);
    }

    #[test]
    fn zero_rate_is_rejected() {
        let mut config = ExperimentConfig::example(ModelKind::Linear, 0);
        config.true_params = vec![0.0];
        let err = generate_sample(&config).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn wrong_param_count_is_rejected() {
        let mut config = ExperimentConfig::example(ModelKind::Oscillating, 0);
        config.true_params = vec![800.0];
        assert_eq!(generate_sample(&config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn stats_count_zeros() {
        let s = compute_stats(&[0, 3, 0, 5]).unwrap();
        assert_eq!(s.zero_count, 2);
        assert_eq!(s.x_min, 0);
        assert_eq!(s.x_max, 5);
        assert!((s.x_mean - 2.0).abs() < 1e-12);
        assert!(compute_stats(&[]).is_none());
    }
}
