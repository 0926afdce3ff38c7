//! Synthetic data for the worked examples.

pub mod sample;

pub use sample::{SampleData, compute_stats, generate_sample};
