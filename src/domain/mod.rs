//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - rate models and the model function contract (`ModelKind`, `RateFn`)
//! - parameter bounds (`Bound`)
//! - fit outputs (`FitOutcome`, `ResidualRow`, `FitFile`)
//! - the run configuration (`ExperimentConfig`)

pub mod types;

pub use types::*;
