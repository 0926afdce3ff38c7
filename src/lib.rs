//! `poisson-mle` library crate.
//!
//! The binary (`mle`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the fitter and image display are reusable from other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod fit;
pub mod image;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
