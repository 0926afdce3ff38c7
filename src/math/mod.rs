//! Mathematical utilities: finite differences and log-factorials.

pub mod finite_diff;
pub mod special;

pub use finite_diff::*;
pub use special::*;
