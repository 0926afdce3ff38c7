//! Poisson rate models.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic over the `(params, index) -> rate` contract.

pub mod model;

pub use model::*;
