// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! QuStop: optimal quantum state distinguishability and exclusion
//!
//! This crate computes how well the members of an ensemble of quantum
//! states can be told apart, or ruled out, when the measurement is
//! restricted to a class: arbitrary (positive), PPT, or separable. It also
//! bounds how well the states can be cloned.
//! Every quantity is the optimum of a semidefinite program, solved with
//! an interior-point conic backend.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │     OptDist / OptExclude / OptClone     │
//! ├─────────────┬─────────────┬─────────────┤
//! │  Positive   │     Ppt     │  Separable  │
//! ├─────────────┴─────────────┴─────────────┤
//! │   SDP layer (Problem, MatExpr, ...)     │
//! ├─────────────────────────────────────────┤
//! │        SdpBackend (Clarabel)            │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration management
//! - [`core`]: States, ensembles and ensemble files
//! - [`operators`]: Quantum operator algebra
//! - [`sdp`]: SDP modeling layer and conic backends
//! - [`opt_dist`]: Distinguishability engines and facade
//! - [`opt_exclude`]: State exclusion facade
//! - [`opt_clone`]: Optimal cloning (counterfeiting) facade
//! - [`validation`]: Input validation utilities
//! - [`error`]: Error types

pub mod config;
pub mod core;
pub mod error;
pub mod operators;
pub mod opt_clone;
pub mod opt_dist;
pub mod opt_exclude;
pub mod sdp;
pub mod validation;

pub use self::core::{load_ensemble, Ensemble, Party, State};
pub use config::{Config, SolverConfig};
pub use error::{Error, Result};
pub use opt_dist::{Criterion, DistinguishabilitySolver, MeasurementClass, OptDist};
pub use opt_clone::OptClone;
pub use opt_exclude::OptExclude;

#[cfg(test)]
pub mod test_utils;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
