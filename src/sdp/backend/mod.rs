// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conic solver backends.
//!
//! This module provides the [`SdpBackend`] trait and its implementations:
//!
//! - `clarabel::ClarabelBackend`: Clarabel interior-point solver

pub mod clarabel;

pub use self::clarabel::ClarabelBackend;

use super::problem::{ConicProblem, Solution};
use crate::config::{SolverConfig, SolverId};
use crate::error::SolverError;

/// The trait that all conic solver backends must implement.
pub trait SdpBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Solve a compiled problem and return the primal point.
    fn solve(&self, problem: &ConicProblem) -> Result<Solution, SolverError>;
}

/// Construct the backend selected in `config`.
pub fn backend_for(config: &SolverConfig) -> Box<dyn SdpBackend> {
    match config.solver {
        SolverId::Clarabel => Box::new(ClarabelBackend::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_for_default() {
        let backend = backend_for(&SolverConfig::default());
        assert_eq!(backend.name(), "clarabel");
    }
}
