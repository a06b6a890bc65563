// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Clarabel interior-point backend.
//!
//! # References
//!
//! - P. J. Goulart, Y. Chen, "Clarabel: An interior-point solver for conic
//!   programs with quadratic objectives", arXiv:2405.12762

use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use tracing::{debug, warn};

use super::SdpBackend;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::sdp::problem::{Cone, ConicProblem, Solution};

/// Clarabel backend.
#[derive(Debug, Clone)]
pub struct ClarabelBackend {
    tolerance: f64,
    max_iterations: u32,
    time_limit_sec: Option<f64>,
    verbose: bool,
}

impl ClarabelBackend {
    /// Create a backend from solver options.
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            time_limit_sec: config.time_limit_sec,
            verbose: config.verbose,
        }
    }

    fn settings(&self) -> DefaultSettings<f64> {
        DefaultSettings {
            verbose: self.verbose,
            max_iter: self.max_iterations,
            time_limit: self.time_limit_sec.unwrap_or(f64::INFINITY),
            tol_gap_abs: self.tolerance,
            tol_gap_rel: self.tolerance,
            tol_feas: self.tolerance,
            ..Default::default()
        }
    }
}

impl Default for ClarabelBackend {
    fn default() -> Self {
        Self::new(&SolverConfig::default())
    }
}

impl SdpBackend for ClarabelBackend {
    fn name(&self) -> &str {
        "clarabel"
    }

    fn solve(&self, problem: &ConicProblem) -> Result<Solution, SolverError> {
        let n = problem.num_vars;
        let m = problem.num_rows();

        // linear objective
        let p = CscMatrix::new(n, n, vec![0; n + 1], vec![], vec![]);
        let (colptr, rowval, nzval) = problem.a_csc();
        let a = CscMatrix::new(m, n, colptr, rowval, nzval);

        let cones: Vec<SupportedConeT<f64>> = problem
            .cones
            .iter()
            .map(|cone| match *cone {
                Cone::Zero(k) => SupportedConeT::ZeroConeT(k),
                Cone::PsdTriangle(k) => SupportedConeT::PSDTriangleConeT(k),
            })
            .collect();

        debug!(vars = n, rows = m, cones = cones.len(), "Starting Clarabel");

        let mut solver = DefaultSolver::new(&p, &problem.q, &a, &problem.b, &cones, self.settings());
        solver.solve();

        let solution = &solver.solution;
        let status = format!("{:?}", solution.status);
        match solution.status {
            SolverStatus::Solved => {}
            SolverStatus::AlmostSolved => {
                warn!(
                    iterations = solution.iterations,
                    "Clarabel reached reduced accuracy only"
                );
            }
            SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
                return Err(SolverError::Infeasible(status));
            }
            SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
                return Err(SolverError::Unbounded(status));
            }
            SolverStatus::MaxIterations | SolverStatus::MaxTime => {
                return Err(SolverError::NotConverged {
                    status,
                    iterations: solution.iterations,
                });
            }
            _ => return Err(SolverError::Numerical(status)),
        }

        Ok(Solution {
            x: solution.x.clone(),
            status,
            iterations: solution.iterations,
            solve_time: solution.solve_time,
        })
    }
}
