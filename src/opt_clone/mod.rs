// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Optimal cloning of states drawn from an ensemble.
//!
//! A referee prepares `ρ_k` with probability `p_k` on register `X`. A
//! counterfeiter applies a channel `X → Y ⊗ Z` and succeeds when both
//! outputs pass the referee's check for `ρ_k`. The best success
//! probability is the SDP
//!
//! ```text
//! max ⟨Q, X⟩  s.t.  Tr_{YZ}(X) = I_X,  X ⪰ 0,    Q = Σ_k p_k ρ_k ⊗ ρ_k ⊗ ρ_k^T
//! ```
//!
//! over Choi operators `X` on `Y ⊗ Z ⊗ X`, with dual `min Tr W` s.t.
//! `I_{YZ} ⊗ W ⪰ Q`. With `n` independent repetitions the operator is
//! `Q^{⊗n}` with its factors regrouped as `Y_1..Y_n Z_1..Z_n X_1..X_n`.
//!
//! # References
//!
//! - A. Molina, T. Vidick, J. Watrous, "Optimal counterfeiting attacks and
//!   generalizations for Wiesner's quantum money", TQC 2012.
//!   arXiv:1202.4010

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info};

use crate::config::SolverConfig;
use crate::core::Ensemble;
use crate::error::{Error, Result};
use crate::operators::{identity, kron, kron_all, permute_systems};
use crate::sdp::{backend_for, Field, MatExpr, Problem, SdpBackend, Sense};

const ONE: Complex64 = Complex64 { re: 1.0, im: 0.0 };

/// Cloning task: an ensemble and a number of repetitions, solved on demand.
pub struct OptClone<'a> {
    ensemble: &'a Ensemble,
    num_reps: usize,
    config: SolverConfig,
    value: Option<f64>,
    strategy: Option<Array2<Complex64>>,
}

impl<'a> OptClone<'a> {
    /// Create a task. Fails if `num_reps` is zero or the solver options
    /// are invalid.
    pub fn new(ensemble: &'a Ensemble, num_reps: usize, config: SolverConfig) -> Result<Self> {
        if num_reps == 0 {
            return Err(Error::Config("number of repetitions must be at least 1".to_string()));
        }
        config.validate()?;
        Ok(Self {
            ensemble,
            num_reps,
            config,
            value: None,
            strategy: None,
        })
    }

    /// Solve with the backend named in the configuration.
    pub fn solve(&mut self) -> Result<f64> {
        let backend = backend_for(&self.config);
        self.solve_with(backend.as_ref())
    }

    /// Solve with an explicit backend; the primal problem when the
    /// strategy is requested, otherwise the dual.
    pub fn solve_with(&mut self, backend: &dyn SdpBackend) -> Result<f64> {
        let d = self.ensemble.dim();
        let q = repeated_operator(&verification_operator(self.ensemble), d, self.num_reps)?;
        debug!(
            states = self.ensemble.len(),
            reps = self.num_reps,
            dim = q.nrows(),
            primal = self.config.return_measurements,
            "Solving cloning SDP"
        );

        let value = if self.config.return_measurements {
            let (value, strategy) = primal(&q, d, self.num_reps, backend)?;
            self.strategy = Some(strategy);
            value
        } else {
            self.strategy = None;
            dual(&q, d, self.num_reps, backend)?
        };

        info!(reps = self.num_reps, value, "Cloning solved");
        self.value = Some(value);
        Ok(value)
    }

    /// Optimal value of the last solve.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Optimal Choi operator on `Y^n ⊗ Z^n ⊗ X^n` of the last primal solve.
    pub fn strategy(&self) -> Option<&Array2<Complex64>> {
        self.strategy.as_ref()
    }

    pub fn num_reps(&self) -> usize {
        self.num_reps
    }
}

/// `Q = Σ_k p_k ρ_k ⊗ ρ_k ⊗ ρ_k^T` on `Y ⊗ Z ⊗ X`.
pub fn verification_operator(ensemble: &Ensemble) -> Array2<Complex64> {
    let d = ensemble.dim();
    ensemble
        .iter()
        .zip(ensemble.probs())
        .fold(Array2::zeros((d * d * d, d * d * d)), |acc, (state, &p)| {
            let rho = state.operator();
            let conj = rho.t().to_owned();
            acc + kron(&kron(rho, rho), &conj) * Complex64::new(p, 0.0)
        })
}

/// `Q^{⊗n}` with factors regrouped from `(Y_r Z_r X_r)_r` to
/// `Y_1..Y_n Z_1..Z_n X_1..X_n`.
pub fn repeated_operator(q: &Array2<Complex64>, d: usize, n: usize) -> Result<Array2<Complex64>> {
    if n == 1 {
        return Ok(q.clone());
    }
    let dims = vec![d; 3 * n];
    // new position p holds space p / n of repetition p % n
    let perm: Vec<usize> = (0..3 * n).map(|p| 3 * (p % n) + p / n).collect();
    permute_systems(&kron_all(std::iter::repeat(q).take(n)), &dims, &perm)
}

fn primal(
    q: &Array2<Complex64>,
    d: usize,
    n: usize,
    backend: &dyn SdpBackend,
) -> Result<(f64, Array2<Complex64>)> {
    let dims = vec![d; 3 * n];
    let mut p = Problem::over(Field::of([q]));
    let x = p.psd(q.nrows());
    let outputs: Vec<usize> = (0..2 * n).collect();
    p.constrain_hermitian_eq(
        &x.expr().partial_trace(&dims, &outputs),
        &MatExpr::constant(&identity(d.pow(n as u32))),
    );
    p.set_objective(Sense::Maximize, x.expr().inner_const(q));

    let solved = p.solve(backend)?;
    Ok((solved.value, solved.matrix(&x)))
}

fn dual(q: &Array2<Complex64>, d: usize, n: usize, backend: &dyn SdpBackend) -> Result<f64> {
    let mut p = Problem::over(Field::of([q]));
    let w = p.hermitian(d.pow(n as u32));
    p.constrain_psd(
        w.expr()
            .identity_kron(d.pow(2 * n as u32))
            .add_constant(q, -ONE),
    );
    p.set_objective(Sense::Minimize, w.expr().trace());
    Ok(p.solve(backend)?.value)
}
