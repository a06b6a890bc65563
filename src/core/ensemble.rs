// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! A probability-weighted collection of states.

use std::fmt;
use std::ops::Index;

use ndarray::Array2;
use num_complex::Complex64;

use super::State;
use crate::error::{Result, ValidationError};
use crate::operators::{inner, rank};
use crate::validation::{validate_probabilities, validate_swap, ORTHOGONALITY_TOL, RANK_TOL};

/// An ordered set of states sharing one subsystem layout, each drawn with
/// an associated prior probability.
#[derive(Debug, Clone)]
pub struct Ensemble {
    states: Vec<State>,
    probs: Vec<f64>,
}

impl Ensemble {
    /// Create an ensemble. Without `probs` the distribution is uniform.
    pub fn new(states: Vec<State>, probs: Option<Vec<f64>>) -> Result<Self> {
        let first = states.first().ok_or(ValidationError::EmptyEnsemble)?;
        for (index, state) in states.iter().enumerate().skip(1) {
            if state.shape() != first.shape() {
                return Err(ValidationError::ShapeMismatch {
                    index,
                    expected: first.shape(),
                    actual: state.shape(),
                }
                .into());
            }
            if state.dims() != first.dims() || state.labels() != first.labels() {
                return Err(ValidationError::SubsystemMismatch { index }.into());
            }
        }

        let probs = probs.unwrap_or_else(|| vec![1.0 / states.len() as f64; states.len()]);
        validate_probabilities(&probs, states.len())?;

        Ok(Self { states, probs })
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false; ensembles hold at least one state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Member states.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Iterate over the member states.
    pub fn iter(&self) -> std::slice::Iter<'_, State> {
        self.states.iter()
    }

    /// Prior probabilities.
    pub fn probs(&self) -> &[f64] {
        &self.probs
    }

    /// Density operators of the member states.
    pub fn density_matrices(&self) -> Vec<&Array2<Complex64>> {
        self.states.iter().map(State::operator).collect()
    }

    /// Subsystem dimensions shared by every state.
    pub fn dims(&self) -> &[usize] {
        self.states[0].dims()
    }

    /// Subsystem labels shared by every state.
    pub fn systems(&self) -> &[usize] {
        self.states[0].labels()
    }

    /// Shape of each density operator.
    pub fn shape(&self) -> (usize, usize) {
        self.states[0].shape()
    }

    /// Total Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.states[0].dim()
    }

    /// Weighted operators `p_i ρ_i`.
    pub fn weighted_operators(&self) -> Vec<Array2<Complex64>> {
        self.states
            .iter()
            .zip(&self.probs)
            .map(|(s, &p)| s.operator() * Complex64::new(p, 0.0))
            .collect()
    }

    /// Average state `Σ_i p_i ρ_i`.
    pub fn average_state(&self) -> Array2<Complex64> {
        let dim = self.dim();
        self.weighted_operators()
            .into_iter()
            .fold(Array2::zeros((dim, dim)), |acc, w| acc + w)
    }

    /// Exchange two labelled subsystems in every state.
    pub fn swap(&mut self, pair: &[usize]) -> Result<()> {
        // validate once so a bad pair leaves every state untouched
        validate_swap(pair, self.systems())?;
        for state in &mut self.states {
            state.swap(pair)?;
        }
        Ok(())
    }

    /// True when `|Tr(ρ_i ρ_j)| ≤ 1e-8` for every pair of distinct members.
    pub fn is_mutually_orthogonal(&self) -> bool {
        let ops = self.density_matrices();
        ops.iter().enumerate().all(|(i, a)| {
            ops[i + 1..]
                .iter()
                .all(|b| inner(a, b).norm() <= ORTHOGONALITY_TOL)
        })
    }

    /// True when the supports of the states are linearly independent,
    /// i.e. `rank(Σ ρ_i) = Σ rank(ρ_i)`. For pure states this is linear
    /// independence of the state vectors.
    pub fn is_linearly_independent(&self) -> bool {
        let dim = self.dim();
        let sum = self
            .states
            .iter()
            .fold(Array2::zeros((dim, dim)), |acc, s| acc + s.operator());
        let total: usize = self.states.iter().map(|s| rank(s.operator(), RANK_TOL)).sum();
        rank(&sum, RANK_TOL) == total
    }
}

impl Index<usize> for Ensemble {
    type Output = State;

    fn index(&self, index: usize) -> &State {
        &self.states[index]
    }
}

impl<'a> IntoIterator for &'a Ensemble {
    type Item = &'a State;
    type IntoIter = std::slice::Iter<'a, State>;

    fn into_iter(self) -> Self::IntoIter {
        self.states.iter()
    }
}

impl fmt::Display for Ensemble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Ensemble: num_states = {}, dimensions = {:?}",
            self.len(),
            self.dims()
        )?;
        let members: Vec<String> = self
            .probs
            .iter()
            .enumerate()
            .map(|(i, p)| format!("ρ_{} (p = {:.4})", i, p))
            .collect();
        write!(f, "  {}", members.join(", "))
    }
}
