// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! A density operator together with its subsystem layout.

use std::fmt;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use super::Party;
use crate::error::Result;
use crate::operators::{hermitian_eigenvalues, kron, outer, swap_systems};
use crate::validation::{validate_density, validate_dims, validate_swap, DENSITY_TOL};

/// A quantum state on `C^{d_1} ⊗ ... ⊗ C^{d_n}`.
///
/// Subsystems carry 1-based labels, initially `1..=n` in position order.
/// [`State::swap`] exchanges two tensor factors and their labels, so a
/// label always names the same physical subsystem. Odd labels belong to
/// party A and even labels to party B.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    operator: Array2<Complex64>,
    dims: Vec<usize>,
    labels: Vec<usize>,
}

impl State {
    /// Create a state from a density matrix or a `(d, 1)` column vector.
    ///
    /// A column vector `|ψ>` is replaced by `|ψ><ψ|` before validation.
    pub fn new(data: Array2<Complex64>, dims: Vec<usize>) -> Result<Self> {
        let operator = if data.ncols() == 1 {
            outer(&data.column(0).to_owned())
        } else {
            data
        };
        validate_dims(&dims, operator.nrows())?;
        validate_density(&operator)?;

        let labels = (1..=dims.len()).collect();
        Ok(Self {
            operator,
            dims,
            labels,
        })
    }

    /// Create the pure state `|ψ><ψ|`.
    pub fn from_vector(psi: &Array1<Complex64>, dims: Vec<usize>) -> Result<Self> {
        Self::new(outer(psi), dims)
    }

    /// The density operator.
    pub fn operator(&self) -> &Array2<Complex64> {
        &self.operator
    }

    /// Subsystem dimensions in current position order.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Subsystem labels in current position order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Total Hilbert space dimension.
    pub fn dim(&self) -> usize {
        self.operator.nrows()
    }

    /// Shape of the density operator.
    pub fn shape(&self) -> (usize, usize) {
        self.operator.dim()
    }

    /// Positions (0-based) of the subsystems held by `party`.
    pub fn party_positions(&self, party: Party) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| Party::of_label(label) == party)
            .map(|(pos, _)| pos)
            .collect()
    }

    /// Exchange the two subsystems with the given labels.
    pub fn swap(&mut self, pair: &[usize]) -> Result<()> {
        let (i, j) = validate_swap(pair, &self.labels)?;
        let (operator, dims) = swap_systems(&self.operator, &self.dims, i, j)?;
        self.operator = operator;
        self.dims = dims;
        self.labels.swap(i, j);
        Ok(())
    }

    /// Tensor product `self ⊗ other`.
    ///
    /// The labels of `other` are shifted past those of `self`.
    pub fn kron(&self, other: &State) -> State {
        let offset = self.labels.len();
        State {
            operator: kron(&self.operator, &other.operator),
            dims: self.dims.iter().chain(&other.dims).copied().collect(),
            labels: self
                .labels
                .iter()
                .copied()
                .chain(other.labels.iter().map(|l| l + offset))
                .collect(),
        }
    }

    /// True when the spectrum is `{1, 0, ..., 0}`.
    pub fn is_pure(&self) -> bool {
        let eig = hermitian_eigenvalues(&self.operator);
        let (last, rest) = match eig.split_last() {
            Some(split) => split,
            None => return false,
        };
        (last - 1.0).abs() <= DENSITY_TOL && rest.iter().all(|x| x.abs() <= DENSITY_TOL)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let partitions: Vec<String> = self
            .labels
            .iter()
            .map(|&l| format!("{}_{}", Party::of_label(l), l))
            .collect();
        write!(
            f,
            "State: dimensions = {:?}, partitions = {}, shape = {:?}",
            self.dims,
            partitions.join(" ⊗ "),
            self.shape()
        )
    }
}
