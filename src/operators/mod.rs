// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Quantum operator algebra on dense complex matrices.
//!
//! Operators are `Array2<Complex64>` acting on a tensor product of
//! subsystems described by a dimension list. The first subsystem is the
//! most significant factor, so `kron(a, b)` acts on `[dim(a), dim(b)]`.
//!
//! # Submodules
//!
//! - [`index`]: flat index maps shared with the SDP expression layer
//! - [`partial`]: partial transpose, partial trace, subsystem permutation
//! - [`symmetric`]: permutation operators and the symmetric subspace
//! - [`spectral`]: Hermitian spectra, PSD checks, rank and trace norm

pub mod index;
pub mod partial;
pub mod spectral;
pub mod symmetric;

use ndarray::{Array1, Array2};
use num_complex::Complex64;

pub use partial::{partial_trace, partial_transpose, permute_systems, swap_systems};
pub use spectral::{hermitian_eigenvalues, is_hermitian, is_psd, rank, trace_norm};
pub use symmetric::{
    permutation_operator, swap_operator, symmetric_dim, symmetric_isometry, symmetric_projection,
};

/// Identity matrix of size `n`.
pub fn identity(n: usize) -> Array2<Complex64> {
    Array2::from_diag_elem(n, Complex64::new(1.0, 0.0))
}

/// Zero matrix of size `n`.
pub fn zeros(n: usize) -> Array2<Complex64> {
    Array2::zeros((n, n))
}

/// Conjugate transpose.
pub fn dagger(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|z| z.conj())
}

/// Kronecker (tensor) product `a ⊗ b`.
pub fn kron(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Array2<Complex64> {
    let (ar, ac) = a.dim();
    let (br, bc) = b.dim();
    Array2::from_shape_fn((ar * br, ac * bc), |(r, c)| {
        a[[r / br, c / bc]] * b[[r % br, c % bc]]
    })
}

/// Kronecker product of a sequence of operators, left to right.
pub fn kron_all<'a, I>(ops: I) -> Array2<Complex64>
where
    I: IntoIterator<Item = &'a Array2<Complex64>>,
{
    ops.into_iter()
        .fold(identity(1), |acc, op| kron(&acc, op))
}

/// Trace of a square matrix.
pub fn trace(a: &Array2<Complex64>) -> Complex64 {
    a.diag().sum()
}

/// Hilbert-Schmidt inner product `Tr(a† b)`.
pub fn inner(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Complex64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.conj() * y).sum()
}

/// Projector `|v><v|` onto a (not necessarily normalised) vector.
pub fn outer(v: &Array1<Complex64>) -> Array2<Complex64> {
    let n = v.len();
    Array2::from_shape_fn((n, n), |(r, c)| v[r] * v[c].conj())
}

/// Computational basis vector `|i>` of `C^d`.
pub fn basis(d: usize, i: usize) -> Array1<Complex64> {
    let mut v = Array1::zeros(d);
    v[i] = Complex64::new(1.0, 0.0);
    v
}

/// Largest absolute entry of `a - b`.
pub fn max_abs_diff(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).norm())
        .fold(0.0, f64::max)
}
