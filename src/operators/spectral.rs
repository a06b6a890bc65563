// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Hermitian spectra and the checks built on them.

use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::Array2;
use num_complex::Complex64;

fn to_nalgebra(a: &Array2<Complex64>) -> DMatrix<Complex64> {
    let (rows, cols) = a.dim();
    DMatrix::from_fn(rows, cols, |r, c| a[[r, c]])
}

/// Eigenvalues of the Hermitian part of `a`, in ascending order.
pub fn hermitian_eigenvalues(a: &Array2<Complex64>) -> Vec<f64> {
    let m = to_nalgebra(a);
    let herm = (&m + m.adjoint()).map(|z| z * 0.5);
    let mut eig: Vec<f64> = SymmetricEigen::new(herm).eigenvalues.iter().copied().collect();
    eig.sort_by(f64::total_cmp);
    eig
}

/// True when `a` is square and `‖a - a†‖_max ≤ tol`.
pub fn is_hermitian(a: &Array2<Complex64>, tol: f64) -> bool {
    let (rows, cols) = a.dim();
    if rows != cols {
        return false;
    }
    (0..rows).all(|r| (r..cols).all(|c| (a[[r, c]] - a[[c, r]].conj()).norm() <= tol))
}

/// True when `a` is Hermitian with no eigenvalue below `-tol`.
pub fn is_psd(a: &Array2<Complex64>, tol: f64) -> bool {
    is_hermitian(a, tol)
        && hermitian_eigenvalues(a)
            .first()
            .map_or(true, |&min| min >= -tol)
}

/// Number of eigenvalues of the Hermitian part above `tol`.
pub fn rank(a: &Array2<Complex64>, tol: f64) -> usize {
    hermitian_eigenvalues(a).iter().filter(|&&x| x > tol).count()
}

/// Trace norm `‖a‖_1` of a Hermitian matrix (sum of absolute eigenvalues).
pub fn trace_norm(a: &Array2<Complex64>) -> f64 {
    hermitian_eigenvalues(a).iter().map(|x| x.abs()).sum()
}
