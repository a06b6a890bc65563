// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Permutation operators and the symmetric subspace of `(C^d)^{⊗k}`.
//!
//! # References
//!
//! - A. C. Doherty, P. A. Parrilo, F. M. Spedalieri, "Complete family of
//!   separability criteria", Phys. Rev. A 69, 022308 (2004)
//! - A. W. Harrow, "The church of the symmetric subspace", arXiv:1308.6595

use std::collections::BTreeMap;

use ndarray::Array2;
use num_complex::Complex64;

use super::index::{digits, from_digits, permutations};

/// Operator permuting `k` copies of `C^d`: copy `p` of the output is copy
/// `perm[p]` of the input.
pub fn permutation_operator(d: usize, perm: &[usize]) -> Array2<Complex64> {
    let k = perm.len();
    let dims = vec![d; k];
    let dim = d.pow(k as u32);
    let mut op = Array2::zeros((dim, dim));
    let mut out_digits = vec![0; k];
    for col in 0..dim {
        let in_digits = digits(col, &dims);
        for (p, &src) in perm.iter().enumerate() {
            out_digits[p] = in_digits[src];
        }
        op[[from_digits(&out_digits, &dims), col]] = Complex64::new(1.0, 0.0);
    }
    op
}

/// Swap operator on `C^d ⊗ C^d`.
pub fn swap_operator(d: usize) -> Array2<Complex64> {
    permutation_operator(d, &[1, 0])
}

/// Projector onto the symmetric subspace, `(1/k!) Σ_π P_π`.
pub fn symmetric_projection(d: usize, k: usize) -> Array2<Complex64> {
    let perms = permutations(k);
    let dim = d.pow(k as u32);
    let mut proj = Array2::zeros((dim, dim));
    for perm in &perms {
        proj += &permutation_operator(d, perm);
    }
    proj / Complex64::new(perms.len() as f64, 0.0)
}

/// Isometry `V` whose columns are an orthonormal basis of the symmetric
/// subspace, so that `V V† = Π_sym` and `V† V = I`.
///
/// Columns are indexed by sorted digit multisets in lexicographic order;
/// there are `C(d + k - 1, k)` of them.
pub fn symmetric_isometry(d: usize, k: usize) -> Array2<Complex64> {
    let dims = vec![d; k];
    let dim = d.pow(k as u32);

    let mut classes: BTreeMap<Vec<usize>, Vec<usize>> = BTreeMap::new();
    for index in 0..dim {
        let mut key = digits(index, &dims);
        key.sort_unstable();
        classes.entry(key).or_default().push(index);
    }

    let mut v = Array2::zeros((dim, classes.len()));
    for (col, members) in classes.values().enumerate() {
        let amp = Complex64::new(1.0 / (members.len() as f64).sqrt(), 0.0);
        for &row in members {
            v[[row, col]] = amp;
        }
    }
    v
}

/// Dimension of the symmetric subspace of `(C^d)^{⊗k}`.
pub fn symmetric_dim(d: usize, k: usize) -> usize {
    // C(d + k - 1, k)
    (1..=k).fold(1usize, |acc, i| acc * (d + i - 1) / i)
}
