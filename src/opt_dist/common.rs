// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Problem pieces shared by every measurement class.
//!
//! Outcomes are indexed by state; the unambiguous criterion appends one
//! inconclusive outcome after the state outcomes.

use ndarray::Array2;
use num_complex::Complex64;

use super::Criterion;
use crate::operators::identity;
use crate::sdp::{Affine, HermitianVar, MatExpr, Problem};

pub(crate) const ONE: Complex64 = Complex64 { re: 1.0, im: 0.0 };

/// Number of measurement outcomes for `n` states.
pub(crate) fn outcome_count(n: usize, criterion: Criterion) -> usize {
    match criterion {
        Criterion::MinError => n,
        Criterion::Unambiguous => n + 1,
    }
}

/// Require `Σ_i M_i = I`.
pub(crate) fn constrain_completeness(p: &mut Problem, ops: &[HermitianVar], dim: usize) {
    let sum = ops
        .iter()
        .fold(MatExpr::zeros(dim, dim), |acc, m| acc.add_scaled(&m.expr(), ONE));
    p.constrain_hermitian_eq(&sum, &MatExpr::constant(&identity(dim)));
}

/// Require `p_j Tr(ρ_j M_i) = 0` for every state outcome `i` and `j ≠ i`.
pub(crate) fn constrain_no_false_positives(
    p: &mut Problem,
    ops: &[HermitianVar],
    weighted: &[Array2<Complex64>],
) {
    for (i, m) in ops.iter().enumerate().take(weighted.len()) {
        let expr = m.expr();
        for (j, w) in weighted.iter().enumerate() {
            if i != j {
                p.constrain_zero(&expr.inner_const(w));
            }
        }
    }
}

/// Success probability `Σ_i Tr(p_i ρ_i M_i)`.
pub(crate) fn success_probability(ops: &[HermitianVar], weighted: &[Array2<Complex64>]) -> Affine {
    ops.iter()
        .zip(weighted)
        .fold(Affine::zero(), |acc, (m, w)| acc + m.expr().inner_const(w))
}

/// Declare the measurement operators of a primal problem together with
/// completeness and, for the unambiguous criterion, the no-false-positive
/// constraints.
pub(crate) fn measurement_operators(
    p: &mut Problem,
    weighted: &[Array2<Complex64>],
    dim: usize,
    criterion: Criterion,
) -> Vec<HermitianVar> {
    let ops: Vec<HermitianVar> = (0..outcome_count(weighted.len(), criterion))
        .map(|_| p.psd(dim))
        .collect();
    constrain_completeness(p, &ops, dim);
    if criterion == Criterion::Unambiguous {
        constrain_no_false_positives(p, &ops, weighted);
    }
    ops
}

/// Per-outcome dual slack `E_j` built on the objective variable `y`.
///
/// Min-error: `E_j = Y − p_j ρ_j`. Unambiguous: `E_j = Y − p_j ρ_j +
/// Σ_{i≠j} s_ji p_i ρ_i` with free scalars `s_ji`, and `E_? = Y` for the
/// inconclusive outcome. The dual requires every `E_j` (less any
/// class-specific terms) to be PSD.
pub(crate) fn dual_slacks(
    p: &mut Problem,
    y: &HermitianVar,
    weighted: &[Array2<Complex64>],
    criterion: Criterion,
) -> Vec<MatExpr> {
    let neg_one = -ONE;
    let mut slacks: Vec<MatExpr> = weighted
        .iter()
        .enumerate()
        .map(|(j, w)| {
            let mut e = y.expr().add_constant(w, neg_one);
            if criterion == Criterion::Unambiguous {
                for (i, wi) in weighted.iter().enumerate() {
                    if i != j {
                        let s = p.scalar();
                        e = e.add_scalar_times(wi, &s.expr());
                    }
                }
            }
            e
        })
        .collect();
    if criterion == Criterion::Unambiguous {
        slacks.push(y.expr());
    }
    slacks
}
