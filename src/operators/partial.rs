// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Partial transpose, partial trace and subsystem permutation of matrices.

use ndarray::Array2;
use num_complex::Complex64;

use super::index::{is_permutation, permute_map, total_dim, trace_map, transpose_map};
use crate::error::{Result, ValidationError};

/// Check that `a` is square with side `Π dims` and that every position in
/// `sys` names a subsystem.
fn check_layout(a: &Array2<Complex64>, dims: &[usize], sys: &[usize]) -> Result<usize> {
    let dim = total_dim(dims);
    let (rows, cols) = a.dim();
    if rows != cols || rows != dim {
        return Err(ValidationError::DimensionMismatch {
            expected: dim,
            actual: rows.max(cols),
        }
        .into());
    }
    if let Some(&bad) = sys.iter().find(|&&s| s >= dims.len()) {
        return Err(ValidationError::InvalidSubsystem(format!(
            "position {} out of range for {} subsystems",
            bad,
            dims.len()
        ))
        .into());
    }
    Ok(dim)
}

fn gather(a: &Array2<Complex64>, dim: usize, out_dim: usize, map: &[usize]) -> Array2<Complex64> {
    Array2::from_shape_fn((out_dim, out_dim), |(r, c)| {
        let k = map[r * out_dim + c];
        a[[k / dim, k % dim]]
    })
}

/// Partial transpose of `a` on the subsystem positions `sys` (0-based).
pub fn partial_transpose(
    a: &Array2<Complex64>,
    dims: &[usize],
    sys: &[usize],
) -> Result<Array2<Complex64>> {
    let dim = check_layout(a, dims, sys)?;
    Ok(gather(a, dim, dim, &transpose_map(dims, sys)))
}

/// Partial trace of `a` over the subsystem positions `sys` (0-based).
pub fn partial_trace(a: &Array2<Complex64>, dims: &[usize], sys: &[usize]) -> Result<Array2<Complex64>> {
    let dim = check_layout(a, dims, sys)?;
    let (out_dim, sources) = trace_map(dims, sys);
    Ok(Array2::from_shape_fn((out_dim, out_dim), |(r, c)| {
        sources[r * out_dim + c]
            .iter()
            .map(|&k| a[[k / dim, k % dim]])
            .sum()
    }))
}

/// Reorder the tensor factors of `a` so that new position `p` holds old
/// subsystem `perm[p]`.
pub fn permute_systems(
    a: &Array2<Complex64>,
    dims: &[usize],
    perm: &[usize],
) -> Result<Array2<Complex64>> {
    if !is_permutation(perm, dims.len()) {
        return Err(ValidationError::InvalidSubsystem(format!(
            "{:?} is not a permutation of {} subsystems",
            perm,
            dims.len()
        ))
        .into());
    }
    let dim = check_layout(a, dims, &[])?;
    let (_, map) = permute_map(dims, perm);
    Ok(gather(a, dim, dim, &map))
}

/// Exchange the subsystems at positions `i` and `j` (0-based).
///
/// Returns the swapped operator together with its new dimension list.
pub fn swap_systems(
    a: &Array2<Complex64>,
    dims: &[usize],
    i: usize,
    j: usize,
) -> Result<(Array2<Complex64>, Vec<usize>)> {
    let mut perm: Vec<usize> = (0..dims.len()).collect();
    if i >= perm.len() || j >= perm.len() {
        return Err(ValidationError::InvalidSubsystem(format!(
            "cannot swap positions {} and {} of {} subsystems",
            i,
            j,
            dims.len()
        ))
        .into());
    }
    perm.swap(i, j);
    let mut new_dims = dims.to_vec();
    new_dims.swap(i, j);
    Ok((permute_systems(a, dims, &perm)?, new_dims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::operators::{dagger, identity, kron};
    use crate::test_utils::{assert_matrix_close, bell_state, random_like_matrix};

    #[test]
    fn test_partial_trace_of_product() {
        let a = random_like_matrix(2, 1);
        let b = random_like_matrix(3, 2);
        let tr_b: Complex64 = b.diag().sum();
        let tr_a: Complex64 = a.diag().sum();
        let ab = kron(&a, &b);

        assert_matrix_close(&partial_trace(&ab, &[2, 3], &[1]).unwrap(), &(&a * tr_b), 1e-12);
        assert_matrix_close(&partial_trace(&ab, &[2, 3], &[0]).unwrap(), &(&b * tr_a), 1e-12);
    }

    #[test]
    fn test_partial_trace_of_bell_is_maximally_mixed() {
        let rho = bell_state(0);
        let reduced = partial_trace(&rho, &[2, 2], &[1]).unwrap();
        assert_matrix_close(&reduced, &(identity(2) * Complex64::new(0.5, 0.0)), 1e-12);
    }

    #[test]
    fn test_partial_transpose_of_product() {
        let a = random_like_matrix(2, 3);
        let b = random_like_matrix(2, 4);
        let pt = partial_transpose(&kron(&a, &b), &[2, 2], &[1]).unwrap();
        assert_matrix_close(&pt, &kron(&a, &b.t().to_owned()), 1e-12);
    }

    #[test]
    fn test_partial_transpose_involution() {
        let m = random_like_matrix(6, 5);
        let once = partial_transpose(&m, &[3, 2], &[0]).unwrap();
        let twice = partial_transpose(&once, &[3, 2], &[0]).unwrap();
        assert_matrix_close(&twice, &m, 1e-12);
    }

    #[test]
    fn test_full_partial_transpose_is_transpose() {
        let m = random_like_matrix(4, 6);
        let pt = partial_transpose(&m, &[2, 2], &[0, 1]).unwrap();
        assert_matrix_close(&pt, &m.t().to_owned(), 1e-12);
    }

    #[test]
    fn test_swap_systems_of_product() {
        let a = random_like_matrix(2, 7);
        let b = random_like_matrix(3, 8);
        let (swapped, dims) = swap_systems(&kron(&a, &b), &[2, 3], 0, 1).unwrap();
        assert_eq!(dims, vec![3, 2]);
        assert_matrix_close(&swapped, &kron(&b, &a), 1e-12);
    }

    #[test]
    fn test_permute_systems_three_parties() {
        let a = random_like_matrix(2, 9);
        let b = random_like_matrix(3, 10);
        let c = random_like_matrix(2, 11);
        let abc = kron(&kron(&a, &b), &c);
        // new order: C, A, B
        let permuted = permute_systems(&abc, &[2, 3, 2], &[2, 0, 1]).unwrap();
        assert_matrix_close(&permuted, &kron(&kron(&c, &a), &b), 1e-12);
    }

    #[test]
    fn test_permute_preserves_adjoint() {
        let m = random_like_matrix(6, 12);
        let lhs = dagger(&permute_systems(&m, &[2, 3], &[1, 0]).unwrap());
        let rhs = permute_systems(&dagger(&m), &[2, 3], &[1, 0]).unwrap();
        assert_matrix_close(&lhs, &rhs, 1e-12);
    }

    #[test]
    fn test_mismatched_dims_rejected() {
        let m = random_like_matrix(4, 13);
        assert!(matches!(
            partial_trace(&m, &[2, 3], &[1]),
            Err(Error::Validation(ValidationError::DimensionMismatch {
                expected: 6,
                actual: 4
            }))
        ));
        assert!(matches!(
            partial_transpose(&m, &[3, 3], &[0]),
            Err(Error::Validation(ValidationError::DimensionMismatch { .. }))
        ));
        assert!(matches!(
            permute_systems(&m, &[2, 2, 2], &[1, 0, 2]),
            Err(Error::Validation(ValidationError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn test_bad_positions_rejected() {
        let m = random_like_matrix(4, 14);
        assert!(matches!(
            partial_transpose(&m, &[2, 2], &[2]),
            Err(Error::Validation(ValidationError::InvalidSubsystem(_)))
        ));
        assert!(matches!(
            permute_systems(&m, &[2, 2], &[1, 1]),
            Err(Error::Validation(ValidationError::InvalidSubsystem(_)))
        ));
        assert!(swap_systems(&m, &[2, 2], 0, 2).is_err());
    }
}
