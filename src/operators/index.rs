// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Flat index maps for multipartite operators.
//!
//! An operator on `C^{d_0} ⊗ ... ⊗ C^{d_{n-1}}` is stored as a `D × D` matrix
//! with `D = Π d_i`; the first subsystem is the most significant digit of a
//! basis index. Every map here is expressed on flat `row * D + col` offsets
//! so it can be applied both to numeric matrices and to matrices of affine
//! expressions.

/// Split a basis index into per-subsystem digits (big-endian).
pub fn digits(mut index: usize, dims: &[usize]) -> Vec<usize> {
    let mut out = vec![0; dims.len()];
    for (pos, &d) in dims.iter().enumerate().rev() {
        out[pos] = index % d;
        index /= d;
    }
    out
}

/// Inverse of [`digits`].
pub fn from_digits(digits: &[usize], dims: &[usize]) -> usize {
    digits
        .iter()
        .zip(dims)
        .fold(0, |acc, (&digit, &d)| acc * d + digit)
}

/// Product of subsystem dimensions.
pub fn total_dim(dims: &[usize]) -> usize {
    dims.iter().product()
}

/// Partial transpose on the subsystem positions `sys`.
///
/// Entry `k` of the returned vector is the flat input offset whose value
/// lands at flat output offset `k`.
pub fn transpose_map(dims: &[usize], sys: &[usize]) -> Vec<usize> {
    let dim = total_dim(dims);
    let mut map = Vec::with_capacity(dim * dim);
    for row in 0..dim {
        let row_digits = digits(row, dims);
        for col in 0..dim {
            let mut r = row_digits.clone();
            let mut c = digits(col, dims);
            for &s in sys {
                std::mem::swap(&mut r[s], &mut c[s]);
            }
            map.push(from_digits(&r, dims) * dim + from_digits(&c, dims));
        }
    }
    map
}

/// Partial trace over the subsystem positions `sys`.
///
/// Returns the output dimension and, for every flat output offset, the flat
/// input offsets that sum into it.
pub fn trace_map(dims: &[usize], sys: &[usize]) -> (usize, Vec<Vec<usize>>) {
    let dim = total_dim(dims);
    let kept: Vec<usize> = (0..dims.len()).filter(|p| !sys.contains(p)).collect();
    let kept_dims: Vec<usize> = kept.iter().map(|&p| dims[p]).collect();
    let traced_dims: Vec<usize> = sys.iter().map(|&p| dims[p]).collect();
    let out_dim = total_dim(&kept_dims);
    let traced_dim = total_dim(&traced_dims);

    let mut sources = Vec::with_capacity(out_dim * out_dim);
    let mut full_row = vec![0; dims.len()];
    let mut full_col = vec![0; dims.len()];
    for row in 0..out_dim {
        let row_digits = digits(row, &kept_dims);
        for col in 0..out_dim {
            let col_digits = digits(col, &kept_dims);
            let mut entry = Vec::with_capacity(traced_dim);
            for t in 0..traced_dim {
                let t_digits = digits(t, &traced_dims);
                for (k, &p) in kept.iter().enumerate() {
                    full_row[p] = row_digits[k];
                    full_col[p] = col_digits[k];
                }
                for (k, &p) in sys.iter().enumerate() {
                    full_row[p] = t_digits[k];
                    full_col[p] = t_digits[k];
                }
                entry.push(from_digits(&full_row, dims) * dim + from_digits(&full_col, dims));
            }
            sources.push(entry);
        }
    }
    (out_dim, sources)
}

/// Reorder tensor factors: new position `p` holds old subsystem `perm[p]`.
///
/// Returns the permuted dimension list and the flat output-to-input map.
pub fn permute_map(dims: &[usize], perm: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let new_dims: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
    let dim = total_dim(dims);
    let old_index = |new: usize| {
        let new_digits = digits(new, &new_dims);
        let mut old_digits = vec![0; dims.len()];
        for (p, &old) in perm.iter().enumerate() {
            old_digits[old] = new_digits[p];
        }
        from_digits(&old_digits, dims)
    };
    let rows: Vec<usize> = (0..dim).map(old_index).collect();
    let mut map = Vec::with_capacity(dim * dim);
    for &r in &rows {
        for &c in &rows {
            map.push(r * dim + c);
        }
    }
    (new_dims, map)
}

/// Inverse of a permutation given as a position list.
pub fn inverse_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (p, &q) in perm.iter().enumerate() {
        inv[q] = p;
    }
    inv
}

/// True when `perm` is a permutation of `0..n`.
pub fn is_permutation(perm: &[usize], n: usize) -> bool {
    if perm.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    for &p in perm {
        if p >= n || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}

/// All permutations of `0..k`, in lexicographic order.
pub fn permutations(k: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    let mut current: Vec<usize> = (0..k).collect();
    loop {
        out.push(current.clone());
        // next lexicographic permutation
        let Some(i) = (1..k).rev().find(|&i| current[i - 1] < current[i]) else {
            break;
        };
        let j = (i..k).rev().find(|&j| current[j] > current[i - 1]).unwrap_or(i);
        current.swap(i - 1, j);
        current[i..].reverse();
    }
    out
}
