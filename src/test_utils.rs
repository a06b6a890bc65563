// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared test utilities: canonical states, ensembles and backends.

use ndarray::{Array1, Array2};
use num_complex::Complex64;

use crate::core::{Ensemble, State};
use crate::error::SolverError;
use crate::operators::{identity, kron, outer, swap_operator};
use crate::sdp::{ConicProblem, SdpBackend, Solution};

/// Backend that fails every solve with a numerical error.
pub struct FailingBackend;

impl SdpBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn solve(&self, _problem: &ConicProblem) -> Result<Solution, SolverError> {
        Err(SolverError::Numerical("mock failure".to_string()))
    }
}

/// Unnormalised real ket.
pub fn ket(amps: &[f64]) -> Array1<Complex64> {
    amps.iter().map(|&a| Complex64::new(a, 0.0)).collect()
}

/// Pure state from real amplitudes, normalised.
pub fn pure(amps: &[f64], dims: &[usize]) -> State {
    let norm = amps.iter().map(|a| a * a).sum::<f64>().sqrt();
    let psi = ket(amps) / Complex64::new(norm, 0.0);
    State::from_vector(&psi, dims.to_vec()).unwrap()
}

/// Bell state vectors in the order
/// `(|00>+|11>)/√2, (|00>−|11>)/√2, (|01>+|10>)/√2, (|01>−|10>)/√2`.
pub fn bell_vector(i: usize) -> Array1<Complex64> {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let amps = match i {
        0 => [h, 0.0, 0.0, h],
        1 => [h, 0.0, 0.0, -h],
        2 => [0.0, h, h, 0.0],
        3 => [0.0, h, -h, 0.0],
        _ => panic!("Bell index out of range: {}", i),
    };
    ket(&amps)
}

/// Density matrix of the `i`-th Bell state.
pub fn bell_state(i: usize) -> Array2<Complex64> {
    outer(&bell_vector(i))
}

/// The four Bell states with uniform priors.
pub fn bell_ensemble() -> Ensemble {
    let states = (0..4)
        .map(|i| State::new(bell_state(i), vec![2, 2]).unwrap())
        .collect();
    Ensemble::new(states, None).unwrap()
}

/// `3/4|+><+| + 1/4|−><−|` and the reverse mixture, uniform priors.
pub fn mixed_qubit_pair() -> Ensemble {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let plus = outer(&ket(&[h, h]));
    let minus = outer(&ket(&[h, -h]));
    let mix = |a: f64, b: f64| &plus * Complex64::new(a, 0.0) + &minus * Complex64::new(b, 0.0);
    let states = vec![
        State::new(mix(0.75, 0.25), vec![2]).unwrap(),
        State::new(mix(0.25, 0.75), vec![2]).unwrap(),
    ];
    Ensemble::new(states, None).unwrap()
}

/// Werner hiding pair on `C^n ⊗ C^n`: the normalised symmetric and
/// antisymmetric projectors, with priors `1/2`.
pub fn werner_pair(n: usize) -> Ensemble {
    let d = (n * n) as f64;
    let id = identity(n * n);
    let flip = swap_operator(n);
    let sym = (&id + &flip) / Complex64::new(n as f64 * (n as f64 + 1.0), 0.0);
    let anti = (&id - &flip) / Complex64::new(d - n as f64, 0.0);
    let states = vec![
        State::new(sym, vec![n, n]).unwrap(),
        State::new(anti, vec![n, n]).unwrap(),
    ];
    Ensemble::new(states, None).unwrap()
}

/// The four YDY states `b0⊗b0, b2⊗b1, b3⊗b1, b1⊗b1` on four qubits with
/// uniform priors (arXiv:1107.3224).
pub fn ydy_ensemble() -> Ensemble {
    let pairs = [(0, 0), (2, 1), (3, 1), (1, 1)];
    let states = pairs
        .iter()
        .map(|&(a, b)| State::new(kron(&bell_state(a), &bell_state(b)), vec![2, 2, 2, 2]).unwrap())
        .collect();
    Ensemble::new(states, None).unwrap()
}

/// Bell states each paired with the resource `√((1+ε)/2)|00> +
/// √((1−ε)/2)|11>`, relabelled so subsystems read `A_1 ⊗ A_3 ⊗ B_2 ⊗ B_4`.
pub fn resource_ensemble(eps: f64) -> Ensemble {
    let tau = outer(&ket(&[
        ((1.0 + eps) / 2.0).sqrt(),
        0.0,
        0.0,
        ((1.0 - eps) / 2.0).sqrt(),
    ]));
    let states = (0..4)
        .map(|i| State::new(kron(&bell_state(i), &tau), vec![2, 2, 2, 2]).unwrap())
        .collect();
    let mut ensemble = Ensemble::new(states, None).unwrap();
    ensemble.swap(&[2, 3]).unwrap();
    ensemble
}

/// Tiles unextendible product basis on `C^3 ⊗ C^3`: the bound entangled
/// state on its complement and the normalised projector onto its span,
/// with priors `1/2`.
pub fn tiles_ensemble() -> Ensemble {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let t = 1.0 / 3f64.sqrt();
    let tiles: [([f64; 3], [f64; 3]); 5] = [
        ([1.0, 0.0, 0.0], [h, -h, 0.0]),
        ([h, -h, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [0.0, h, -h]),
        ([0.0, h, -h], [1.0, 0.0, 0.0]),
        ([t, t, t], [t, t, t]),
    ];
    let span = tiles.iter().fold(Array2::zeros((9, 9)), |acc, (a, b)| {
        let amps: Vec<f64> = a.iter().flat_map(|x| b.iter().map(move |y| x * y)).collect();
        acc + outer(&ket(&amps))
    });
    let complement = (identity(9) - &span) / Complex64::new(4.0, 0.0);
    let states = vec![
        State::new(complement, vec![3, 3]).unwrap(),
        State::new(span / Complex64::new(5.0, 0.0), vec![3, 3]).unwrap(),
    ];
    Ensemble::new(states, None).unwrap()
}

/// Deterministic dense complex matrix with entries in `[-1, 1]`.
pub fn random_like_matrix(n: usize, seed: u64) -> Array2<Complex64> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64 / (1u64 << 53) as f64) * 2.0 - 1.0
    };
    Array2::from_shape_fn((n, n), |_| {
        let re = next();
        let im = next();
        Complex64::new(re, im)
    })
}

/// Assert two matrices agree entrywise within `tol`.
pub fn assert_matrix_close(a: &Array2<Complex64>, b: &Array2<Complex64>, tol: f64) {
    assert_eq!(a.dim(), b.dim(), "shape mismatch");
    for ((idx, x), y) in a.indexed_iter().zip(b.iter()) {
        assert!(
            (x - y).norm() <= tol,
            "entry {:?} differs: {} vs {} (tol {})",
            idx,
            x,
            y,
            tol
        );
    }
}
