// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distinguishability under separable measurements, approximated by the
//! symmetric-extension hierarchy.
//!
//! At level `k` every measurement operator `M_j` on `A ⊗ B` must extend to
//! an operator `X_j` on `A ⊗ B^{⊗k}` that is supported on the symmetric
//! subspace of the `B` copies, reduces to `M_j` and stays PSD under
//! partial transposition of `A` and of a single copy. The extension is
//! written `X_j = W Y_j W†` with `W = I_A ⊗ V`, where `V` is the isometry
//! onto the symmetric subspace and `Y_j ⪰ 0`, so Bose symmetry holds by
//! construction.
//!
//! Two reductions keep the cones small. `W` acts trivially on `A`, so
//! `PT_A(X_j) = W PT_A(Y_j) W†` and the constraint is imposed on `Y_j`
//! directly. Permuting the copies leaves `X_j` fixed and maps the partial
//! transpose of one copy to that of another, so one copy suffices.
//!
//! Level 1 coincides with the PPT relaxation; raising the level tightens
//! the bound.
//!
//! # References
//!
//! - A. C. Doherty, P. A. Parrilo, F. M. Spedalieri, "Complete family of
//!   separability criteria", Phys. Rev. A 69, 022308 (2004).
//!   arXiv:quant-ph/0308032

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::common::{dual_slacks, measurement_operators, success_probability, ONE};
use super::{Criterion, DistinguishabilitySolver, MeasurementClass, Optimum};
use crate::core::{Ensemble, Party};
use crate::error::{Error, Result};
use crate::operators::index::inverse_permutation;
use crate::operators::{
    dagger, identity, kron, permute_systems, symmetric_dim, symmetric_isometry,
};
use crate::sdp::{Field, Problem, SdpBackend, Sense};

/// Engine for the level-`k` symmetric-extension relaxation.
#[derive(Debug, Clone, Copy)]
pub struct Separable {
    level: usize,
}

impl Separable {
    /// Create an engine at hierarchy level `level ≥ 1`.
    pub fn new(level: usize) -> Result<Self> {
        if level == 0 {
            return Err(Error::Config("hierarchy level must be at least 1".to_string()));
        }
        Ok(Self { level })
    }

    /// Hierarchy level.
    pub fn level(&self) -> usize {
        self.level
    }
}

/// Subsystem bookkeeping for one ensemble at one level.
///
/// Operators are regrouped so that party A's subsystems come first,
/// giving the base space `A ⊗ B` and the extended space `A ⊗ B_1 ⊗ ... ⊗ B_k`.
struct Extension {
    perm: Vec<usize>,
    permuted_dims: Vec<usize>,
    dim_a: usize,
    dim_b: usize,
    level: usize,
}

impl Extension {
    fn new(ensemble: &Ensemble, level: usize) -> Self {
        let state = &ensemble[0];
        let perm: Vec<usize> = state
            .party_positions(Party::A)
            .into_iter()
            .chain(state.party_positions(Party::B))
            .collect();
        let dims = ensemble.dims();
        let permuted_dims: Vec<usize> = perm.iter().map(|&p| dims[p]).collect();
        let dim_a = state
            .party_positions(Party::A)
            .iter()
            .map(|&p| dims[p])
            .product();
        let dim_b = state
            .party_positions(Party::B)
            .iter()
            .map(|&p| dims[p])
            .product();
        Self {
            perm,
            permuted_dims,
            dim_a,
            dim_b,
            level,
        }
    }

    /// `[d_A, d_B, ..., d_B]` with `k` copies of `B`.
    fn dims(&self) -> Vec<usize> {
        std::iter::once(self.dim_a)
            .chain(std::iter::repeat(self.dim_b).take(self.level))
            .collect()
    }

    fn dim(&self) -> usize {
        self.dim_a * self.dim_b.pow(self.level as u32)
    }

    /// Positions of the extra copies `B_2..B_k` in [`Extension::dims`].
    fn copies(&self) -> Vec<usize> {
        (2..=self.level).collect()
    }

    /// Copy whose partial transpose is constrained, if `k ≥ 2`.
    fn transposed_copy(&self) -> Option<usize> {
        (self.level >= 2).then_some(self.level)
    }

    /// `[d_A, s]` with `s = C(d_B + k − 1, k)`: the space of `Y`.
    fn reduced_dims(&self) -> [usize; 2] {
        [self.dim_a, symmetric_dim(self.dim_b, self.level)]
    }

    fn reduced_dim(&self) -> usize {
        self.reduced_dims().iter().product()
    }

    /// `I_A ⊗ V`, shape `d_A d_B^k × d_A s`.
    fn isometry(&self) -> Array2<Complex64> {
        kron(&identity(self.dim_a), &symmetric_isometry(self.dim_b, self.level))
    }

    /// Weighted states `p_i ρ_i` regrouped as `A ⊗ B`.
    fn weighted(&self, ensemble: &Ensemble) -> Result<Vec<Array2<Complex64>>> {
        ensemble
            .weighted_operators()
            .iter()
            .map(|w| permute_systems(w, ensemble.dims(), &self.perm))
            .collect()
    }

    /// Undo the regrouping on a base-space operator.
    fn restore(&self, op: &Array2<Complex64>) -> Result<Array2<Complex64>> {
        permute_systems(op, &self.permuted_dims, &inverse_permutation(&self.perm))
    }
}

impl DistinguishabilitySolver for Separable {
    fn class(&self) -> MeasurementClass {
        MeasurementClass::Separable
    }

    fn primal(
        &self,
        ensemble: &Ensemble,
        criterion: Criterion,
        backend: &dyn SdpBackend,
    ) -> Result<Optimum> {
        let ext = Extension::new(ensemble, self.level);
        let weighted = ext.weighted(ensemble)?;
        let ext_dims = ext.dims();
        let copies = ext.copies();
        let reduced_dims = ext.reduced_dims();
        let w = ext.isometry();
        let wd = dagger(&w);
        debug!(
            level = self.level,
            dim_a = ext.dim_a,
            dim_b = ext.dim_b,
            extended_dim = ext.dim(),
            reduced_dim = ext.reduced_dim(),
            "Building symmetric extension"
        );

        let mut p = Problem::over(Field::of(&weighted));
        let ops = measurement_operators(&mut p, &weighted, ensemble.dim(), criterion);
        for m in &ops {
            let y = p.psd(ext.reduced_dim());
            p.constrain_psd(y.expr().partial_transpose(&reduced_dims, &[0]));
            let x = y.expr().sandwich(&w, &wd);
            p.constrain_hermitian_eq(&x.partial_trace(&ext_dims, &copies), &m.expr());
            if let Some(c) = ext.transposed_copy() {
                p.constrain_psd(x.partial_transpose(&ext_dims, &[c]));
            }
        }
        p.set_objective(Sense::Maximize, success_probability(&ops, &weighted));

        let solved = p.solve(backend)?;
        let measurements = ops
            .iter()
            .map(|m| ext.restore(&solved.matrix(m)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Optimum {
            value: solved.value,
            measurements,
        })
    }

    /// `min Tr H` s.t. `E_j − Q_j ⪰ 0`, `S_j, Z_j ⪰ 0` and
    /// `W†(Q_j ⊗ I − PT_{B_k}(Z_j))W − PT_A(S_j) ⪰ 0`, the `Z_j` term only
    /// for `k ≥ 2`.
    fn dual(&self, ensemble: &Ensemble, criterion: Criterion, backend: &dyn SdpBackend) -> Result<f64> {
        let ext = Extension::new(ensemble, self.level);
        let weighted = ext.weighted(ensemble)?;
        let ext_dims = ext.dims();
        let reduced_dims = ext.reduced_dims();
        let w = ext.isometry();
        let dim = ensemble.dim();
        let padding = ext.dim_b.pow(self.level as u32 - 1);

        let mut p = Problem::over(Field::of(&weighted));
        let h = p.hermitian(dim);
        for slack in dual_slacks(&mut p, &h, &weighted, criterion) {
            let q = p.hermitian(dim);
            p.constrain_psd(&slack - &q.expr());

            let mut coupling = q.expr().kron_identity(padding);
            if let Some(c) = ext.transposed_copy() {
                let z = p.psd(ext.dim());
                coupling = coupling.add_scaled(&z.expr().partial_transpose(&ext_dims, &[c]), -ONE);
            }
            let s = p.psd(ext.reduced_dim());
            p.constrain_psd(
                coupling
                    .congruence(&w)
                    .add_scaled(&s.expr().partial_transpose(&reduced_dims, &[0]), -ONE),
            );
        }
        p.set_objective(Sense::Minimize, h.expr().trace());
        Ok(p.solve(backend)?.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{identity, max_abs_diff, zeros};
    use crate::opt_dist::Ppt;
    use crate::sdp::ClarabelBackend;
    use crate::test_utils::{bell_ensemble, resource_ensemble, tiles_ensemble, ydy_ensemble};
    use approx::assert_abs_diff_eq;

    // ========================================================================
    // Layout
    // ========================================================================

    #[test]
    fn test_zero_level_rejected() {
        assert!(matches!(Separable::new(0), Err(Error::Config(_))));
        assert_eq!(Separable::new(3).unwrap().level(), 3);
    }

    #[test]
    fn test_extension_layout() {
        let ext = Extension::new(&bell_ensemble(), 2);
        assert_eq!(ext.dims(), vec![2, 2, 2]);
        assert_eq!(ext.dim(), 8);
        assert_eq!(ext.copies(), vec![2]);
        assert_eq!(ext.transposed_copy(), Some(2));
        // two qubits: three symmetric basis vectors per A level
        assert_eq!(ext.reduced_dims(), [2, 3]);
        assert_eq!(ext.isometry().dim(), (8, 6));

        let ext = Extension::new(&bell_ensemble(), 1);
        assert!(ext.copies().is_empty());
        assert_eq!(ext.transposed_copy(), None);
        assert_eq!(ext.reduced_dim(), 4);
    }

    #[test]
    fn test_extension_groups_parties() {
        // labels A_1 ⊗ A_3 ⊗ B_2 ⊗ B_4 are already grouped
        let ext = Extension::new(&resource_ensemble(0.5), 1);
        assert_eq!(ext.perm, vec![0, 1, 2, 3]);
        assert_eq!((ext.dim_a, ext.dim_b), (4, 4));

        // labels 1..4 in order interleave the parties
        let ext = Extension::new(&ydy_ensemble(), 1);
        assert_eq!(ext.perm, vec![0, 2, 1, 3]);
        let ensemble = ydy_ensemble();
        let grouped = ext.weighted(&ensemble).unwrap();
        let restored = ext.restore(&grouped[1]).unwrap();
        assert!(max_abs_diff(&restored, &ensemble.weighted_operators()[1]) < 1e-15);
    }

    // ========================================================================
    // Bell states
    // ========================================================================

    #[test]
    fn test_bell_states_level_one_matches_ppt() {
        let backend = ClarabelBackend::default();
        let sep = Separable::new(1).unwrap();
        let optimum = sep.primal(&bell_ensemble(), Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(optimum.value, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_bell_states_level_two() {
        let backend = ClarabelBackend::default();
        let sep = Separable::new(2).unwrap();
        let ensemble = bell_ensemble();
        let optimum = sep.primal(&ensemble, Criterion::MinError, &backend).unwrap();
        let dual = sep.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(optimum.value, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 0.5, epsilon = 1e-5);

        let sum = optimum.measurements.iter().fold(zeros(4), |acc, m| acc + m);
        assert!(max_abs_diff(&sum, &identity(4)) < 1e-5);
    }

    #[test]
    fn test_bell_states_level_three() {
        let backend = ClarabelBackend::default();
        let sep = Separable::new(3).unwrap();
        let ensemble = bell_ensemble();
        let primal = sep.primal(&ensemble, Criterion::MinError, &backend).unwrap().value;
        let dual = sep.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(primal, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_bell_states_unambiguous() {
        // no PPT outcome can be conclusive for a Bell state without
        // firing on another one
        let backend = ClarabelBackend::default();
        let ensemble = bell_ensemble();
        let ppt = Ppt
            .primal(&ensemble, Criterion::Unambiguous, &backend)
            .unwrap()
            .value;
        for level in [1, 2] {
            let sep = Separable::new(level).unwrap();
            let optimum = sep.primal(&ensemble, Criterion::Unambiguous, &backend).unwrap();
            let dual = sep.dual(&ensemble, Criterion::Unambiguous, &backend).unwrap();
            assert_abs_diff_eq!(optimum.value, 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(optimum.value, dual, epsilon = 1e-5);
            assert!(optimum.value <= ppt + 1e-6);
            // inconclusive outcome last and carries everything
            assert_eq!(optimum.measurements.len(), 5);
            assert!(max_abs_diff(&optimum.measurements[4], &identity(4)) < 1e-4);
        }
    }

    #[test]
    fn test_resource_state_level_one() {
        let eps: f64 = 0.5;
        let backend = ClarabelBackend::default();
        let sep = Separable::new(1).unwrap();
        let value = sep
            .primal(&resource_ensemble(eps), Criterion::MinError, &backend)
            .unwrap()
            .value;
        assert_abs_diff_eq!(value, 0.5 * (1.0 + (1.0 - eps * eps).sqrt()), epsilon = 1e-4);
    }

    // ========================================================================
    // Strictly below PPT
    // ========================================================================

    #[test]
    fn test_tiles_level_two_below_ppt() {
        // the complement of the tiles basis holds no product vector, so the
        // perfect PPT measurement onto it is entangled
        let backend = ClarabelBackend::default();
        let ensemble = tiles_ensemble();
        let ppt = Ppt.primal(&ensemble, Criterion::MinError, &backend).unwrap().value;
        assert_abs_diff_eq!(ppt, 1.0, epsilon = 1e-5);

        let sep = Separable::new(2).unwrap();
        let primal = sep.primal(&ensemble, Criterion::MinError, &backend).unwrap().value;
        let dual = sep.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(primal, dual, epsilon = 1e-5);
        assert!(primal < ppt - 1e-4, "level 2 gave {}", primal);
        assert!(primal >= 0.5);
    }

    #[test]
    #[ignore = "4 x 4 extension at level 2; run with --release"]
    fn test_ydy_level_two() {
        let backend = ClarabelBackend::default();
        let mut ensemble = ydy_ensemble();
        ensemble.swap(&[2, 3]).unwrap();
        let sep = Separable::new(2).unwrap();
        let value = sep.primal(&ensemble, Criterion::MinError, &backend).unwrap().value;
        assert_abs_diff_eq!(value, 0.75, epsilon = 1e-3);
    }
}
