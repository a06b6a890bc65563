// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distinguishability under arbitrary (global) measurements.

use super::common::{dual_slacks, measurement_operators, success_probability};
use super::{Criterion, DistinguishabilitySolver, MeasurementClass, Optimum};
use crate::core::Ensemble;
use crate::error::Result;
use crate::sdp::{Field, Problem, SdpBackend, Sense};

/// Engine for POVMs constrained only by `M_i ⪰ 0` and `Σ M_i = I`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Positive;

impl DistinguishabilitySolver for Positive {
    fn class(&self) -> MeasurementClass {
        MeasurementClass::Positive
    }

    fn primal(
        &self,
        ensemble: &Ensemble,
        criterion: Criterion,
        backend: &dyn SdpBackend,
    ) -> Result<Optimum> {
        let weighted = ensemble.weighted_operators();
        let mut p = Problem::over(Field::of(&weighted));
        let ops = measurement_operators(&mut p, &weighted, ensemble.dim(), criterion);
        p.set_objective(Sense::Maximize, success_probability(&ops, &weighted));

        let solved = p.solve(backend)?;
        Ok(Optimum {
            value: solved.value,
            measurements: ops.iter().map(|m| solved.matrix(m)).collect(),
        })
    }

    fn dual(&self, ensemble: &Ensemble, criterion: Criterion, backend: &dyn SdpBackend) -> Result<f64> {
        let weighted = ensemble.weighted_operators();
        let mut p = Problem::over(Field::of(&weighted));
        let y = p.hermitian(ensemble.dim());
        for slack in dual_slacks(&mut p, &y, &weighted, criterion) {
            p.constrain_psd(slack);
        }
        p.set_objective(Sense::Minimize, y.expr().trace());
        Ok(p.solve(backend)?.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{identity, is_psd, max_abs_diff, zeros};
    use crate::sdp::ClarabelBackend;
    use crate::test_utils::{bell_ensemble, mixed_qubit_pair, FailingBackend};
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use num_complex::Complex64;

    // ========================================================================
    // Min-error
    // ========================================================================

    #[test]
    fn test_bell_states_min_error() {
        let backend = ClarabelBackend::default();
        let optimum = Positive
            .primal(&bell_ensemble(), Criterion::MinError, &backend)
            .unwrap();
        assert_abs_diff_eq!(optimum.value, 1.0, epsilon = 1e-5);
        assert_eq!(optimum.measurements.len(), 4);
    }

    #[test]
    fn test_bell_states_min_error_dual() {
        let backend = ClarabelBackend::default();
        let value = Positive
            .dual(&bell_ensemble(), Criterion::MinError, &backend)
            .unwrap();
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_mixed_pair_matches_helstrom() {
        let backend = ClarabelBackend::default();
        let ensemble = mixed_qubit_pair();
        let primal = Positive.primal(&ensemble, Criterion::MinError, &backend).unwrap();
        let dual = Positive.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(primal.value, 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 0.75, epsilon = 1e-5);
    }

    #[test]
    fn test_measurements_form_povm() {
        let backend = ClarabelBackend::default();
        let optimum = Positive
            .primal(&mixed_qubit_pair(), Criterion::MinError, &backend)
            .unwrap();
        let sum = optimum
            .measurements
            .iter()
            .fold(zeros(2), |acc, m| acc + m);
        assert!(max_abs_diff(&sum, &identity(2)) < 1e-6);
        for m in &optimum.measurements {
            assert!(is_psd(m, 1e-6));
        }
    }

    // ========================================================================
    // Unambiguous
    // ========================================================================

    #[test]
    fn test_bell_states_unambiguous() {
        let backend = ClarabelBackend::default();
        let ensemble = bell_ensemble();
        let optimum = Positive.primal(&ensemble, Criterion::Unambiguous, &backend).unwrap();
        let dual = Positive.dual(&ensemble, Criterion::Unambiguous, &backend).unwrap();
        assert_abs_diff_eq!(optimum.value, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 1.0, epsilon = 1e-5);
        // inconclusive outcome last and unused
        assert_eq!(optimum.measurements.len(), 5);
        assert!(max_abs_diff(&optimum.measurements[4], &Array2::<Complex64>::zeros((4, 4))) < 1e-5);
    }

    #[test]
    fn test_unambiguous_mixed_pair_is_zero() {
        // full-rank states share their support, so no outcome can be conclusive
        let backend = ClarabelBackend::default();
        let value = Positive
            .primal(&mixed_qubit_pair(), Criterion::Unambiguous, &backend)
            .unwrap()
            .value;
        assert_abs_diff_eq!(value, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_backend_error_propagates() {
        let result = Positive.primal(&bell_ensemble(), Criterion::MinError, &FailingBackend);
        assert!(result.is_err());
    }
}
