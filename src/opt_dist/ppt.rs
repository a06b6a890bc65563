// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Distinguishability under PPT measurements.
//!
//! Every measurement operator must stay PSD under partial transposition of
//! party B's subsystems. The PPT value upper-bounds the separable value and
//! lower-bounds the global value.

use super::common::{dual_slacks, measurement_operators, success_probability, ONE};
use super::{Criterion, DistinguishabilitySolver, MeasurementClass, Optimum};
use crate::core::{Ensemble, Party};
use crate::error::Result;
use crate::sdp::{Field, Problem, SdpBackend, Sense};

/// Engine for measurements with positive partial transpose.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ppt;

impl DistinguishabilitySolver for Ppt {
    fn class(&self) -> MeasurementClass {
        MeasurementClass::Ppt
    }

    fn primal(
        &self,
        ensemble: &Ensemble,
        criterion: Criterion,
        backend: &dyn SdpBackend,
    ) -> Result<Optimum> {
        let dims = ensemble.dims();
        let sys = ensemble[0].party_positions(Party::B);
        let weighted = ensemble.weighted_operators();

        let mut p = Problem::over(Field::of(&weighted));
        let ops = measurement_operators(&mut p, &weighted, ensemble.dim(), criterion);
        for m in &ops {
            p.constrain_psd(m.expr().partial_transpose(dims, &sys));
        }
        p.set_objective(Sense::Maximize, success_probability(&ops, &weighted));

        let solved = p.solve(backend)?;
        Ok(Optimum {
            value: solved.value,
            measurements: ops.iter().map(|m| solved.matrix(m)).collect(),
        })
    }

    /// `min Tr Y` s.t. `E_j − PT(V_j) ⪰ 0`, `V_j ⪰ 0`.
    fn dual(&self, ensemble: &Ensemble, criterion: Criterion, backend: &dyn SdpBackend) -> Result<f64> {
        let dim = ensemble.dim();
        let dims = ensemble.dims();
        let sys = ensemble[0].party_positions(Party::B);
        let weighted = ensemble.weighted_operators();

        let mut p = Problem::over(Field::of(&weighted));
        let y = p.hermitian(dim);
        for slack in dual_slacks(&mut p, &y, &weighted, criterion) {
            let v = p.psd(dim);
            p.constrain_psd(slack.add_scaled(&v.expr().partial_transpose(dims, &sys), -ONE));
        }
        p.set_objective(Sense::Minimize, y.expr().trace());
        Ok(p.solve(backend)?.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{is_psd, partial_transpose};
    use crate::sdp::ClarabelBackend;
    use crate::test_utils::{bell_ensemble, resource_ensemble, werner_pair, ydy_ensemble};
    use approx::assert_abs_diff_eq;

    // ========================================================================
    // Bell states
    // ========================================================================

    #[test]
    fn test_bell_states_min_error() {
        let backend = ClarabelBackend::default();
        let ensemble = bell_ensemble();
        let optimum = Ppt.primal(&ensemble, Criterion::MinError, &backend).unwrap();
        let dual = Ppt.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        assert_abs_diff_eq!(optimum.value, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_measurements_are_ppt() {
        let backend = ClarabelBackend::default();
        let optimum = Ppt
            .primal(&bell_ensemble(), Criterion::MinError, &backend)
            .unwrap();
        for m in &optimum.measurements {
            assert!(is_psd(&partial_transpose(m, &[2, 2], &[1]).unwrap(), 1e-6));
        }
    }

    // ========================================================================
    // Werner hiding pair, n = 2
    // ========================================================================

    #[test]
    fn test_werner_pair_min_error() {
        let backend = ClarabelBackend::default();
        let ensemble = werner_pair(2);
        let primal = Ppt.primal(&ensemble, Criterion::MinError, &backend).unwrap();
        let dual = Ppt.dual(&ensemble, Criterion::MinError, &backend).unwrap();
        // 1/2 + 1/(n + 1)
        assert_abs_diff_eq!(primal.value, 5.0 / 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 5.0 / 6.0, epsilon = 1e-5);
    }

    #[test]
    fn test_werner_pair_unambiguous() {
        let backend = ClarabelBackend::default();
        let ensemble = werner_pair(2);
        let primal = Ppt.primal(&ensemble, Criterion::Unambiguous, &backend).unwrap();
        let dual = Ppt.dual(&ensemble, Criterion::Unambiguous, &backend).unwrap();
        assert_abs_diff_eq!(primal.value, 1.0 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(dual, 1.0 / 3.0, epsilon = 1e-5);
    }

    // ========================================================================
    // YDY ensemble
    // ========================================================================

    #[test]
    fn test_ydy_min_error() {
        let backend = ClarabelBackend::default();
        let value = Ppt
            .primal(&ydy_ensemble(), Criterion::MinError, &backend)
            .unwrap()
            .value;
        assert_abs_diff_eq!(value, 7.0 / 8.0, epsilon = 1e-4);
    }

    #[test]
    fn test_ydy_unambiguous() {
        let backend = ClarabelBackend::default();
        let value = Ppt
            .dual(&ydy_ensemble(), Criterion::Unambiguous, &backend)
            .unwrap();
        assert_abs_diff_eq!(value, 3.0 / 4.0, epsilon = 1e-4);
    }

    #[test]
    fn test_resource_state_min_error() {
        let eps: f64 = 0.5;
        let backend = ClarabelBackend::default();
        let value = Ppt
            .primal(&resource_ensemble(eps), Criterion::MinError, &backend)
            .unwrap()
            .value;
        assert_abs_diff_eq!(value, 0.5 * (1.0 + (1.0 - eps * eps).sqrt()), epsilon = 1e-4);
    }
}
