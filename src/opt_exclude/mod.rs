// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Optimal state exclusion.
//!
//! Instead of naming the prepared state, outcome `i` claims "the state was
//! not `ρ_i`". Success means never claiming this about the state that was
//! actually prepared, so both criteria report a probability to be made
//! small:
//!
//! - [`Criterion::MinError`]: the smallest probability of excluding the
//!   prepared state, `min Σ_i p_i Tr(ρ_i M_i)` over complete measurements.
//! - [`Criterion::Unambiguous`]: outcomes never exclude the prepared state,
//!   `p_i Tr(ρ_i M_i) = 0`, and the value is the smallest probability of the
//!   inconclusive outcome.
//!
//! Positive and PPT measurement classes are offered.
//!
//! # References
//!
//! - S. Bandyopadhyay, R. Jain, J. Oppenheim, C. Perry, "Conclusive
//!   exclusion of quantum states", Phys. Rev. A 89, 022336 (2014).
//!   arXiv:1306.4683

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info};

use crate::config::SolverConfig;
use crate::core::{Ensemble, Party};
use crate::error::{Error, Result};
use crate::opt_dist::common::{constrain_completeness, success_probability, ONE};
use crate::opt_dist::{Criterion, MeasurementClass, Optimum};
use crate::operators::{identity, zeros};
use crate::sdp::{backend_for, Field, HermitianVar, MatExpr, Problem, SdpBackend, Sense};

/// Exclusion task: an ensemble, a measurement class and a criterion,
/// solved on demand.
pub struct OptExclude<'a> {
    ensemble: &'a Ensemble,
    class: MeasurementClass,
    criterion: Criterion,
    config: SolverConfig,
    value: Option<f64>,
    measurements: Vec<Array2<Complex64>>,
}

impl<'a> OptExclude<'a> {
    /// Create a task. Separable exclusion is not offered.
    pub fn new(
        ensemble: &'a Ensemble,
        class: MeasurementClass,
        criterion: Criterion,
        config: SolverConfig,
    ) -> Result<Self> {
        if class == MeasurementClass::Separable {
            return Err(Error::UnsupportedMeasurementClass(format!(
                "{} (exclusion)",
                class
            )));
        }
        config.validate()?;
        Ok(Self {
            ensemble,
            class,
            criterion,
            config,
            value: None,
            measurements: Vec::new(),
        })
    }

    /// Solve with the backend named in the configuration.
    pub fn solve(&mut self) -> Result<f64> {
        let backend = backend_for(&self.config);
        self.solve_with(backend.as_ref())
    }

    /// Solve with an explicit backend.
    pub fn solve_with(&mut self, backend: &dyn SdpBackend) -> Result<f64> {
        let keep = self.config.return_measurements;

        // one state can only be excluded wrongly or not at all
        if self.ensemble.len() == 1 {
            let dim = self.ensemble.dim();
            self.value = Some(1.0);
            self.measurements = match (keep, self.criterion) {
                (false, _) => Vec::new(),
                (true, Criterion::MinError) => vec![identity(dim)],
                (true, Criterion::Unambiguous) => vec![zeros(dim), identity(dim)],
            };
            return Ok(1.0);
        }

        let pt_sys = match self.class {
            MeasurementClass::Ppt => Some(self.ensemble[0].party_positions(Party::B)),
            _ => None,
        };
        debug!(
            class = %self.class,
            criterion = %self.criterion,
            states = self.ensemble.len(),
            primal = keep,
            "Solving exclusion SDP"
        );

        let value = if keep {
            let optimum = primal(self.ensemble, self.criterion, pt_sys.as_deref(), backend)?;
            self.measurements = optimum.measurements;
            optimum.value
        } else {
            self.measurements.clear();
            dual(self.ensemble, self.criterion, pt_sys.as_deref(), backend)?
        };

        info!(
            class = %self.class,
            criterion = %self.criterion,
            value,
            "Exclusion solved"
        );
        self.value = Some(value);
        Ok(value)
    }

    /// Optimal value of the last solve.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Optimal measurement of the last solve; for the unambiguous criterion
    /// the inconclusive element comes last.
    pub fn measurements(&self) -> &[Array2<Complex64>] {
        &self.measurements
    }

    pub fn class(&self) -> MeasurementClass {
        self.class
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }
}

/// `expr − PT(V)` for a fresh `V ⪰ 0` when `pt_sys` is set.
fn relax_ppt(p: &mut Problem, expr: MatExpr, dims: &[usize], pt_sys: Option<&[usize]>) -> MatExpr {
    match pt_sys {
        Some(sys) => {
            let v = p.psd(expr.rows());
            expr.add_scaled(&v.expr().partial_transpose(dims, sys), -ONE)
        }
        None => expr,
    }
}

fn primal(
    ensemble: &Ensemble,
    criterion: Criterion,
    pt_sys: Option<&[usize]>,
    backend: &dyn SdpBackend,
) -> Result<Optimum> {
    let dim = ensemble.dim();
    let weighted = ensemble.weighted_operators();
    let outcomes = match criterion {
        Criterion::MinError => weighted.len(),
        Criterion::Unambiguous => weighted.len() + 1,
    };

    let mut p = Problem::over(Field::of(&weighted));
    let ops: Vec<HermitianVar> = (0..outcomes).map(|_| p.psd(dim)).collect();
    constrain_completeness(&mut p, &ops, dim);
    if let Some(sys) = pt_sys {
        for m in &ops {
            p.constrain_psd(m.expr().partial_transpose(ensemble.dims(), sys));
        }
    }

    let objective = match criterion {
        Criterion::MinError => success_probability(&ops, &weighted),
        Criterion::Unambiguous => {
            for (m, w) in ops.iter().zip(&weighted) {
                p.constrain_zero(&m.expr().inner_const(w));
            }
            // Tr(ρ̄ M_?) = 1 − Σ_j Tr(ρ̄ M_j)
            ops[outcomes - 1].expr().inner_const(&ensemble.average_state())
        }
    };
    p.set_objective(Sense::Minimize, objective);

    let solved = p.solve(backend)?;
    Ok(Optimum {
        value: solved.value,
        measurements: ops.iter().map(|m| solved.matrix(m)).collect(),
    })
}

fn dual(
    ensemble: &Ensemble,
    criterion: Criterion,
    pt_sys: Option<&[usize]>,
    backend: &dyn SdpBackend,
) -> Result<f64> {
    let dim = ensemble.dim();
    let dims = ensemble.dims();
    let weighted = ensemble.weighted_operators();

    let mut p = Problem::over(Field::of(&weighted));
    let y = p.hermitian(dim);
    match criterion {
        Criterion::MinError => {
            // max Tr Y  s.t.  p_i ρ_i − Y ⪰ PT(V_i)
            for w in &weighted {
                let slack = MatExpr::constant(w).add_scaled(&y.expr(), -ONE);
                let slack = relax_ppt(&mut p, slack, dims, pt_sys);
                p.constrain_psd(slack);
            }
            p.set_objective(Sense::Maximize, y.expr().trace());
            Ok(p.solve(backend)?.value)
        }
        Criterion::Unambiguous => {
            // 1 − min Tr Y  s.t.  Y ⪰ PT(V_?),  Y − ρ̄ + a_j p_j ρ_j ⪰ PT(V_j)
            let average = ensemble.average_state();
            for w in &weighted {
                let a = p.scalar();
                let slack = y.expr().add_constant(&average, -ONE).add_scalar_times(w, &a.expr());
                let slack = relax_ppt(&mut p, slack, dims, pt_sys);
                p.constrain_psd(slack);
            }
            let inconclusive = relax_ppt(&mut p, y.expr(), dims, pt_sys);
            p.constrain_psd(inconclusive);
            p.set_objective(Sense::Minimize, y.expr().trace());
            Ok(1.0 - p.solve(backend)?.value)
        }
    }
}
