// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Optimal state distinguishability.
//!
//! Given an ensemble `{(p_i, ρ_i)}`, find the largest probability of
//! identifying the prepared state with a measurement drawn from one of
//! three classes, nested as `Separable ⊆ Ppt ⊆ Positive`:
//!
//! - [`Positive`]: every POVM
//! - [`Ppt`]: POVMs whose elements have positive partial transpose
//! - [`Separable`]: separable POVMs, via the symmetric-extension hierarchy
//!
//! Two criteria are supported. [`Criterion::MinError`] always names a state;
//! [`Criterion::Unambiguous`] never names a wrong state but may return an
//! inconclusive outcome.
//!
//! Each engine solves either the primal SDP, which yields the optimal
//! measurement, or its Lagrange dual, which yields only the value.
//!
//! # References
//!
//! - C. W. Helstrom, "Quantum Detection and Estimation Theory" (1976)
//! - N. Yu, R. Duan, M. Ying, "Four locally indistinguishable ququad-ququad
//!   orthogonal maximally entangled states", arXiv:1107.3224

pub(crate) mod common;
mod positive;
mod ppt;
mod separable;

pub use positive::Positive;
pub use ppt::Ppt;
pub use separable::Separable;

use std::fmt;
use std::str::FromStr;

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::SolverConfig;
use crate::core::Ensemble;
use crate::error::{Error, Result};
use crate::operators::{identity, trace_norm, zeros};
use crate::sdp::{backend_for, SdpBackend};

/// Class of measurements the optimisation ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementClass {
    Positive,
    Ppt,
    Separable,
}

impl fmt::Display for MeasurementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementClass::Positive => write!(f, "positive"),
            MeasurementClass::Ppt => write!(f, "ppt"),
            MeasurementClass::Separable => write!(f, "separable"),
        }
    }
}

impl FromStr for MeasurementClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(MeasurementClass::Positive),
            "ppt" => Ok(MeasurementClass::Ppt),
            "separable" | "sep" => Ok(MeasurementClass::Separable),
            other => Err(Error::UnsupportedMeasurementClass(other.to_string())),
        }
    }
}

/// What counts as success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criterion {
    /// Always guess; maximise the probability of guessing right
    MinError,
    /// Never guess wrong; maximise the probability of a conclusive outcome
    Unambiguous,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::MinError => write!(f, "min-error"),
            Criterion::Unambiguous => write!(f, "unambiguous"),
        }
    }
}

impl FromStr for Criterion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "min-error" | "min_error" | "minerror" => Ok(Criterion::MinError),
            "unambiguous" | "unambig" => Ok(Criterion::Unambiguous),
            other => Err(Error::UnsupportedCriterion(other.to_string())),
        }
    }
}

/// Optimal value with the measurement attaining it.
///
/// Measurements are ordered like the ensemble; for the unambiguous
/// criterion the inconclusive element comes last.
#[derive(Debug, Clone)]
pub struct Optimum {
    pub value: f64,
    pub measurements: Vec<Array2<Complex64>>,
}

/// The interface shared by the three measurement-class engines.
pub trait DistinguishabilitySolver {
    /// Measurement class handled by this engine.
    fn class(&self) -> MeasurementClass;

    /// Solve the primal problem for the value and an optimal measurement.
    fn primal(
        &self,
        ensemble: &Ensemble,
        criterion: Criterion,
        backend: &dyn SdpBackend,
    ) -> Result<Optimum>;

    /// Solve the dual problem for the value only.
    fn dual(&self, ensemble: &Ensemble, criterion: Criterion, backend: &dyn SdpBackend) -> Result<f64>;
}

/// Engine for `class`, using `level` for the separable hierarchy.
pub fn engine(class: MeasurementClass, level: usize) -> Result<Box<dyn DistinguishabilitySolver>> {
    Ok(match class {
        MeasurementClass::Positive => Box::new(Positive),
        MeasurementClass::Ppt => Box::new(Ppt),
        MeasurementClass::Separable => Box::new(Separable::new(level)?),
    })
}

/// Two-state Helstrom value `1/2 + 1/2 ‖p_1 ρ_1 − p_2 ρ_2‖_1`.
///
/// Returns `None` unless the ensemble has exactly two states.
pub fn helstrom_value(ensemble: &Ensemble) -> Option<f64> {
    match ensemble.weighted_operators().as_slice() {
        [a, b] => Some(0.5 + 0.5 * trace_norm(&(a - b))),
        _ => None,
    }
}

/// Measurement attaining value 1 for a one-state ensemble.
fn trivial_measurements(dim: usize, criterion: Criterion) -> Vec<Array2<Complex64>> {
    match criterion {
        Criterion::MinError => vec![identity(dim)],
        Criterion::Unambiguous => vec![identity(dim), zeros(dim)],
    }
}

/// Distinguishability task: an ensemble, a measurement class and a
/// criterion, solved on demand.
///
/// ```ignore
/// let mut task = OptDist::new(&ensemble, MeasurementClass::Ppt, Criterion::MinError, config)?;
/// let value = task.solve()?;
/// ```
pub struct OptDist<'a> {
    ensemble: &'a Ensemble,
    class: MeasurementClass,
    criterion: Criterion,
    config: SolverConfig,
    value: Option<f64>,
    measurements: Vec<Array2<Complex64>>,
}

impl<'a> OptDist<'a> {
    /// Create a task. Fails if the solver options are invalid.
    pub fn new(
        ensemble: &'a Ensemble,
        class: MeasurementClass,
        criterion: Criterion,
        config: SolverConfig,
    ) -> Result<Self> {
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
    ///
    /// The primal problem is solved when measurements are requested,
    /// otherwise the dual. A one-state ensemble is answered without an SDP.
    pub fn solve_with(&mut self, backend: &dyn SdpBackend) -> Result<f64> {
        let keep = self.config.return_measurements;

        if self.ensemble.len() == 1 {
            debug!("Single-state ensemble; skipping SDP");
            self.value = Some(1.0);
            self.measurements = if keep {
                trivial_measurements(self.ensemble.dim(), self.criterion)
            } else {
                Vec::new()
            };
            return Ok(1.0);
        }

        let engine = engine(self.class, self.config.hierarchy_level)?;
        debug!(
            class = %self.class,
            criterion = %self.criterion,
            states = self.ensemble.len(),
            dim = self.ensemble.dim(),
            primal = keep,
            backend = backend.name(),
            "Solving distinguishability SDP"
        );

        let value = if keep {
            let optimum = engine.primal(self.ensemble, self.criterion, backend)?;
            self.measurements = optimum.measurements;
            optimum.value
        } else {
            self.measurements.clear();
            engine.dual(self.ensemble, self.criterion, backend)?
        };

        info!(
            class = %self.class,
            criterion = %self.criterion,
            value,
            "Distinguishability solved"
        );
        self.value = Some(value);
        Ok(value)
    }

    /// Optimal value of the last solve.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    /// Optimal measurement of the last solve; empty after a dual solve.
    pub fn measurements(&self) -> &[Array2<Complex64>] {
        &self.measurements
    }

    pub fn class(&self) -> MeasurementClass {
        self.class
    }

    pub fn criterion(&self) -> Criterion {
        self.criterion
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }
}
