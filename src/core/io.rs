// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loading ensembles from YAML or JSON files.
//!
//! ```yaml
//! dims: [2, 2]
//! probs: [0.5, 0.5]      # optional, uniform when omitted
//! swap: [2, 3]           # optional subsystem relabeling
//! states:
//!   - vector: [[0.7071067811865476, 0.0], [0.0, 0.0], [0.0, 0.0], [0.7071067811865476, 0.0]]
//!   - matrix: [[[0.5, 0.0], [0.5, 0.0]], [[0.5, 0.0], [0.5, 0.0]]]
//! ```
//!
//! Complex entries are written as `[re, im]` pairs.

use std::path::Path;

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::{Ensemble, State};
use crate::error::{Result, ValidationError};

/// One state in an ensemble file: exactly one of `vector` or `matrix`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateEntry {
    /// Pure state amplitudes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<Vec<[f64; 2]>>,

    /// Density matrix rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<Vec<Vec<[f64; 2]>>>,
}

impl StateEntry {
    fn to_state(&self, index: usize, dims: &[usize]) -> Result<State> {
        let c = |z: &[f64; 2]| Complex64::new(z[0], z[1]);
        match (&self.vector, &self.matrix) {
            (Some(amps), None) => {
                let psi: Array1<Complex64> = amps.iter().map(c).collect();
                State::from_vector(&psi, dims.to_vec())
            }
            (None, Some(rows)) => {
                let n = rows.len();
                if rows.iter().any(|row| row.len() != n) {
                    return Err(ValidationError::InvalidState(format!(
                        "state {}: matrix must be square",
                        index
                    ))
                    .into());
                }
                let rho = Array2::from_shape_fn((n, n), |(r, col)| c(&rows[r][col]));
                State::new(rho, dims.to_vec())
            }
            _ => Err(ValidationError::InvalidState(format!(
                "state {}: exactly one of 'vector' or 'matrix' must be given",
                index
            ))
            .into()),
        }
    }
}

/// Serialized description of an ensemble.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleFile {
    /// Subsystem dimensions of every state
    pub dims: Vec<usize>,

    /// Prior probabilities (uniform when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probs: Option<Vec<f64>>,

    /// Pair of subsystem labels to exchange after loading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swap: Option<Vec<usize>>,

    /// Member states
    pub states: Vec<StateEntry>,
}

impl EnsembleFile {
    /// Read a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Build and validate the ensemble, applying the optional swap.
    pub fn into_ensemble(self) -> Result<Ensemble> {
        let states = self
            .states
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.to_state(i, &self.dims))
            .collect::<Result<Vec<_>>>()?;
        let mut ensemble = Ensemble::new(states, self.probs)?;
        if let Some(pair) = &self.swap {
            ensemble.swap(pair)?;
        }
        Ok(ensemble)
    }
}

/// Load an ensemble file and build the ensemble.
pub fn load_ensemble(path: &Path) -> Result<Ensemble> {
    EnsembleFile::load(path)?.into_ensemble()
}
