// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Input validation for states and ensembles.
//!
//! These checks run at construction time, before any SDP is built.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::{Result, ValidationError};
use crate::operators::{hermitian_eigenvalues, is_hermitian, trace};

/// Tolerance for Hermiticity, positivity and unit trace of a density operator.
pub const DENSITY_TOL: f64 = 1e-8;

/// Tolerance for the probability vector summing to one.
pub const PROBABILITY_TOL: f64 = 1e-7;

/// Two states count as orthogonal when `|Tr(ρ_i ρ_j)|` is at most this.
pub const ORTHOGONALITY_TOL: f64 = 1e-8;

/// Eigenvalues above this count towards the rank of an operator.
pub const RANK_TOL: f64 = 1e-8;

/// Validate a subsystem dimension list against an operator dimension.
pub fn validate_dims(dims: &[usize], dim: usize) -> Result<()> {
    if dims.is_empty() || dims.contains(&0) {
        return Err(ValidationError::InvalidState(format!(
            "subsystem dimensions must be positive, got {:?}",
            dims
        ))
        .into());
    }
    let product: usize = dims.iter().product();
    if product != dim {
        return Err(ValidationError::DimensionMismatch {
            expected: product,
            actual: dim,
        }
        .into());
    }
    Ok(())
}

/// Validate that `op` is a density operator.
pub fn validate_density(op: &Array2<Complex64>) -> Result<()> {
    let (rows, cols) = op.dim();
    if rows != cols || rows == 0 {
        return Err(ValidationError::InvalidState(format!(
            "operator must be square and non-empty, got {}x{}",
            rows, cols
        ))
        .into());
    }

    // Check for NaN or Inf
    if let Some((idx, _)) = op
        .indexed_iter()
        .find(|(_, z)| !(z.re.is_finite() && z.im.is_finite()))
    {
        return Err(ValidationError::InvalidState(format!(
            "non-finite entry at {:?}",
            idx
        ))
        .into());
    }

    if !is_hermitian(op, DENSITY_TOL) {
        return Err(ValidationError::InvalidState("operator is not Hermitian".into()).into());
    }

    let tr = trace(op);
    if (tr.re - 1.0).abs() > DENSITY_TOL || tr.im.abs() > DENSITY_TOL {
        return Err(ValidationError::InvalidState(format!(
            "trace must be 1, got {}",
            tr
        ))
        .into());
    }

    let min_eig = hermitian_eigenvalues(op).first().copied().unwrap_or(0.0);
    if min_eig < -DENSITY_TOL {
        return Err(ValidationError::InvalidState(format!(
            "operator is not positive semidefinite (smallest eigenvalue {:.3e})",
            min_eig
        ))
        .into());
    }

    Ok(())
}

/// Validate a probability vector for `num_states` states.
pub fn validate_probabilities(probs: &[f64], num_states: usize) -> Result<()> {
    if probs.len() != num_states {
        return Err(ValidationError::ProbabilityMismatch {
            probs: probs.len(),
            states: num_states,
        }
        .into());
    }
    for (index, &value) in probs.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::NegativeProbability { index, value }.into());
        }
    }
    let sum: f64 = probs.iter().sum();
    if (sum - 1.0).abs() > PROBABILITY_TOL {
        return Err(ValidationError::ProbabilityNormalization { sum }.into());
    }
    Ok(())
}

/// Validate a swap pair of 1-based subsystem labels and return the 0-based
/// positions those labels currently occupy.
pub fn validate_swap(pair: &[usize], labels: &[usize]) -> Result<(usize, usize)> {
    if pair.len() != 2 {
        return Err(ValidationError::InvalidSwap(format!(
            "expected exactly two subsystem labels, got {}",
            pair.len()
        ))
        .into());
    }
    let position = |label: usize| {
        labels.iter().position(|&l| l == label).ok_or_else(|| {
            ValidationError::InvalidSwap(format!(
                "subsystem label {} is out of range 1..={}",
                label,
                labels.len()
            ))
        })
    };
    Ok((position(pair[0])?, position(pair[1])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::operators::{basis, identity, outer};

    #[test]
    fn test_valid_dims() {
        assert!(validate_dims(&[2, 3], 6).is_ok());
        assert!(validate_dims(&[4], 4).is_ok());
    }

    #[test]
    fn test_dims_mismatch() {
        let result = validate_dims(&[2, 2], 6);
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::DimensionMismatch {
                expected: 4,
                actual: 6
            }))
        ));
    }

    #[test]
    fn test_dims_zero_or_empty() {
        assert!(validate_dims(&[], 1).is_err());
        assert!(validate_dims(&[2, 0], 0).is_err());
    }

    #[test]
    fn test_valid_density() {
        assert!(validate_density(&outer(&basis(2, 0))).is_ok());
        assert!(validate_density(&(identity(3) / Complex64::new(3.0, 0.0))).is_ok());
    }

    #[test]
    fn test_density_wrong_trace() {
        let result = validate_density(&identity(2));
        assert!(matches!(
            result,
            Err(Error::Validation(ValidationError::InvalidState(_)))
        ));
        let msg = format!("{}", result.unwrap_err());
        assert!(msg.contains("trace"));
    }

    #[test]
    fn test_density_not_hermitian() {
        let mut rho = outer(&basis(2, 0));
        rho[[0, 1]] = Complex64::new(0.1, 0.0);
        let msg = format!("{}", validate_density(&rho).unwrap_err());
        assert!(msg.contains("Hermitian"));
    }

    #[test]
    fn test_density_not_psd() {
        let mut rho = Array2::zeros((2, 2));
        rho[[0, 0]] = Complex64::new(1.5, 0.0);
        rho[[1, 1]] = Complex64::new(-0.5, 0.0);
        let msg = format!("{}", validate_density(&rho).unwrap_err());
        assert!(msg.contains("positive semidefinite"));
    }

    #[test]
    fn test_density_non_finite() {
        let mut rho = outer(&basis(2, 0));
        rho[[1, 1]] = Complex64::new(f64::NAN, 0.0);
        let msg = format!("{}", validate_density(&rho).unwrap_err());
        assert!(msg.contains("non-finite"));
    }

    #[test]
    fn test_density_not_square() {
        assert!(validate_density(&Array2::zeros((2, 3))).is_err());
    }

    #[test]
    fn test_probabilities() {
        assert!(validate_probabilities(&[0.25, 0.75], 2).is_ok());
        // within tolerance
        assert!(validate_probabilities(&[0.5, 0.5 + 1e-9], 2).is_ok());
    }

    #[test]
    fn test_probabilities_length_mismatch() {
        assert!(matches!(
            validate_probabilities(&[1.0], 2),
            Err(Error::Validation(ValidationError::ProbabilityMismatch {
                probs: 1,
                states: 2
            }))
        ));
    }

    #[test]
    fn test_probabilities_not_normalised() {
        assert!(matches!(
            validate_probabilities(&[0.5, 0.6], 2),
            Err(Error::Validation(
                ValidationError::ProbabilityNormalization { .. }
            ))
        ));
    }

    #[test]
    fn test_probabilities_negative() {
        assert!(matches!(
            validate_probabilities(&[1.5, -0.5], 2),
            Err(Error::Validation(ValidationError::NegativeProbability {
                index: 1,
                ..
            }))
        ));
    }

    #[test]
    fn test_swap_positions() {
        assert_eq!(validate_swap(&[2, 3], &[1, 2, 3, 4]).unwrap(), (1, 2));
        // labels follow earlier swaps
        assert_eq!(validate_swap(&[2, 4], &[1, 3, 2, 4]).unwrap(), (2, 3));
    }

    #[test]
    fn test_swap_invalid() {
        assert!(validate_swap(&[1], &[1, 2]).is_err());
        assert!(validate_swap(&[1, 2, 3], &[1, 2, 3]).is_err());
        let msg = format!("{}", validate_swap(&[1, 5], &[1, 2]).unwrap_err());
        assert!(msg.contains("out of range"));
    }
}
