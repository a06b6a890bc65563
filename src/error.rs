// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for state construction, configuration and solving.

use std::fmt;

/// Result type alias for QuStop operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// Invalid option value
    Config(String),
    /// Measurement class string not recognised, or not offered for a task
    UnsupportedMeasurementClass(String),
    /// Distinguishability criterion string not recognised
    UnsupportedCriterion(String),
    /// State or ensemble validation error
    Validation(ValidationError),
    /// SDP backend failure
    Solver(SolverError),
    /// IO error
    Io(std::io::Error),
    /// Serialization error
    Serialization(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "Configuration error: {}", msg),
            Error::UnsupportedMeasurementClass(name) => {
                write!(f, "Measurement class '{}' is not supported", name)
            }
            Error::UnsupportedCriterion(name) => {
                write!(f, "Distinguishability criterion '{}' is not supported", name)
            }
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::Solver(e) => write!(f, "Solver error: {}", e),
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Validation(e) => Some(e),
            Error::Solver(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<SolverError> for Error {
    fn from(e: SolverError) -> Self {
        Error::Solver(e)
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Construction-time validation errors for states and ensembles.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Operator is not a density operator
    InvalidState(String),
    /// Product of subsystem dimensions does not match the operator dimension
    DimensionMismatch { expected: usize, actual: usize },
    /// Swap pair is malformed or refers to an unknown subsystem
    InvalidSwap(String),
    /// Subsystem position or permutation does not fit the dimension list
    InvalidSubsystem(String),
    /// Ensemble without states
    EmptyEnsemble,
    /// Probability vector length differs from the number of states
    ProbabilityMismatch { probs: usize, states: usize },
    /// Probabilities do not sum to one
    ProbabilityNormalization { sum: f64 },
    /// A probability is negative
    NegativeProbability { index: usize, value: f64 },
    /// A state's shape differs from the first state's shape
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        actual: (usize, usize),
    },
    /// A state's subsystem layout differs from the first state's layout
    SubsystemMismatch { index: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            ValidationError::DimensionMismatch { expected, actual } => write!(
                f,
                "Subsystem dimensions multiply to {}, but the operator has dimension {}",
                expected, actual
            ),
            ValidationError::InvalidSwap(msg) => write!(f, "Invalid swap: {}", msg),
            ValidationError::InvalidSubsystem(msg) => write!(f, "Invalid subsystem: {}", msg),
            ValidationError::EmptyEnsemble => {
                write!(f, "An ensemble must contain at least one state")
            }
            ValidationError::ProbabilityMismatch { probs, states } => write!(
                f,
                "The number of probabilities ({}) must match the number of states ({})",
                probs, states
            ),
            ValidationError::ProbabilityNormalization { sum } => {
                write!(f, "Probabilities must sum to 1, but sum to {}", sum)
            }
            ValidationError::NegativeProbability { index, value } => {
                write!(f, "Probability {} is negative ({})", index, value)
            }
            ValidationError::ShapeMismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "State {} has shape {:?}, expected {:?}",
                index, actual, expected
            ),
            ValidationError::SubsystemMismatch { index } => write!(
                f,
                "State {} has a different subsystem layout than state 0",
                index
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Failures reported by the SDP backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverError {
    /// Problem has no feasible point
    Infeasible(String),
    /// Objective is unbounded
    Unbounded(String),
    /// Iteration or time budget exhausted
    NotConverged { status: String, iterations: u32 },
    /// Numerical breakdown inside the backend
    Numerical(String),
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::Infeasible(msg) => write!(f, "Problem is infeasible: {}", msg),
            SolverError::Unbounded(msg) => write!(f, "Problem is unbounded: {}", msg),
            SolverError::NotConverged { status, iterations } => write!(
                f,
                "Solver stopped without converging ({}) after {} iterations",
                status, iterations
            ),
            SolverError::Numerical(msg) => write!(f, "Numerical failure: {}", msg),
        }
    }
}

impl std::error::Error for SolverError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    // =========================================================================
    // Error Display tests
    // =========================================================================

    #[test]
    fn test_error_display_config() {
        let e = Error::Config("hierarchy_level must be >= 1".into());
        assert_eq!(
            e.to_string(),
            "Configuration error: hierarchy_level must be >= 1"
        );
    }

    #[test]
    fn test_error_display_unsupported_class() {
        let e = Error::UnsupportedMeasurementClass("locc".into());
        assert_eq!(e.to_string(), "Measurement class 'locc' is not supported");
    }

    #[test]
    fn test_error_display_unsupported_criterion() {
        let e = Error::UnsupportedCriterion("max-confidence".into());
        assert_eq!(
            e.to_string(),
            "Distinguishability criterion 'max-confidence' is not supported"
        );
    }

    #[test]
    fn test_error_display_validation() {
        let e = Error::Validation(ValidationError::EmptyEnsemble);
        assert_eq!(
            e.to_string(),
            "Validation error: An ensemble must contain at least one state"
        );
    }

    #[test]
    fn test_error_display_solver() {
        let e = Error::Solver(SolverError::NotConverged {
            status: "MaxIterations".into(),
            iterations: 200,
        });
        assert_eq!(
            e.to_string(),
            "Solver error: Solver stopped without converging (MaxIterations) after 200 iterations"
        );
    }

    // =========================================================================
    // ValidationError Display tests
    // =========================================================================

    #[test]
    fn test_validation_display_dimension_mismatch() {
        let e = ValidationError::DimensionMismatch {
            expected: 6,
            actual: 4,
        };
        assert_eq!(
            e.to_string(),
            "Subsystem dimensions multiply to 6, but the operator has dimension 4"
        );
    }

    #[test]
    fn test_validation_display_probability_mismatch() {
        let e = ValidationError::ProbabilityMismatch {
            probs: 3,
            states: 2,
        };
        assert_eq!(
            e.to_string(),
            "The number of probabilities (3) must match the number of states (2)"
        );
    }

    #[test]
    fn test_validation_display_shape_mismatch() {
        let e = ValidationError::ShapeMismatch {
            index: 1,
            expected: (4, 4),
            actual: (2, 2),
        };
        assert_eq!(e.to_string(), "State 1 has shape (2, 2), expected (4, 4)");
    }

    // =========================================================================
    // Error::source() and From impls
    // =========================================================================

    #[test]
    fn test_error_source() {
        assert!(Error::Io(std::io::Error::other("disk")).source().is_some());
        assert!(Error::Solver(SolverError::Numerical("x".into()))
            .source()
            .is_some());
        assert!(Error::Config("x".into()).source().is_none());
        assert!(Error::UnsupportedCriterion("x".into()).source().is_none());
    }

    #[test]
    fn test_from_validation_error() {
        let e: Error = ValidationError::InvalidSwap("x".into()).into();
        assert!(matches!(e, Error::Validation(ValidationError::InvalidSwap(_))));
    }

    #[test]
    fn test_from_solver_error() {
        let e: Error = SolverError::Infeasible("x".into()).into();
        assert!(matches!(e, Error::Solver(SolverError::Infeasible(_))));
    }

    #[test]
    fn test_from_serde_yaml_error() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{{{{").unwrap_err();
        let e: Error = yaml_err.into();
        assert!(matches!(e, Error::Serialization(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{bad}").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Serialization(_)));
    }
}
