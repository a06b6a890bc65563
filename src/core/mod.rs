// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! States, ensembles and ensemble files.

mod ensemble;
pub mod io;
mod state;

use std::fmt;

pub use ensemble::Ensemble;
pub use io::{load_ensemble, EnsembleFile, StateEntry};
pub use state::State;

/// The two parties of a bipartite measurement scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Party {
    /// Holder of the odd-labelled subsystems
    A,
    /// Holder of the even-labelled subsystems
    B,
}

impl Party {
    /// Party owning the subsystem with the given 1-based label.
    pub fn of_label(label: usize) -> Self {
        if label % 2 == 1 {
            Party::A
        } else {
            Party::B
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::A => write!(f, "A"),
            Party::B => write!(f, "B"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_of_label() {
        assert_eq!(Party::of_label(1), Party::A);
        assert_eq!(Party::of_label(2), Party::B);
        assert_eq!(Party::of_label(3), Party::A);
        assert_eq!(Party::of_label(4), Party::B);
    }
}
