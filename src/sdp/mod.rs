// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Semidefinite programming over complex Hermitian matrices.
//!
//! Problems are stated with Hermitian matrix variables and compiled to the
//! real conic standard form accepted by interior-point solvers. A complex
//! constraint `H ⪰ 0` becomes the real constraint
//! `[[Re H, -Im H], [Im H, Re H]] ⪰ 0` of twice the size. Problems with
//! real data are built over [`Field::Real`] and keep their PSD blocks at
//! the original size.
//!
//! ```ignore
//! let mut p = Problem::new();
//! let x = p.psd(2);
//! p.constrain_zero(&(x.expr().trace() - Affine::constant(ONE)));
//! p.set_objective(Sense::Maximize, x.expr().inner_const(&c));
//! let solved = p.solve(&ClarabelBackend::default())?;
//! ```

pub mod backend;
pub mod expr;
pub mod problem;

pub use backend::{backend_for, ClarabelBackend, SdpBackend};
pub use expr::{Affine, Field, HermitianVar, MatExpr, ScalarVar, VarId};
pub use problem::{Cone, ConicProblem, Problem, Sense, Solution, Solved};
