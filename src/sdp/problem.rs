// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Problem builder and its compiled conic standard form.

use std::time::Instant;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use super::backend::SdpBackend;
use super::expr::{Affine, Field, HermitianVar, MatExpr, ScalarVar, VarId};
use crate::error::{Result, SolverError};

/// Optimisation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Minimize,
    Maximize,
}

/// A cone in the product `K` of the standard form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cone {
    /// `n` rows fixed at zero
    Zero(usize),
    /// Real symmetric `n × n` PSD matrices, as the scaled column-major
    /// upper triangle (`n(n+1)/2` rows)
    PsdTriangle(usize),
}

impl Cone {
    /// Number of rows the cone occupies.
    pub fn rows(&self) -> usize {
        match *self {
            Cone::Zero(n) => n,
            Cone::PsdTriangle(n) => n * (n + 1) / 2,
        }
    }
}

/// `min qᵀx + offset  s.t.  Ax + s = b,  s ∈ K`.
///
/// `A` is stored as `(row, col, value)` triplets; rows are ordered as the
/// cones in `cones`.
#[derive(Debug, Clone, Default)]
pub struct ConicProblem {
    pub num_vars: usize,
    pub q: Vec<f64>,
    pub offset: f64,
    pub a: Vec<(usize, usize, f64)>,
    pub b: Vec<f64>,
    pub cones: Vec<Cone>,
}

impl ConicProblem {
    pub fn num_rows(&self) -> usize {
        self.b.len()
    }

    /// `A` in compressed sparse column form: `(colptr, rowval, nzval)`.
    /// Duplicate entries are summed.
    pub fn a_csc(&self) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        let mut triplets = self.a.clone();
        triplets.sort_unstable_by_key(|&(r, c, _)| (c, r));

        let mut colptr = vec![0; self.num_vars + 1];
        let mut rowval = Vec::with_capacity(triplets.len());
        let mut nzval: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;
        for (r, c, v) in triplets {
            if last == Some((r, c)) {
                if let Some(acc) = nzval.last_mut() {
                    *acc += v;
                }
                continue;
            }
            rowval.push(r);
            nzval.push(v);
            colptr[c + 1] += 1;
            last = Some((r, c));
        }
        for c in 0..self.num_vars {
            colptr[c + 1] += colptr[c];
        }
        (colptr, rowval, nzval)
    }
}

/// Raw result returned by an [`SdpBackend`].
#[derive(Debug, Clone)]
pub struct Solution {
    /// Primal point
    pub x: Vec<f64>,
    /// Backend status description
    pub status: String,
    /// Interior-point iterations
    pub iterations: u32,
    /// Reported solve time in seconds
    pub solve_time: f64,
}

/// Outcome of [`Problem::solve`].
#[derive(Debug, Clone)]
pub struct Solved {
    /// Objective value at the returned point
    pub value: f64,
    /// Primal point, read through the variable handles
    pub x: Vec<f64>,
    pub iterations: u32,
}

impl Solved {
    pub fn matrix(&self, var: &HermitianVar) -> Array2<Complex64> {
        var.value(&self.x)
    }
}

/// An SDP over Hermitian and real scalar variables.
///
/// Matrix variables are complex Hermitian unless the problem is created
/// over [`Field::Real`], in which case they are real symmetric.
#[derive(Debug, Clone)]
pub struct Problem {
    field: Field,
    num_vars: usize,
    sense: Sense,
    objective: Affine,
    equalities: Vec<(f64, Vec<(VarId, f64)>)>,
    psd: Vec<MatExpr>,
}

impl Default for Problem {
    fn default() -> Self {
        Self::new()
    }
}

impl Problem {
    pub fn new() -> Self {
        Self::over(Field::Complex)
    }

    /// Empty problem whose matrix variables live in `field`.
    pub fn over(field: Field) -> Self {
        Self {
            field,
            num_vars: 0,
            sense: Sense::Minimize,
            objective: Affine::zero(),
            equalities: Vec::new(),
            psd: Vec::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Declare a free Hermitian `n × n` variable.
    pub fn hermitian(&mut self, n: usize) -> HermitianVar {
        let var = HermitianVar {
            offset: self.num_vars,
            dim: n,
            field: self.field,
        };
        self.num_vars += HermitianVar::scalar_count(n, self.field);
        var
    }

    /// Declare a Hermitian `n × n` variable constrained to be PSD.
    pub fn psd(&mut self, n: usize) -> HermitianVar {
        let var = self.hermitian(n);
        self.constrain_psd(var.expr());
        var
    }

    /// Declare a free real scalar.
    pub fn scalar(&mut self) -> ScalarVar {
        let var = ScalarVar { id: self.num_vars };
        self.num_vars += 1;
        var
    }

    /// Require a square Hermitian expression to be PSD.
    pub fn constrain_psd(&mut self, expr: MatExpr) {
        assert!(expr.is_square(), "PSD constraint on a non-square expression");
        self.psd.push(expr);
    }

    /// Require `lhs = rhs` for Hermitian expressions.
    pub fn constrain_hermitian_eq(&mut self, lhs: &MatExpr, rhs: &MatExpr) {
        let diff = lhs - rhs;
        let n = diff.rows();
        for i in 0..n {
            for j in i..n {
                self.push_equality(diff.get(i, j).real_part());
                if i != j {
                    self.push_equality(diff.get(i, j).imag_part());
                }
            }
        }
    }

    /// Require a real-valued form to vanish. Only the real part is used.
    pub fn constrain_zero(&mut self, form: &Affine) {
        self.push_equality(form.real_part());
    }

    fn push_equality(&mut self, row: (f64, Vec<(VarId, f64)>)) {
        if row.1.is_empty() {
            if row.0.abs() > 1e-9 {
                tracing::warn!(residual = row.0, "Dropping infeasible constant equality");
            }
            return;
        }
        self.equalities.push(row);
    }

    /// Set the objective; only its real part is used.
    pub fn set_objective(&mut self, sense: Sense, objective: Affine) {
        self.sense = sense;
        self.objective = objective;
    }

    /// Compile to the conic standard form.
    pub fn compile(&self) -> ConicProblem {
        let mut conic = ConicProblem {
            num_vars: self.num_vars,
            q: vec![0.0; self.num_vars],
            ..Default::default()
        };

        let (offset, coeffs) = self.objective.real_part();
        let sign = match self.sense {
            Sense::Minimize => 1.0,
            Sense::Maximize => -1.0,
        };
        conic.offset = sign * offset;
        for (v, a) in coeffs {
            conic.q[v] += sign * a;
        }

        // s = c + a·x  ⇔  b = c, A = -a
        fn push_row(conic: &mut ConicProblem, constant: f64, coeffs: &[(VarId, f64)]) {
            let row = conic.b.len();
            conic.b.push(constant);
            conic.a.extend(coeffs.iter().map(|&(v, a)| (row, v, -a)));
        }

        if !self.equalities.is_empty() {
            for (c, coeffs) in &self.equalities {
                push_row(&mut conic, *c, coeffs);
            }
            conic.cones.push(Cone::Zero(self.equalities.len()));
        }

        let sqrt2 = std::f64::consts::SQRT_2;
        for h in &self.psd {
            let n = h.rows();
            if h.is_real() {
                // real symmetric block: upper triangle, column-major
                for j in 0..n {
                    for i in 0..=j {
                        let (c, coeffs) = h.get(i, j).real_part();
                        let scale = if i == j { 1.0 } else { sqrt2 };
                        let scaled: Vec<(VarId, f64)> =
                            coeffs.into_iter().map(|(v, a)| (v, a * scale)).collect();
                        push_row(&mut conic, c * scale, &scaled);
                    }
                }
                conic.cones.push(Cone::PsdTriangle(n));
                continue;
            }
            // [[Re H, -Im H], [Im H, Re H]], upper triangle, column-major
            for j in 0..2 * n {
                for i in 0..=j {
                    let (c, coeffs) = if j < n {
                        h.get(i, j).real_part()
                    } else if i < n {
                        let (c, coeffs) = h.get(i, j - n).imag_part();
                        (-c, coeffs.into_iter().map(|(v, a)| (v, -a)).collect())
                    } else {
                        h.get(i - n, j - n).real_part()
                    };
                    let scale = if i == j { 1.0 } else { sqrt2 };
                    let scaled: Vec<(VarId, f64)> =
                        coeffs.into_iter().map(|(v, a)| (v, a * scale)).collect();
                    push_row(&mut conic, c * scale, &scaled);
                }
            }
            conic.cones.push(Cone::PsdTriangle(2 * n));
        }

        debug!(
            vars = conic.num_vars,
            rows = conic.num_rows(),
            nnz = conic.a.len(),
            psd_blocks = self.psd.len(),
            field = ?self.field,
            "Compiled SDP"
        );
        conic
    }

    /// Compile, solve with `backend` and evaluate the objective.
    pub fn solve(&self, backend: &dyn SdpBackend) -> Result<Solved> {
        let conic = self.compile();
        let start = Instant::now();
        let solution = backend.solve(&conic)?;
        if solution.x.len() != self.num_vars {
            return Err(SolverError::Numerical(format!(
                "backend returned {} values for {} variables",
                solution.x.len(),
                self.num_vars
            ))
            .into());
        }
        let value = self.objective.eval(&solution.x).re;
        debug!(
            backend = backend.name(),
            status = %solution.status,
            iterations = solution.iterations,
            backend_time_s = solution.solve_time,
            elapsed_ms = start.elapsed().as_millis() as u64,
            value,
            "SDP solved"
        );
        Ok(Solved {
            value,
            x: solution.x,
            iterations: solution.iterations,
        })
    }
}
