// Copyright 2026 QuStop Contributors
// SPDX-License-Identifier: Apache-2.0

//! Affine expressions over real decision variables.
//!
//! Every decision variable is a real scalar. A complex Hermitian `n × n`
//! matrix variable occupies `n²` consecutive scalars: the `n` diagonal
//! entries, then the real and imaginary parts of each strict-upper entry
//! `(i, j)`, `i < j`, in row-major order. A real symmetric variable drops
//! the imaginary parts and occupies `n(n+1)/2` scalars. Matrix expressions
//! are dense matrices of complex affine forms in those scalars.

use ndarray::Array2;
use num_complex::Complex64;

use crate::operators::index::{total_dim, trace_map, transpose_map};

const ZERO: Complex64 = Complex64 { re: 0.0, im: 0.0 };
const ONE: Complex64 = Complex64 { re: 1.0, im: 0.0 };
const I: Complex64 = Complex64 { re: 0.0, im: 1.0 };

/// Index of a real scalar decision variable.
pub type VarId = usize;

/// Complex affine form `c + Σ a_k x_k` in real variables `x_k`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Affine {
    pub constant: Complex64,
    pub terms: Vec<(VarId, Complex64)>,
}

impl Affine {
    /// The zero form.
    pub fn zero() -> Self {
        Self::default()
    }

    /// A constant form.
    pub fn constant(c: Complex64) -> Self {
        Self {
            constant: c,
            terms: Vec::new(),
        }
    }

    /// `coef · x_var`.
    pub fn term(var: VarId, coef: Complex64) -> Self {
        Self {
            constant: ZERO,
            terms: vec![(var, coef)],
        }
    }

    /// True when the form has no variable terms.
    pub fn is_constant(&self) -> bool {
        self.terms.is_empty()
    }

    /// `self += scale · other`.
    pub fn add_scaled(&mut self, other: &Affine, scale: Complex64) {
        if scale == ZERO {
            return;
        }
        self.constant += other.constant * scale;
        self.terms
            .extend(other.terms.iter().map(|&(v, a)| (v, a * scale)));
    }

    /// `scale · self`.
    pub fn scaled(&self, scale: Complex64) -> Affine {
        Affine {
            constant: self.constant * scale,
            terms: self.terms.iter().map(|&(v, a)| (v, a * scale)).collect(),
        }
    }

    /// Merge repeated variables and drop vanishing coefficients.
    pub fn simplify(&mut self) {
        if self.terms.len() > 1 {
            self.terms.sort_unstable_by_key(|&(v, _)| v);
            let mut merged: Vec<(VarId, Complex64)> = Vec::with_capacity(self.terms.len());
            for &(v, a) in &self.terms {
                match merged.last_mut() {
                    Some((last, acc)) if *last == v => *acc += a,
                    _ => merged.push((v, a)),
                }
            }
            self.terms = merged;
        }
        self.terms.retain(|&(_, a)| a.norm() > 1e-14);
    }

    /// Evaluate at a point.
    pub fn eval(&self, x: &[f64]) -> Complex64 {
        self.terms
            .iter()
            .fold(self.constant, |acc, &(v, a)| acc + a * x[v])
    }

    /// Real part, as `(constant, coefficients)`.
    pub fn real_part(&self) -> (f64, Vec<(VarId, f64)>) {
        let mut s = self.clone();
        s.simplify();
        (
            s.constant.re,
            s.terms
                .iter()
                .filter(|(_, a)| a.re.abs() > 1e-14)
                .map(|&(v, a)| (v, a.re))
                .collect(),
        )
    }

    /// Imaginary part, as `(constant, coefficients)`.
    pub fn imag_part(&self) -> (f64, Vec<(VarId, f64)>) {
        self.scaled(-I).real_part()
    }
}

impl std::ops::Add for Affine {
    type Output = Affine;

    fn add(mut self, rhs: Affine) -> Affine {
        self.add_scaled(&rhs, ONE);
        self
    }
}

impl std::ops::Sub for Affine {
    type Output = Affine;

    fn sub(mut self, rhs: Affine) -> Affine {
        self.add_scaled(&rhs, -ONE);
        self
    }
}

/// Row-major matrix of affine forms.
#[derive(Debug, Clone, PartialEq)]
pub struct MatExpr {
    rows: usize,
    cols: usize,
    entries: Vec<Affine>,
}

impl MatExpr {
    /// All-zero `rows × cols` expression.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![Affine::zero(); rows * cols],
        }
    }

    /// Constant expression.
    pub fn constant(m: &Array2<Complex64>) -> Self {
        let (rows, cols) = m.dim();
        Self {
            rows,
            cols,
            entries: m.iter().map(|&c| Affine::constant(c)).collect(),
        }
    }

    pub(crate) fn from_entries(rows: usize, cols: usize, entries: Vec<Affine>) -> Self {
        debug_assert_eq!(entries.len(), rows * cols);
        Self {
            rows,
            cols,
            entries,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Entry `(r, c)`.
    pub fn get(&self, r: usize, c: usize) -> &Affine {
        &self.entries[r * self.cols + c]
    }

    /// True when no entry has an imaginary constant or coefficient.
    pub fn is_real(&self) -> bool {
        self.entries
            .iter()
            .all(|e| e.constant.im == 0.0 && e.terms.iter().all(|&(_, a)| a.im == 0.0))
    }

    /// `self + scale · other`.
    pub fn add_scaled(&self, other: &MatExpr, scale: Complex64) -> MatExpr {
        assert_eq!((self.rows, self.cols), (other.rows, other.cols));
        let mut out = self.clone();
        for (e, o) in out.entries.iter_mut().zip(&other.entries) {
            e.add_scaled(o, scale);
        }
        out
    }

    /// `self + scale · m` for a constant matrix `m`.
    pub fn add_constant(&self, m: &Array2<Complex64>, scale: Complex64) -> MatExpr {
        assert_eq!((self.rows, self.cols), m.dim());
        let mut out = self.clone();
        for (e, &c) in out.entries.iter_mut().zip(m.iter()) {
            e.constant += c * scale;
        }
        out
    }

    /// Add `scale · m · x` where `x` is a real scalar form.
    pub fn add_scalar_times(&self, m: &Array2<Complex64>, x: &Affine) -> MatExpr {
        assert_eq!((self.rows, self.cols), m.dim());
        let mut out = self.clone();
        for (e, &c) in out.entries.iter_mut().zip(m.iter()) {
            e.add_scaled(x, c);
        }
        out
    }

    /// `scale · self`.
    pub fn scaled(&self, scale: Complex64) -> MatExpr {
        MatExpr {
            rows: self.rows,
            cols: self.cols,
            entries: self.entries.iter().map(|e| e.scaled(scale)).collect(),
        }
    }

    fn gather(&self, out_dim: usize, map: &[usize]) -> MatExpr {
        MatExpr {
            rows: out_dim,
            cols: out_dim,
            entries: map.iter().map(|&k| self.entries[k].clone()).collect(),
        }
    }

    /// Partial transpose on subsystem positions `sys` of a square expression.
    pub fn partial_transpose(&self, dims: &[usize], sys: &[usize]) -> MatExpr {
        let dim = total_dim(dims);
        assert!(self.is_square() && self.rows == dim);
        self.gather(dim, &transpose_map(dims, sys))
    }

    /// Partial trace over subsystem positions `sys` of a square expression.
    pub fn partial_trace(&self, dims: &[usize], sys: &[usize]) -> MatExpr {
        let dim = total_dim(dims);
        assert!(self.is_square() && self.rows == dim);
        let (out_dim, sources) = trace_map(dims, sys);
        let entries = sources
            .iter()
            .map(|src| {
                let mut acc = Affine::zero();
                for &k in src {
                    acc.add_scaled(&self.entries[k], ONE);
                }
                acc.simplify();
                acc
            })
            .collect();
        MatExpr::from_entries(out_dim, out_dim, entries)
    }

    /// `self ⊗ I_m`.
    pub fn kron_identity(&self, m: usize) -> MatExpr {
        let rows = self.rows * m;
        let cols = self.cols * m;
        let mut out = MatExpr::zeros(rows, cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                let e = self.get(r, c);
                for a in 0..m {
                    out.entries[(r * m + a) * cols + c * m + a] = e.clone();
                }
            }
        }
        out
    }

    /// `I_m ⊗ self`.
    pub fn identity_kron(&self, m: usize) -> MatExpr {
        let rows = self.rows * m;
        let cols = self.cols * m;
        let mut out = MatExpr::zeros(rows, cols);
        for a in 0..m {
            for r in 0..self.rows {
                for c in 0..self.cols {
                    out.entries[(a * self.rows + r) * cols + a * self.cols + c] = self.get(r, c).clone();
                }
            }
        }
        out
    }

    /// `l · self · r` for constant matrices `l` and `r`.
    pub fn sandwich(&self, l: &Array2<Complex64>, r: &Array2<Complex64>) -> MatExpr {
        assert_eq!(l.ncols(), self.rows);
        assert_eq!(r.nrows(), self.cols);

        // nonzeros of each column of r and each row of l
        let r_cols: Vec<Vec<(usize, Complex64)>> = (0..r.ncols())
            .map(|q| {
                (0..r.nrows())
                    .filter_map(|j| Some((j, r[[j, q]])).filter(|(_, z)| z.norm() > 0.0))
                    .collect()
            })
            .collect();
        let l_rows: Vec<Vec<(usize, Complex64)>> = (0..l.nrows())
            .map(|p| {
                (0..l.ncols())
                    .filter_map(|i| Some((i, l[[p, i]])).filter(|(_, z)| z.norm() > 0.0))
                    .collect()
            })
            .collect();

        // t = self · r
        let mut t = vec![Affine::zero(); self.rows * r.ncols()];
        for i in 0..self.rows {
            for (q, col) in r_cols.iter().enumerate() {
                let acc = &mut t[i * r.ncols() + q];
                for &(j, z) in col {
                    acc.add_scaled(&self.entries[i * self.cols + j], z);
                }
                acc.simplify();
            }
        }

        // out = l · t
        let mut entries = Vec::with_capacity(l.nrows() * r.ncols());
        for row in &l_rows {
            for q in 0..r.ncols() {
                let mut acc = Affine::zero();
                for &(i, z) in row {
                    acc.add_scaled(&t[i * r.ncols() + q], z);
                }
                acc.simplify();
                entries.push(acc);
            }
        }
        MatExpr::from_entries(l.nrows(), r.ncols(), entries)
    }

    /// `w† · self · w`.
    pub fn congruence(&self, w: &Array2<Complex64>) -> MatExpr {
        let wd = w.t().mapv(|z| z.conj());
        self.sandwich(&wd, w)
    }

    /// Trace of a square expression.
    pub fn trace(&self) -> Affine {
        assert!(self.is_square());
        let mut acc = Affine::zero();
        for i in 0..self.rows {
            acc.add_scaled(self.get(i, i), ONE);
        }
        acc.simplify();
        acc
    }

    /// `Tr(c† · self)` for a constant matrix `c`.
    pub fn inner_const(&self, c: &Array2<Complex64>) -> Affine {
        assert_eq!((self.rows, self.cols), c.dim());
        let mut acc = Affine::zero();
        for (e, &z) in self.entries.iter().zip(c.iter()) {
            acc.add_scaled(e, z.conj());
        }
        acc.simplify();
        acc
    }

    /// Evaluate at a point.
    pub fn eval(&self, x: &[f64]) -> Array2<Complex64> {
        Array2::from_shape_fn((self.rows, self.cols), |(r, c)| self.get(r, c).eval(x))
    }
}

impl std::ops::Add<&MatExpr> for &MatExpr {
    type Output = MatExpr;

    fn add(self, rhs: &MatExpr) -> MatExpr {
        self.add_scaled(rhs, ONE)
    }
}

impl std::ops::Sub<&MatExpr> for &MatExpr {
    type Output = MatExpr;

    fn sub(self, rhs: &MatExpr) -> MatExpr {
        self.add_scaled(rhs, -ONE)
    }
}

/// Number field of the matrix variables of a problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    /// Real symmetric matrices
    Real,
    /// Complex Hermitian matrices
    #[default]
    Complex,
}

impl Field {
    /// [`Field::Real`] when every operator has exactly zero imaginary part.
    ///
    /// A problem whose data are all real has a real optimal point, since
    /// the average of a solution and its complex conjugate is feasible with
    /// the same objective.
    pub fn of<'a, I>(ops: I) -> Field
    where
        I: IntoIterator<Item = &'a Array2<Complex64>>,
    {
        let real = ops
            .into_iter()
            .all(|op| op.iter().all(|z| z.im == 0.0));
        if real {
            Field::Real
        } else {
            Field::Complex
        }
    }
}

/// Hermitian (or real symmetric) matrix variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HermitianVar {
    pub(crate) offset: VarId,
    pub(crate) dim: usize,
    pub(crate) field: Field,
}

impl HermitianVar {
    /// Number of real scalars occupied by an `n × n` variable.
    pub fn scalar_count(n: usize, field: Field) -> usize {
        match field {
            Field::Real => n * (n + 1) / 2,
            Field::Complex => n * n,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn field(&self) -> Field {
        self.field
    }

    /// Variable ids of the real and, for complex variables, imaginary
    /// parts of entry `(i, j)`, `i < j`.
    fn off_diagonal(&self, i: usize, j: usize) -> (VarId, Option<VarId>) {
        let n = self.dim;
        // pairs before row i: Σ_{r<i} (n - 1 - r)
        let k = i * (2 * n - i - 1) / 2 + (j - i - 1);
        match self.field {
            Field::Real => (self.offset + n + k, None),
            Field::Complex => {
                let base = self.offset + n + 2 * k;
                (base, Some(base + 1))
            }
        }
    }

    /// The variable as a matrix expression.
    pub fn expr(&self) -> MatExpr {
        let n = self.dim;
        let mut entries = vec![Affine::zero(); n * n];
        for i in 0..n {
            entries[i * n + i] = Affine::term(self.offset + i, ONE);
            for j in i + 1..n {
                let (re, im) = self.off_diagonal(i, j);
                let mut upper = Affine::term(re, ONE);
                let mut lower = Affine::term(re, ONE);
                if let Some(im) = im {
                    upper.terms.push((im, I));
                    lower.terms.push((im, -I));
                }
                entries[i * n + j] = upper;
                entries[j * n + i] = lower;
            }
        }
        MatExpr::from_entries(n, n, entries)
    }

    /// Read the solved matrix from a primal point.
    pub fn value(&self, x: &[f64]) -> Array2<Complex64> {
        let n = self.dim;
        let mut m = Array2::zeros((n, n));
        for i in 0..n {
            m[[i, i]] = Complex64::new(x[self.offset + i], 0.0);
            for j in i + 1..n {
                let (re, im) = self.off_diagonal(i, j);
                let z = Complex64::new(x[re], im.map_or(0.0, |v| x[v]));
                m[[i, j]] = z;
                m[[j, i]] = z.conj();
            }
        }
        m
    }
}

/// Real scalar variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarVar {
    pub(crate) id: VarId,
}

impl ScalarVar {
    pub fn expr(&self) -> Affine {
        Affine::term(self.id, ONE)
    }

    pub fn value(&self, x: &[f64]) -> f64 {
        x[self.id]
    }
}
