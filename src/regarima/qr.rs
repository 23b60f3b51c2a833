//! regarima::qr — least squares by Householder QR.
//!
//! Purpose
//! -------
//! Solve `min_b ‖y − X b‖²` once for a filtered regression problem and keep
//! the pieces the exact outlier detector reuses for every candidate: the
//! coefficients, the upper-triangular factor `R` and the residuals.
//!
//! Key behaviors
//! -------------
//! - Copy the `ndarray` inputs into `nalgebra::DMatrix`, factor with
//!   `DMatrix::qr`, and back-substitute `R b = Qᵗ y`.
//! - Flag rank deficiency when a diagonal entry of `R` is negligible relative
//!   to the largest one.
//!
//! Invariants & assumptions
//! ------------------------
//! - `X` has at least as many rows as columns and at least one column.
//! - `RᵗR = XᵗX`; the signs of the diagonal of `R` are not normalized.

use crate::regarima::errors::{RegArimaError, RegArimaResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Relative threshold on `|R_jj| / max_i |R_ii|` below which `X` is treated
/// as rank deficient.
pub const RANK_TOL: f64 = 1e-12;

/// Householder QR least-squares solver.
#[derive(Debug, Clone, Default)]
pub struct QrSolver {
    coefficients: Array1<f64>,
    r: Array2<f64>,
    residuals: Array1<f64>,
}

impl QrSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factor `x` and solve for `y`.
    ///
    /// Parameters
    /// ----------
    /// - `y`: `ArrayView1<f64>`
    ///   Response of length `n`.
    /// - `x`: `ArrayView2<f64>`
    ///   Design matrix `n × k`, `1 ≤ k ≤ n`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::RegressorShapeMismatch`
    ///   If `x.nrows() != y.len()`.
    /// - `RegArimaError::Underdetermined`
    ///   If `k == 0` or `k > n`.
    /// - `RegArimaError::RankDeficient`
    ///   If some `|R_jj|` is negligible.
    pub fn solve(&mut self, y: ArrayView1<f64>, x: ArrayView2<f64>) -> RegArimaResult<()> {
        let (n, k) = x.dim();
        if n != y.len() {
            return Err(RegArimaError::RegressorShapeMismatch { expected: y.len(), actual: n });
        }
        if k == 0 || k > n {
            return Err(RegArimaError::Underdetermined { rows: n, cols: k });
        }

        let xm = DMatrix::from_fn(n, k, |i, j| x[[i, j]]);
        let mut qty = DVector::from_iterator(n, y.iter().copied());
        let qr = xm.qr();
        qr.q_tr_mul(&mut qty);
        let r = qr.r();

        let max_diag = (0..k).map(|j| r[(j, j)].abs()).fold(0.0_f64, f64::max);
        if let Some(column) = (0..k).find(|&j| r[(j, j)].abs() <= RANK_TOL * max_diag) {
            return Err(RegArimaError::RankDeficient { column });
        }
        let rhs = qty.rows(0, k).into_owned();
        let b = r.solve_upper_triangular(&rhs).ok_or(RegArimaError::RankDeficient { column: 0 })?;

        self.coefficients = Array1::from_iter(b.iter().copied());
        self.r = Array2::from_shape_fn((k, k), |(i, j)| r[(i, j)]);
        self.residuals = &y - &x.dot(&self.coefficients);
        Ok(())
    }

    /// Least-squares coefficients `b`.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Upper-triangular factor `R` (`k × k`).
    pub fn r(&self) -> &Array2<f64> {
        &self.r
    }

    /// Residuals `y − X b`.
    pub fn residuals(&self) -> &Array1<f64> {
        &self.residuals
    }
}
