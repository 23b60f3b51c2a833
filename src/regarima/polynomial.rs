//! regarima::polynomial — backshift (lag) polynomials and rational filters.
//!
//! Purpose
//! -------
//! Represent polynomials in the backshift operator `B`,
//! `c(B) = c0 + c1 B + … + cq B^q`, and provide the handful of operations the
//! outlier engine needs: products, evaluation at unity, "valid" filtering of a
//! series, and impulse responses of rational filters `num(B) / den(B)`.
//!
//! Key behaviors
//! -------------
//! - [`LagPolynomial::new`] validates coefficients (non-empty, finite,
//!   non-zero constant term).
//! - Builders for AR-style `1 − Σ a_i B^{s·i}`, MA-style `1 + Σ a_i B^{s·i}`
//!   and differencing `(1 − B)^d (1 − B^s)^D` polynomials.
//! - [`LagPolynomial::apply_valid`] computes `out[t] = Σ_i c_i x[t + q − i]`,
//!   i.e. the filtered series without the first `q` points.
//! - [`LagPolynomial::impulse_response`] expands `num(B) / den(B)` into its
//!   first `n` power-series coefficients.
//!
//! Invariants & assumptions
//! ------------------------
//! - The constant term is never zero, so division by `den(B)` is always
//!   defined as a formal power series.
//! - Trailing zero coefficients are kept; `degree()` is `len − 1`.
//!
//! Conventions
//! -----------
//! - Coefficient `i` multiplies `B^i` (so `B^i x_t = x_{t−i}`).
//! - Series are `ndarray` vectors indexed in time order.

use crate::regarima::errors::{RegArimaError, RegArimaResult};
use ndarray::{Array1, ArrayView1, s};

/// Polynomial in the backshift operator `B` with a non-zero constant term.
#[derive(Debug, Clone, PartialEq)]
pub struct LagPolynomial {
    coeffs: Array1<f64>,
}

impl LagPolynomial {
    /// Construct a validated lag polynomial.
    ///
    /// Parameters
    /// ----------
    /// - `coeffs`: `Array1<f64>`
    ///   Coefficients in increasing lag order, `coeffs[i]` multiplying `B^i`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::InvalidPolynomial`
    ///   If `coeffs` is empty, contains a non-finite value, or `coeffs[0]`
    ///   is zero.
    pub fn new(coeffs: Array1<f64>) -> RegArimaResult<Self> {
        if coeffs.is_empty() {
            return Err(RegArimaError::InvalidPolynomial { reason: "no coefficients" });
        }
        if coeffs.iter().any(|c| !c.is_finite()) {
            return Err(RegArimaError::InvalidPolynomial { reason: "non-finite coefficient" });
        }
        if coeffs[0] == 0.0 {
            return Err(RegArimaError::InvalidPolynomial { reason: "zero constant term" });
        }
        Ok(Self { coeffs })
    }

    /// The identity polynomial `1`.
    pub fn one() -> Self {
        Self { coeffs: Array1::from_elem(1, 1.0) }
    }

    /// Autoregressive-style polynomial `1 − Σ_i a_i B^{stride·i}`.
    pub fn autoregressive(params: ArrayView1<f64>, stride: usize) -> RegArimaResult<Self> {
        Self::from_lags(params, stride, -1.0)
    }

    /// Moving-average-style polynomial `1 + Σ_i a_i B^{stride·i}`.
    pub fn moving_average(params: ArrayView1<f64>, stride: usize) -> RegArimaResult<Self> {
        Self::from_lags(params, stride, 1.0)
    }

    fn from_lags(params: ArrayView1<f64>, stride: usize, sign: f64) -> RegArimaResult<Self> {
        if stride == 0 {
            return Err(RegArimaError::InvalidPolynomial { reason: "zero lag stride" });
        }
        let mut coeffs = Array1::zeros(params.len() * stride + 1);
        coeffs[0] = 1.0;
        for (i, &a) in params.iter().enumerate() {
            coeffs[(i + 1) * stride] = sign * a;
        }
        Self::new(coeffs)
    }

    /// Differencing operator `(1 − B)^d (1 − B^period)^seasonal_d`.
    ///
    /// `period` is ignored when `seasonal_d == 0`.
    pub fn differencing(d: usize, seasonal_d: usize, period: usize) -> Self {
        let mut out = Self::one();
        let regular = Self { coeffs: Array1::from(vec![1.0, -1.0]) };
        for _ in 0..d {
            out = out.times(&regular);
        }
        if seasonal_d > 0 && period > 0 {
            let mut c = Array1::zeros(period + 1);
            c[0] = 1.0;
            c[period] = -1.0;
            let seasonal = Self { coeffs: c };
            for _ in 0..seasonal_d {
                out = out.times(&seasonal);
            }
        }
        out
    }

    /// Highest lag carried by the coefficient vector.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    pub fn coefficients(&self) -> ArrayView1<'_, f64> {
        self.coeffs.view()
    }

    /// `true` when the polynomial is the constant `1`.
    pub fn is_identity(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == 1.0
    }

    /// Polynomial product `self(B) · other(B)`.
    pub fn times(&self, other: &LagPolynomial) -> LagPolynomial {
        let mut out = Array1::zeros(self.coeffs.len() + other.coeffs.len() - 1);
        for (i, &a) in self.coeffs.iter().enumerate() {
            if a == 0.0 {
                continue;
            }
            for (j, &b) in other.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        LagPolynomial { coeffs: out }
    }

    /// Value of the polynomial at `B = 1` (sum of coefficients).
    pub fn eval_at_one(&self) -> f64 {
        self.coeffs.sum()
    }

    /// Filter a series, dropping the first `degree()` points.
    ///
    /// Returns
    /// -------
    /// `Array1<f64>` of length `input.len() − degree()` with
    /// `out[t] = Σ_i c_i · input[t + degree − i]`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::SeriesTooShort`
    ///   If `input` is not longer than the degree.
    pub fn apply_valid(&self, input: ArrayView1<f64>) -> RegArimaResult<Array1<f64>> {
        let q = self.degree();
        if input.len() <= q {
            return Err(RegArimaError::SeriesTooShort { len: input.len(), differencing: q });
        }
        if q == 0 {
            return Ok(input.mapv(|x| x * self.coeffs[0]));
        }
        let m = input.len() - q;
        let mut out = Array1::zeros(m);
        for (i, &c) in self.coeffs.iter().enumerate() {
            if c == 0.0 {
                continue;
            }
            out.scaled_add(c, &input.slice(s![q - i..q - i + m]));
        }
        Ok(out)
    }

    /// First `n` coefficients of the power series `num(B) / den(B)`.
    ///
    /// Computed by the recursion
    /// `h_t = (num_t − Σ_{j≥1} den_j h_{t−j}) / den_0`.
    pub fn impulse_response(num: &LagPolynomial, den: &LagPolynomial, n: usize) -> Array1<f64> {
        let mut h = Array1::<f64>::zeros(n);
        let d0 = den.coeffs[0];
        for t in 0..n {
            let mut acc = if t < num.coeffs.len() { num.coeffs[t] } else { 0.0 };
            let upper = den.coeffs.len().min(t + 1);
            for j in 1..upper {
                acc -= den.coeffs[j] * h[t - j];
            }
            h[t] = acc / d0;
        }
        h
    }
}
