//! regarima::filter — ARMA filters mapping differenced data to innovations.
//!
//! Purpose
//! -------
//! Turn a (differenced) series `z` that follows a stationary ARMA process into
//! approximately white residuals `e`, so that ordinary least squares on the
//! filtered data is valid. The exact outlier detector filters the dependent
//! series, every regression variable and every candidate outlier regressor
//! with the same prepared filter.
//!
//! Key behaviors
//! -------------
//! - [`ArmaFilter`] is the seam: `prepare` binds the filter to a model and a
//!   sample length and returns the effective output length; `apply` filters
//!   one vector.
//! - [`ConditionalArmaFilter`] solves `θ(B) e_t = φ(B) z_t` with zero
//!   pre-sample values (equivalently, convolution with truncated π-weights).
//! - [`CholeskyArmaFilter`] uses the Cholesky factor `L` of the exact ARMA
//!   autocovariance matrix and returns `e = L⁻¹ z` (GLS transformation).
//!
//! Invariants & assumptions
//! ------------------------
//! - `apply` must only be called after a successful `prepare`; inputs and
//!   outputs must have the prepared length.
//! - The Cholesky filter needs a stationary `φ(B)`; otherwise the
//!   autocovariance matrix may fail to be positive definite.
//!
//! Conventions
//! -----------
//! - Both filters preserve the sample length.
//! - Dense linear algebra is done in `nalgebra` after copying from `ndarray`.

use crate::regarima::{
    arima::ArimaModel,
    errors::{RegArimaError, RegArimaResult},
    polynomial::LagPolynomial,
};
use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1};

/// Stationarizing filter applied to the differenced regression problem.
pub trait ArmaFilter: std::fmt::Debug + Send {
    /// Bind the filter to `arima` for inputs of length `length`.
    ///
    /// Returns
    /// -------
    /// The length of every filtered output.
    fn prepare(&mut self, arima: &ArimaModel, length: usize) -> RegArimaResult<usize>;

    /// Filter `input` into `output`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::FilterNotPrepared`
    /// - `RegArimaError::FilterLengthMismatch`
    fn apply(&self, input: ArrayView1<f64>, output: ArrayViewMut1<f64>) -> RegArimaResult<()>;
}

fn check_lengths(
    prepared: usize, input: &ArrayView1<f64>, output: &ArrayViewMut1<f64>,
) -> RegArimaResult<()> {
    if input.len() != prepared {
        return Err(RegArimaError::FilterLengthMismatch { expected: prepared, actual: input.len() });
    }
    if output.len() != prepared {
        return Err(RegArimaError::FilterLengthMismatch {
            expected: prepared,
            actual: output.len(),
        });
    }
    Ok(())
}

/// Conditional (zero pre-sample) ARMA filter.
#[derive(Debug, Clone, Default)]
pub struct ConditionalArmaFilter {
    state: Option<ConditionalState>,
}

#[derive(Debug, Clone)]
struct ConditionalState {
    ar: LagPolynomial,
    ma: LagPolynomial,
    length: usize,
}

impl ConditionalArmaFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArmaFilter for ConditionalArmaFilter {
    fn prepare(&mut self, arima: &ArimaModel, length: usize) -> RegArimaResult<usize> {
        self.state = Some(ConditionalState {
            ar: arima.stationary_ar().clone(),
            ma: arima.ma().clone(),
            length,
        });
        Ok(length)
    }

    fn apply(&self, input: ArrayView1<f64>, mut output: ArrayViewMut1<f64>) -> RegArimaResult<()> {
        let state = self.state.as_ref().ok_or(RegArimaError::FilterNotPrepared)?;
        check_lengths(state.length, &input, &output)?;

        let phi = state.ar.coefficients();
        let theta = state.ma.coefficients();
        let theta0 = theta[0];
        for t in 0..state.length {
            let mut acc = 0.0;
            for (i, &c) in phi.iter().enumerate().take(t + 1) {
                acc += c * input[t - i];
            }
            for (j, &c) in theta.iter().enumerate().take(t + 1).skip(1) {
                acc -= c * output[t - j];
            }
            output[t] = acc / theta0;
        }
        Ok(())
    }
}

/// Exact GLS filter based on the Cholesky factor of the ARMA
/// autocovariance matrix.
#[derive(Debug, Clone, Default)]
pub struct CholeskyArmaFilter {
    lower: Option<Array2<f64>>,
}

impl CholeskyArmaFilter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArmaFilter for CholeskyArmaFilter {
    fn prepare(&mut self, arima: &ArimaModel, length: usize) -> RegArimaResult<usize> {
        self.lower = None;
        let acf = arima.autocovariances(length);
        let cov = DMatrix::from_fn(length, length, |i, j| acf[i.abs_diff(j)]);
        let chol = cov.cholesky().ok_or(RegArimaError::NotPositiveDefinite)?;
        let l = chol.l();
        self.lower = Some(Array2::from_shape_fn((length, length), |(i, j)| l[(i, j)]));
        Ok(length)
    }

    fn apply(&self, input: ArrayView1<f64>, output: ArrayViewMut1<f64>) -> RegArimaResult<()> {
        let lower = self.lower.as_ref().ok_or(RegArimaError::FilterNotPrepared)?;
        check_lengths(lower.nrows(), &input, &output)?;
        forward_substitution(lower.view(), input, output)
    }
}

/// Solve `L x = b` for lower-triangular `L` by forward substitution.
///
/// Parameters
/// ----------
/// - `l`: `ArrayView2<f64>`
///   Square lower-triangular matrix; the strict upper triangle is ignored.
/// - `b`: `ArrayView1<f64>`
///   Right-hand side of length `l.nrows()`.
/// - `out`: `ArrayViewMut1<f64>`
///   Receives the solution.
///
/// Errors
/// ------
/// - `RegArimaError::FilterLengthMismatch`
///   If the dimensions disagree.
/// - `RegArimaError::RankDeficient`
///   If a diagonal entry is zero.
pub fn forward_substitution(
    l: ArrayView2<f64>, b: ArrayView1<f64>, mut out: ArrayViewMut1<f64>,
) -> RegArimaResult<()> {
    let n = l.nrows();
    if l.ncols() != n || b.len() != n || out.len() != n {
        return Err(RegArimaError::FilterLengthMismatch { expected: n, actual: b.len() });
    }
    for i in 0..n {
        let diag = l[[i, i]];
        if diag == 0.0 {
            return Err(RegArimaError::RankDeficient { column: i });
        }
        let mut acc = b[i];
        for j in 0..i {
            acc -= l[[i, j]] * out[j];
        }
        out[i] = acc / diag;
    }
    Ok(())
}
