//! regarima::model — regression model with ARIMA noise and missing values.
//!
//! Purpose
//! -------
//! Bundle the dependent series, the deterministic regression variables and
//! the ARIMA noise model into a single validated value,
//! `y_t = X_t β + z_t` with `φ(B) δ(B) z_t = θ(B) ε_t`.
//!
//! Key behaviors
//! -------------
//! - NaN entries of `y` mark missing observations. They are recorded, replaced
//!   by 0 in [`RegArimaModel::filled_y`], and absorbed by one additive-outlier
//!   column each in [`RegArimaModel::regression_variables`].
//! - Regression variables are stored as an `N × k` matrix (one column per
//!   variable).
//!
//! Invariants & assumptions
//! ------------------------
//! - `len() > differencing_degree()` and at least one observation is present.
//! - Regression variables are finite and have exactly `len()` rows.

use crate::regarima::{
    arima::ArimaModel,
    errors::{RegArimaError, RegArimaResult},
};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

#[derive(Debug, Clone, PartialEq)]
pub struct RegArimaModel {
    y: Array1<f64>,
    regressors: Array2<f64>,
    arima: ArimaModel,
    missing: Vec<usize>,
}

impl RegArimaModel {
    /// Build a model without regression variables.
    ///
    /// Parameters
    /// ----------
    /// - `y`: `Array1<f64>`
    ///   Observations; NaN marks a missing value.
    /// - `arima`: [`ArimaModel`]
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::EmptySeries`, `RegArimaError::NonFiniteData` (±inf),
    ///   `RegArimaError::AllMissing`, `RegArimaError::SeriesTooShort`.
    pub fn new(y: Array1<f64>, arima: ArimaModel) -> RegArimaResult<Self> {
        if y.is_empty() {
            return Err(RegArimaError::EmptySeries);
        }
        let mut missing = Vec::new();
        for (index, &value) in y.iter().enumerate() {
            if value.is_nan() {
                missing.push(index);
            } else if value.is_infinite() {
                return Err(RegArimaError::NonFiniteData { index, value });
            }
        }
        if missing.len() == y.len() {
            return Err(RegArimaError::AllMissing);
        }
        let differencing = arima.differencing_degree();
        if y.len() <= differencing {
            return Err(RegArimaError::SeriesTooShort { len: y.len(), differencing });
        }
        let regressors = Array2::zeros((y.len(), 0));
        Ok(Self { y, regressors, arima, missing })
    }

    /// Attach regression variables (`N × k`, one column per variable).
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::RegressorShapeMismatch`
    ///   If the row count differs from `len()`.
    /// - `RegArimaError::NonFiniteRegressor`
    ///   If any entry is NaN/±inf.
    pub fn with_regressors(mut self, regressors: Array2<f64>) -> RegArimaResult<Self> {
        if regressors.nrows() != self.y.len() {
            return Err(RegArimaError::RegressorShapeMismatch {
                expected: self.y.len(),
                actual: regressors.nrows(),
            });
        }
        if let Some(((row, col), &value)) = regressors.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(RegArimaError::NonFiniteRegressor { row, col, value });
        }
        self.regressors = regressors;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Raw observations, NaN at missing positions.
    pub fn y(&self) -> ArrayView1<'_, f64> {
        self.y.view()
    }

    /// Observations with missing values replaced by 0.
    pub fn filled_y(&self) -> Array1<f64> {
        self.y.mapv(|v| if v.is_nan() { 0.0 } else { v })
    }

    /// User-supplied regression variables only.
    pub fn regressors(&self) -> ArrayView2<'_, f64> {
        self.regressors.view()
    }

    /// Positions of missing observations, increasing.
    pub fn missing(&self) -> &[usize] {
        &self.missing
    }

    pub fn arima(&self) -> &ArimaModel {
        &self.arima
    }

    /// Full design matrix: user regressors followed by one pulse column per
    /// missing observation.
    pub fn regression_variables(&self) -> Array2<f64> {
        let n = self.y.len();
        let k = self.regressors.ncols();
        let mut x = Array2::zeros((n, k + self.missing.len()));
        x.slice_mut(s![.., ..k]).assign(&self.regressors);
        for (j, &pos) in self.missing.iter().enumerate() {
            x[[pos, k + j]] = 1.0;
        }
        x
    }
}
