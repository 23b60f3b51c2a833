//! outliers::errors — error surface for outlier detection.
//!
//! Purpose
//! -------
//! Report configuration mistakes (no shapes, bad weights or shape parameters,
//! empty candidate window), lifecycle misuse (processing before `prepare`,
//! model/table length mismatch) and collaborator failures bubbling up from
//! the regression-ARIMA layer or the robust scale estimator.
//!
//! Conventions
//! -----------
//! - Degenerate candidates (collinear or zero-energy regressors) are not
//!   errors; the detectors exclude the cell and move on.
//! - `From` conversions let detection code use `?` on [`RegArimaError`] and
//!   [`ScaleError`].

use crate::{regarima::errors::RegArimaError, robust_scale::errors::ScaleError};

/// Result alias for detector operations.
pub type DetectorResult<T> = Result<T, DetectorError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DetectorError {
    // ---- Configuration ----
    /// No outlier shape has been registered.
    NoShapes,

    /// Shape weight must be finite and strictly positive.
    InvalidWeight { value: f64 },

    /// A shape parameter is out of its admissible range.
    InvalidShapeParam { param: &'static str, reason: &'static str },

    /// Candidate window is empty (`upper <= lower`).
    DegenerateBounds { lower: usize, upper: usize },

    // ---- Lifecycle ----
    /// Tables are missing; call `prepare` first.
    NotPrepared,

    /// Model length differs from the prepared table length.
    LengthMismatch { expected: usize, actual: usize },

    // ---- Numerical ----
    /// Robust scale is zero or non-finite, so no statistic can be formed.
    DegenerateScale { value: f64 },

    // ---- Collaborators ----
    Scale(ScaleError),
    Model(RegArimaError),
}

impl std::error::Error for DetectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DetectorError::Scale(e) => Some(e),
            DetectorError::Model(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for DetectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            DetectorError::NoShapes => write!(f, "No outlier shape registered."),
            DetectorError::InvalidWeight { value } => {
                write!(f, "Shape weight must be finite and > 0; got {value}")
            }
            DetectorError::InvalidShapeParam { param, reason } => {
                write!(f, "Invalid outlier shape parameter '{param}': {reason}")
            }
            DetectorError::DegenerateBounds { lower, upper } => {
                write!(f, "Empty candidate window: lower = {lower}, upper = {upper}")
            }
            // ---- Lifecycle ----
            DetectorError::NotPrepared => {
                write!(f, "Outlier tables are not allocated; call prepare first.")
            }
            DetectorError::LengthMismatch { expected, actual } => write!(
                f,
                "Model length {actual} does not match the prepared length {expected}"
            ),
            // ---- Numerical ----
            DetectorError::DegenerateScale { value } => {
                write!(f, "Robust scale is degenerate: {value}")
            }
            // ---- Collaborators ----
            DetectorError::Scale(e) => write!(f, "Robust scale estimation failed: {e}"),
            DetectorError::Model(e) => write!(f, "Regression-ARIMA computation failed: {e}"),
        }
    }
}

impl From<ScaleError> for DetectorError {
    fn from(err: ScaleError) -> Self {
        DetectorError::Scale(err)
    }
}

impl From<RegArimaError> for DetectorError {
    fn from(err: RegArimaError) -> Self {
        DetectorError::Model(err)
    }
}
