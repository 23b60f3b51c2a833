//! regarima::errors — error surface for model construction and linear algebra.
//!
//! Purpose
//! -------
//! Collect the failures that can occur while building a regression-ARIMA
//! model and while running the collaborators the detectors rely on
//! (differencing, ARMA filtering, QR least squares).
//!
//! Key behaviors
//! -------------
//! - Define [`RegArimaError`] and the alias [`RegArimaResult`].
//! - Attach human-readable `Display` messages that embed the offending value
//!   or index.
//! - Convert `anyhow::Error` values coming from the external `arima`
//!   estimator into [`RegArimaError::Estimation`].
//!
//! Conventions
//! -----------
//! - Indices are 0-based.
//! - Numerical degeneracies that the detectors recover from locally (e.g. a
//!   collinear candidate regressor) are *not* represented here; only genuine
//!   collaborator failures are.

/// Result alias for model construction, filtering and least-squares paths.
pub type RegArimaResult<T> = Result<T, RegArimaError>;

/// Unified error type for regression-ARIMA collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum RegArimaError {
    // ---- Series / data validation ----
    /// The dependent series is empty.
    EmptySeries,

    /// The series is not longer than the differencing degree.
    SeriesTooShort { len: usize, differencing: usize },

    /// A data point is ±inf (NaN marks a missing value and is accepted).
    NonFiniteData { index: usize, value: f64 },

    /// Every observation of the series is missing.
    AllMissing,

    // ---- Regression variables ----
    /// Regression matrix row count differs from the series length.
    RegressorShapeMismatch { expected: usize, actual: usize },

    /// A regression variable holds a NaN/±inf value.
    NonFiniteRegressor { row: usize, col: usize, value: f64 },

    // ---- Polynomials / ARIMA model ----
    /// A lag polynomial is malformed.
    InvalidPolynomial { reason: &'static str },

    /// A SARIMA coefficient vector does not match its order.
    CoefficientLengthMismatch { name: &'static str, expected: usize, actual: usize },

    /// Seasonal orders were given with a period below 2.
    InvalidPeriod { period: usize },

    /// The MA polynomial vanishes at unity, so φ(1)/θ(1) is undefined.
    NonInvertibleAtUnity,

    // ---- Filtering ----
    /// `apply` was called before a successful `prepare`.
    FilterNotPrepared,

    /// Filter input/output lengths do not match the prepared length.
    FilterLengthMismatch { expected: usize, actual: usize },

    /// The ARMA autocovariance matrix is not positive definite.
    NotPositiveDefinite,

    // ---- Least squares ----
    /// More regression variables than observations.
    Underdetermined { rows: usize, cols: usize },

    /// A diagonal entry of the triangular factor is numerically zero.
    RankDeficient { column: usize },

    // ---- External estimator ----
    /// Failure reported by the `arima` crate.
    Estimation(String),
}

impl std::error::Error for RegArimaError {}

impl std::fmt::Display for RegArimaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Series / data validation ----
            RegArimaError::EmptySeries => write!(f, "Input series is empty."),
            RegArimaError::SeriesTooShort { len, differencing } => write!(
                f,
                "Series of length {len} is too short for a differencing operator of degree {differencing}."
            ),
            RegArimaError::NonFiniteData { index, value } => {
                write!(f, "Data point at index {index} is infinite: {value}")
            }
            RegArimaError::AllMissing => write!(f, "Every observation of the series is missing."),
            // ---- Regression variables ----
            RegArimaError::RegressorShapeMismatch { expected, actual } => write!(
                f,
                "Regression matrix must have one row per observation: expected {expected}, got {actual}"
            ),
            RegArimaError::NonFiniteRegressor { row, col, value } => {
                write!(f, "Regression variable {col} is non-finite at row {row}: {value}")
            }
            // ---- Polynomials / ARIMA model ----
            RegArimaError::InvalidPolynomial { reason } => {
                write!(f, "Invalid lag polynomial: {reason}")
            }
            RegArimaError::CoefficientLengthMismatch { name, expected, actual } => write!(
                f,
                "Coefficient vector '{name}' has length {actual}, expected {expected}"
            ),
            RegArimaError::InvalidPeriod { period } => {
                write!(f, "Seasonal period must be at least 2; got {period}")
            }
            RegArimaError::NonInvertibleAtUnity => {
                write!(f, "MA polynomial evaluates to zero at unity.")
            }
            // ---- Filtering ----
            RegArimaError::FilterNotPrepared => write!(f, "ARMA filter used before prepare."),
            RegArimaError::FilterLengthMismatch { expected, actual } => {
                write!(f, "ARMA filter length mismatch: expected {expected}, got {actual}")
            }
            RegArimaError::NotPositiveDefinite => {
                write!(f, "ARMA autocovariance matrix is not positive definite.")
            }
            // ---- Least squares ----
            RegArimaError::Underdetermined { rows, cols } => write!(
                f,
                "Least-squares problem is underdetermined: {rows} observations for {cols} variables"
            ),
            RegArimaError::RankDeficient { column } => {
                write!(f, "Regression matrix is rank deficient at column {column}")
            }
            // ---- External estimator ----
            RegArimaError::Estimation(msg) => write!(f, "ARMA estimation failed: {msg}"),
        }
    }
}

impl From<anyhow::Error> for RegArimaError {
    fn from(err: anyhow::Error) -> Self {
        RegArimaError::Estimation(err.to_string())
    }
}
