//! robust_scale::errors — failures of robust scale estimation.

/// Result alias for robust scale estimation.
pub type ScaleResult<T> = Result<T, ScaleError>;

/// Errors raised while configuring or running a [`super::RobustScaleEstimator`].
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleError {
    // ---- Configuration ----
    /// Centile must be finite and strictly between 0 and 100.
    InvalidCentile { centile: f64 },

    // ---- Input validation ----
    /// No residuals were supplied.
    EmptyResiduals,

    /// A residual is NaN/±inf.
    NonFiniteResidual { index: usize, value: f64 },
}

impl std::error::Error for ScaleError {}

impl std::fmt::Display for ScaleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScaleError::InvalidCentile { centile } => {
                write!(f, "Centile must be finite and in (0, 100); got {centile}")
            }
            ScaleError::EmptyResiduals => write!(f, "Residual sequence is empty."),
            ScaleError::NonFiniteResidual { index, value } => {
                write!(f, "Residual at index {index} is non-finite: {value}")
            }
        }
    }
}
