//! robust_scale — breakdown-resistant noise scale for outlier statistics.
//!
//! Purpose
//! -------
//! Provide the scale estimate that standardizes every outlier t-statistic.
//! Using a MAD-type estimator keeps a few large residuals (the outliers being
//! searched for) from inflating the denominator and masking themselves.
//!
//! Key behaviors
//! -------------
//! - [`RobustScaleEstimator`] is a small `Copy` configuration value
//!   (centering kind + centile) with a single operation,
//!   [`RobustScaleEstimator::compute`].
//! - [`MadKind`] selects plain absolute residuals or deviations from the
//!   median.
//!
//! Conventions
//! -----------
//! - Failures are reported via [`ScaleResult`]; the estimator never returns
//!   NaN.
//!
//! Testing notes
//! -------------
//! - Unit tests in `mad` pin the rank rule and robustness under
//!   contamination.

pub mod errors;
pub mod mad;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{ScaleError, ScaleResult};
pub use self::mad::{MadKind, RobustScaleEstimator};
