//! outliers — detection of additive, level-shift, transitory and seasonal
//! outliers in regression-ARIMA models.
//!
//! Purpose
//! -------
//! Scan every candidate position for every registered outlier shape and
//! compute the t-statistic that regressor would get in the model. The
//! statistics are standardized by a robust scale, so large values flag
//! candidates for inclusion in the model.
//!
//! Key behaviors
//! -------------
//! - [`OutlierShape`] enumerates the regressor patterns (AO, LS, TC, SO).
//! - [`OutlierDetector`] owns shapes, bounds, mask and tables, and delegates
//!   the numerics to a [`DetectionMethod`]:
//!   - [`ExactDetection`] (QR projections, pluggable ARMA filter),
//!   - [`FastDetection`] (single convolution + sliding window per shape).
//! - [`ExactOutlierDetector`] and [`FastOutlierDetector`] are the two
//!   ready-made detector types.
//!
//! Invariants & assumptions
//! ------------------------
//! - An excluded `(position, shape)` cell always reads 0.
//! - Failed runs never modify tables; `process` logs them with
//!   `tracing::warn!` and returns `false`.
//!
//! Downstream usage
//! ----------------
//! ```
//! use ndarray::Array1;
//! use regarima_outliers::outliers::{FastOutlierDetector, OutlierShape};
//! use regarima_outliers::regarima::{ArimaModel, RegArimaModel};
//!
//! let mut y = Array1::from_shape_fn(60, |i| ((i * 7919) % 13) as f64 / 13.0 - 0.5);
//! y[30] += 25.0;
//! let model = RegArimaModel::new(y, ArimaModel::white_noise()).unwrap();
//!
//! let mut detector = FastOutlierDetector::default();
//! detector.add_shape(OutlierShape::additive());
//! detector.prepare(model.len());
//! assert!(detector.process(&model));
//! assert_eq!(detector.max_outlier_position(), Some(30));
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests pin closed forms for white noise in both methods; the
//!   integration tests compare exact and fast results on ARIMA models and
//!   check planted outliers.

pub mod detector;
pub mod errors;
pub mod exact;
pub mod fast;
pub mod shape;
pub mod tables;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::detector::{DetectionContext, DetectionMethod, OutlierCandidate, OutlierDetector};
pub use self::errors::{DetectorError, DetectorResult};
pub use self::exact::{COLLINEARITY_TOL, ExactDetection};
pub use self::fast::FastDetection;
pub use self::shape::{FilterRepresentation, OutlierShape, WeightedShape};
pub use self::tables::OutlierTables;

/// Detector using exact QR-based statistics.
pub type ExactOutlierDetector = OutlierDetector<ExactDetection>;

/// Detector using fast convolution-based statistics.
pub type FastOutlierDetector = OutlierDetector<FastDetection>;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::detector::{OutlierCandidate, OutlierDetector};
    pub use super::errors::{DetectorError, DetectorResult};
    pub use super::shape::OutlierShape;
    pub use super::{ExactOutlierDetector, FastOutlierDetector};
}
