//! regarima_outliers — outlier detection for regression-ARIMA models.
//!
//! Purpose
//! -------
//! Detect atypical observations in time series modeled as a regression with
//! ARIMA noise, as used in seasonal adjustment. For every candidate position
//! and every registered outlier shape the crate computes the coefficient and
//! t-statistic the corresponding regressor would get in the model,
//! standardized by a robust noise scale.
//!
//! Key behaviors
//! -------------
//! - `robust_scale`: MAD-type estimators of the innovation standard
//!   deviation.
//! - `regarima`: lag polynomials, (seasonal) ARIMA models, the
//!   regression-ARIMA container with missing-value handling, ARMA filters and
//!   QR least squares.
//! - `outliers`: outlier shapes, the detector orchestrator, and the exact
//!   (QR-based) and fast (convolution-based) detection methods.
//!
//! Invariants & assumptions
//! ------------------------
//! - All computations are single-threaded and synchronous. Detectors own
//!   their buffers; separate detectors may run on separate threads.
//! - Degenerate candidates yield excluded cells with statistic 0, never NaN.
//!
//! Conventions
//! -----------
//! - Positions are 0-based indices into the series; candidate windows are
//!   half-open.
//! - Backshift polynomials use `φ(B) = 1 − Σ φ_i B^i` for AR parts and
//!   `θ(B) = 1 + Σ θ_j B^j` for MA parts.
//! - Fallible operations return module-specific result aliases
//!   ([`robust_scale::ScaleResult`], [`regarima::RegArimaResult`],
//!   [`outliers::DetectorResult`]).
//! - The library emits `tracing` events but never installs a subscriber.
//!
//! Downstream usage
//! ----------------
//! - Build a [`regarima::RegArimaModel`], register shapes on an
//!   [`outliers::ExactOutlierDetector`] or [`outliers::FastOutlierDetector`],
//!   call `prepare(n)` and `process(&model)`, then read `max_outlier()` or
//!   individual cells.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `tests/` holds end-to-end
//!   scenarios (planted outliers, exact-vs-fast agreement, missing values).

pub mod outliers;
pub mod regarima;
pub mod robust_scale;
