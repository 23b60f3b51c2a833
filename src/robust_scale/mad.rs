//! robust_scale::mad — MAD-based estimators of the innovation scale.
//!
//! Purpose
//! -------
//! Estimate the standard deviation of regression-ARIMA residuals in a way
//! that a handful of outliers cannot inflate. The estimate is the
//! `centile`-th order statistic of absolute residuals (optionally centered on
//! their median), rescaled so that it is consistent for the standard
//! deviation of Gaussian noise.
//!
//! Key behaviors
//! -------------
//! - [`MadKind::Plain`] uses `|e_i|` directly (residuals assumed mean-zero).
//! - [`MadKind::MedianCorrected`] uses `|e_i − median(e)|`.
//! - The order statistic at fractional rank `r = (n + 1)·centile/100` is
//!   linearly interpolated between neighbors and clamped to the sample range.
//! - The result is divided by `Φ⁻¹(0.5 + 0.005·centile)`, e.g. `0.6744897…`
//!   for the median.
//!
//! Invariants & assumptions
//! ------------------------
//! - `centile` is finite and in `(0, 100)`; validated at construction.
//! - Residuals must be finite and non-empty; violations return
//!   [`ScaleError`] rather than producing NaN.
//!
//! Conventions
//! -----------
//! - Ranks are 1-based in the formulas and 0-based in code.
//! - Fractional parts below [`RANK_EPS`] are treated as exact ranks.

use crate::robust_scale::errors::{ScaleError, ScaleResult};
use ndarray::ArrayView1;
use statrs::distribution::{ContinuousCDF, Normal};

/// Fractional rank parts smaller than this select a single order statistic.
pub const RANK_EPS: f64 = 1e-9;

/// Centering used before taking absolute deviations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MadKind {
    /// Absolute residuals, no centering.
    #[default]
    Plain,
    /// Absolute deviations from the sample median.
    MedianCorrected,
}

/// Robust (MAD-type) scale estimator.
///
/// Examples
/// --------
/// ```
/// use ndarray::array;
/// use regarima_outliers::robust_scale::{MadKind, RobustScaleEstimator};
///
/// let est = RobustScaleEstimator::new(MadKind::Plain, 50.0).unwrap();
/// let s = est.compute(array![1.0, -2.0, 3.0, -4.0].view()).unwrap();
/// assert!((s - 2.5 / 0.6744897501960817).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustScaleEstimator {
    kind: MadKind,
    centile: f64,
}

impl Default for RobustScaleEstimator {
    fn default() -> Self {
        Self { kind: MadKind::Plain, centile: 50.0 }
    }
}

impl RobustScaleEstimator {
    /// Construct a validated estimator.
    ///
    /// Errors
    /// ------
    /// - `ScaleError::InvalidCentile`
    ///   If `centile` is not finite or not in `(0, 100)`.
    pub fn new(kind: MadKind, centile: f64) -> ScaleResult<Self> {
        if !centile.is_finite() || centile <= 0.0 || centile >= 100.0 {
            return Err(ScaleError::InvalidCentile { centile });
        }
        Ok(Self { kind, centile })
    }

    pub fn kind(&self) -> MadKind {
        self.kind
    }

    pub fn centile(&self) -> f64 {
        self.centile
    }

    /// Robust scale of `residuals`.
    ///
    /// Parameters
    /// ----------
    /// - `residuals`: `ArrayView1<f64>`
    ///   Finite residuals, at least one.
    ///
    /// Returns
    /// -------
    /// The rescaled order statistic. Zero when at least `centile` percent
    /// of the (centered) residuals are zero.
    ///
    /// Errors
    /// ------
    /// - `ScaleError::EmptyResiduals`
    /// - `ScaleError::NonFiniteResidual`
    pub fn compute(&self, residuals: ArrayView1<f64>) -> ScaleResult<f64> {
        if residuals.is_empty() {
            return Err(ScaleError::EmptyResiduals);
        }
        if let Some((index, &value)) = residuals.iter().enumerate().find(|(_, v)| !v.is_finite())
        {
            return Err(ScaleError::NonFiniteResidual { index, value });
        }

        let center = match self.kind {
            MadKind::Plain => 0.0,
            MadKind::MedianCorrected => median(&mut residuals.to_vec()),
        };
        let mut abs: Vec<f64> = residuals.iter().map(|e| (e - center).abs()).collect();
        abs.sort_unstable_by(f64::total_cmp);

        Ok(order_statistic(&abs, self.centile) / self.normal_quantile())
    }

    fn normal_quantile(&self) -> f64 {
        let std_normal = Normal::new(0.0, 1.0).expect("mean = 0, sd = 1");
        std_normal.inverse_cdf(0.5 + 0.005 * self.centile)
    }
}

/// Interpolated order statistic of a sorted, non-empty sample.
fn order_statistic(sorted: &[f64], centile: f64) -> f64 {
    let n = sorted.len();
    let rank = (n as f64 + 1.0) * centile / 100.0;
    let k = rank.floor() as usize;
    let frac = rank - k as f64;
    if k == 0 {
        sorted[0]
    } else if k >= n {
        sorted[n - 1]
    } else if frac < RANK_EPS {
        sorted[k - 1]
    } else {
        sorted[k - 1] * (1.0 - frac) + sorted[k] * frac
    }
}

/// Sample median; averages the central pair for even lengths.
fn median(vals: &mut [f64]) -> f64 {
    let n = vals.len();
    let mid = n / 2;
    vals.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = vals[mid];
    if n % 2 == 1 {
        return upper;
    }
    let lower = vals[..mid].iter().copied().fold(f64::NEG_INFINITY, f64::max);
    0.5 * (lower + upper)
}
