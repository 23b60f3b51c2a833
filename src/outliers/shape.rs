//! outliers::shape — outlier regressor patterns.
//!
//! Purpose
//! -------
//! Describe the archetypal deterministic regressors tested at each candidate
//! position: a one-period pulse (AO), a permanent step (LS), a geometrically
//! decaying pulse (TC), and a pulse recurring every seasonal period (SO).
//!
//! Key behaviors
//! -------------
//! - [`OutlierShape::fill`] writes the regressor for a given position into a
//!   buffer of arbitrary length.
//! - [`OutlierShape::excluded_zone`] gives the number of leading/trailing
//!   positions where the shape is not identifiable.
//! - [`OutlierShape::filter_representation`] expresses the regressor as the
//!   impulse response of a rational filter `num(B)/den(B)` plus a constant,
//!   which the fast detector convolves with the ARIMA filter. Shapes without
//!   such a representation are skipped by the fast detector.
//!
//! Invariants & assumptions
//! ------------------------
//! - TC rates lie in `(0, 1)`; SO periods are at least 2. Both are enforced
//!   by the constructors.
//! - `fill` with a position beyond the buffer leaves the part of the pattern
//!   that precedes the event (zeros, or −1 for a zero-ended LS).

use crate::{
    outliers::errors::{DetectorError, DetectorResult},
    regarima::polynomial::LagPolynomial,
};
use ndarray::{Array1, ArrayViewMut1};

/// Outlier regressor pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlierShape {
    /// Additive outlier: `1` at the position, `0` elsewhere.
    Additive,
    /// Level shift: `0` before, `1` from the position on. When `zero_ended`
    /// the pattern is `−1` before and `0` from the position on.
    LevelShift { zero_ended: bool },
    /// Transitory change: `rate^(t − pos)` from the position on.
    TransitoryChange { rate: f64 },
    /// Seasonal outlier: `1` at `pos + k·period`, `−1/(period − 1)` at the
    /// other dates from the position on.
    SeasonalPulse { period: usize },
}

/// Rational-filter form of a shape: regressor `= num(B)/den(B) · impulse +
/// correction`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRepresentation {
    pub numerator: LagPolynomial,
    pub denominator: LagPolynomial,
    pub correction: f64,
}

impl OutlierShape {
    pub fn additive() -> Self {
        OutlierShape::Additive
    }

    pub fn level_shift() -> Self {
        OutlierShape::LevelShift { zero_ended: false }
    }

    pub fn zero_ended_level_shift() -> Self {
        OutlierShape::LevelShift { zero_ended: true }
    }

    /// Transitory change with decay `rate`.
    ///
    /// Errors
    /// ------
    /// - `DetectorError::InvalidShapeParam`
    ///   If `rate` is not finite or not in `(0, 1)`.
    pub fn transitory_change(rate: f64) -> DetectorResult<Self> {
        if !rate.is_finite() || rate <= 0.0 || rate >= 1.0 {
            return Err(DetectorError::InvalidShapeParam {
                param: "rate",
                reason: "must be finite and in (0, 1)",
            });
        }
        Ok(OutlierShape::TransitoryChange { rate })
    }

    /// Seasonal outlier for the given `period`.
    ///
    /// Errors
    /// ------
    /// - `DetectorError::InvalidShapeParam`
    ///   If `period < 2`.
    pub fn seasonal_pulse(period: usize) -> DetectorResult<Self> {
        if period < 2 {
            return Err(DetectorError::InvalidShapeParam {
                param: "period",
                reason: "must be at least 2",
            });
        }
        Ok(OutlierShape::SeasonalPulse { period })
    }

    /// Short code used in reports: `AO`, `LS`, `TC` or `SO`.
    pub fn code(&self) -> &'static str {
        match self {
            OutlierShape::Additive => "AO",
            OutlierShape::LevelShift { .. } => "LS",
            OutlierShape::TransitoryChange { .. } => "TC",
            OutlierShape::SeasonalPulse { .. } => "SO",
        }
    }

    /// Number of positions excluded at the start and at the end of the
    /// domain.
    pub fn excluded_zone(&self) -> (usize, usize) {
        match *self {
            OutlierShape::Additive | OutlierShape::TransitoryChange { .. } => (0, 0),
            OutlierShape::LevelShift { .. } => (1, 0),
            OutlierShape::SeasonalPulse { period } => (period, 0),
        }
    }

    /// Write the regressor for an event at `position` into `buffer`.
    pub fn fill(&self, position: usize, mut buffer: ArrayViewMut1<f64>) {
        for (t, v) in buffer.iter_mut().enumerate() {
            *v = self.value_at(t, position);
        }
    }

    /// Regressor of length `len` for an event at `position`.
    pub fn regressor(&self, position: usize, len: usize) -> Array1<f64> {
        Array1::from_shape_fn(len, |t| self.value_at(t, position))
    }

    fn value_at(&self, t: usize, position: usize) -> f64 {
        match *self {
            OutlierShape::Additive => {
                if t == position {
                    1.0
                } else {
                    0.0
                }
            }
            OutlierShape::LevelShift { zero_ended } => match (t >= position, zero_ended) {
                (true, false) => 1.0,
                (false, true) => -1.0,
                _ => 0.0,
            },
            OutlierShape::TransitoryChange { rate } => {
                if t >= position {
                    rate.powi((t - position) as i32)
                } else {
                    0.0
                }
            }
            OutlierShape::SeasonalPulse { period } => {
                if t < position {
                    0.0
                } else if (t - position) % period == 0 {
                    1.0
                } else {
                    -1.0 / (period as f64 - 1.0)
                }
            }
        }
    }

    /// Rational-filter form used by the fast detector, if any.
    pub fn filter_representation(&self) -> Option<FilterRepresentation> {
        let one = LagPolynomial::one();
        let unit_root = LagPolynomial::differencing(1, 0, 0);
        match *self {
            OutlierShape::Additive => Some(FilterRepresentation {
                numerator: one.clone(),
                denominator: one,
                correction: 0.0,
            }),
            OutlierShape::LevelShift { zero_ended } => Some(FilterRepresentation {
                numerator: one,
                denominator: unit_root,
                correction: if zero_ended { -1.0 } else { 0.0 },
            }),
            OutlierShape::TransitoryChange { rate } => {
                let den = LagPolynomial::autoregressive(ndarray::array![rate].view(), 1).ok()?;
                Some(FilterRepresentation { numerator: one, denominator: den, correction: 0.0 })
            }
            OutlierShape::SeasonalPulse { .. } => None,
        }
    }
}

/// Registered shape together with its ranking weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedShape {
    pub shape: OutlierShape,
    pub weight: f64,
}

impl WeightedShape {
    /// Pair `shape` with `weight`.
    ///
    /// Errors
    /// ------
    /// - `DetectorError::InvalidWeight`
    ///   If `weight` is not finite or not strictly positive.
    pub fn new(shape: OutlierShape, weight: f64) -> DetectorResult<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(DetectorError::InvalidWeight { value: weight });
        }
        Ok(Self { shape, weight })
    }
}
