//! outliers::fast — O(n) outlier t-statistics by convolution.
//!
//! Purpose
//! -------
//! Approximate the exact statistics at a fraction of the cost. Every shape
//! with a rational representation `num(B)/den(B)` is pushed through the
//! model's full filter `δ(B) φ(B) / θ(B)` once. The statistics for all
//! positions then follow from one sliding window over that impulse response
//! and the filtered residuals.
//!
//! Key behaviors
//! -------------
//! - Residuals `e` come from the conditionally filtered, differenced
//!   regression (regression variables concentrated out by QR). The robust
//!   scale is computed from them.
//! - For the event at `pos`, the filtered regressor aligned with `e` is the
//!   tail of the impulse response `o`. The window sum of squares `sxx` is
//!   updated incrementally. `sxy` is the inner product of the window with
//!   the aligned tail of `e`.
//! - For stationary models (`d = 0`), a non-zero shape correction `κ`
//!   contributes `c = κ·φ(1)/θ(1)` to every filtered value, including the
//!   pre-sample part covered by a prefix sum of `e`.
//! - Shapes without a rational form are skipped (logged at `debug`).
//!
//! Invariants & assumptions
//! ------------------------
//! - All fallible work happens before the tables are touched.
//! - For AO and no regression variables the statistics coincide with the
//!   exact method at every position when `d = 0` and at positions `≥ d`
//!   otherwise (both use zero pre-sample values there).

use crate::{
    outliers::{
        detector::{DetectionContext, DetectionMethod, check_scale},
        errors::DetectorResult,
        tables::OutlierTables,
    },
    regarima::{
        filter::{ArmaFilter, ConditionalArmaFilter},
        model::RegArimaModel,
        polynomial::LagPolynomial,
        qr::QrSolver,
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use tracing::debug;

/// Fast (convolution-based) detection method.
#[derive(Debug, Clone, Copy, Default)]
pub struct FastDetection;

impl FastDetection {
    pub fn new() -> Self {
        Self
    }
}

/// Conditionally filtered residuals of the differenced regression.
fn filtered_residuals(model: &RegArimaModel) -> DetectorResult<Array1<f64>> {
    let arima = model.arima();
    let delta = arima.nonstationary_ar();
    let yd = delta.apply_valid(model.filled_y().view())?;
    let mut filter = ConditionalArmaFilter::new();
    let n_eff = filter.prepare(arima, yd.len())?;

    let mut yf = Array1::zeros(n_eff);
    filter.apply(yd.view(), yf.view_mut())?;

    let x = model.regression_variables();
    if x.ncols() == 0 {
        return Ok(yf);
    }
    let mut xf = Array2::zeros((n_eff, x.ncols()));
    for (j, col) in x.columns().into_iter().enumerate() {
        let xd = delta.apply_valid(col)?;
        filter.apply(xd.view(), xf.column_mut(j))?;
    }
    let mut qr = QrSolver::new();
    qr.solve(yf.view(), xf.view())?;
    Ok(qr.residuals().clone())
}

/// Sliding-window statistics for one shape; `None` marks a degenerate cell.
fn slide(
    o: ArrayView1<f64>, el: ArrayView1<f64>, prefix: &[f64], c: f64, scale: f64,
    mut visit: impl FnMut(usize) -> bool, mut emit: impl FnMut(usize, Option<(f64, f64)>),
) {
    let nl = el.len();
    let n = o.len();
    let mut sxx = nl as f64 * c * c;
    let mut kmax = 0usize;
    for ix in 0..n {
        sxx += o[ix] * o[ix];
        if kmax == nl {
            sxx -= o[ix - nl] * o[ix - nl];
        } else {
            kmax += 1;
            sxx -= c * c;
        }
        let pos = n - 1 - ix;
        if !visit(pos) {
            continue;
        }
        if sxx <= 0.0 {
            emit(pos, None);
            continue;
        }
        let window = o.slice(s![ix + 1 - kmax..=ix]);
        let sxy = window.dot(&el.slice(s![nl - kmax..])) + c * prefix[nl - kmax];
        let coef = sxy / sxx;
        emit(pos, Some((coef, coef * sxx.sqrt() / scale)));
    }
}

impl DetectionMethod for FastDetection {
    fn compute(
        &mut self, model: &RegArimaModel, ctx: &DetectionContext<'_>, tables: &mut OutlierTables,
    ) -> DetectorResult<f64> {
        let arima = model.arima();
        let d = arima.differencing_degree();
        let el = filtered_residuals(model)?;
        let scale = check_scale(ctx.scale_estimator.compute(el.view())?)?;
        let nl = el.len();
        let n = nl + d;

        let reps: Vec<_> = ctx.shapes.iter().map(|ws| ws.shape.filter_representation()).collect();
        let needs_gain = d == 0 && reps.iter().flatten().any(|r| r.correction != 0.0);
        let gain = if needs_gain { arima.ar_over_ma_at_unity()? } else { 0.0 };

        let mut prefix = vec![0.0; nl + 1];
        for (i, e) in el.iter().enumerate() {
            prefix[i + 1] = prefix[i] + e;
        }

        let mut outcomes = Vec::new();
        for (j, rep) in reps.iter().enumerate() {
            let Some(rep) = rep else {
                debug!(shape = ctx.shapes[j].shape.code(), "no filter representation; skipped");
                continue;
            };
            let num = rep.numerator.times(arima.nonstationary_ar()).times(arima.stationary_ar());
            let den = rep.denominator.times(arima.ma());
            let mut o = LagPolynomial::impulse_response(&num, &den, n);
            let c = if d == 0 && rep.correction != 0.0 { rep.correction * gain } else { 0.0 };
            if c != 0.0 {
                o += c;
            }
            slide(
                o.view(),
                el.view(),
                &prefix,
                c,
                scale,
                |pos| ctx.in_bounds(pos) && tables.is_allowed(pos, j),
                |pos, outcome| outcomes.push((pos, j, outcome)),
            );
        }

        tables.reset_values();
        for (pos, j, outcome) in outcomes {
            match outcome {
                Some((coef, t)) => tables.set(pos, j, coef, t),
                None => tables.exclude(pos, j),
            }
        }
        debug!(n, scale, "fast outlier statistics computed");
        Ok(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        outliers::{OutlierDetector, OutlierShape},
        regarima::ArimaModel,
        robust_scale::RobustScaleEstimator,
    };
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Closed-form AO and LS statistics for white noise.
    // - Silent skipping of shapes without a filter representation.
    // - The stationary correction branch (zero-ended level shift).
    //
    // They intentionally DO NOT cover:
    // - Agreement with the exact method (see the integration tests).
    // -------------------------------------------------------------------------

    fn series() -> Array1<f64> {
        array![0.3, -1.1, 0.8, 2.5, -0.4, 0.1, -0.9, 1.4, 0.6, -0.2, 0.05, -1.6]
    }

    #[test]
    // Purpose
    // -------
    // For white noise the AO statistic is `y_p/σ` and the LS statistic is the
    // scaled tail sum `Σ_{t≥p} y_t / √(n − p) / σ`.
    //
    // Given
    // -----
    // - A fixed 12-point series, white-noise ARIMA, AO + LS.
    //
    // Expect
    // ------
    // - Both closed forms at every allowed position.
    fn white_noise_statistics_match_closed_forms() {
        // Arrange
        let y = series();
        let n = y.len();
        let model = RegArimaModel::new(y.clone(), ArimaModel::white_noise()).unwrap();
        let mut det = OutlierDetector::new(FastDetection::new());
        det.add_shape(OutlierShape::additive());
        det.add_shape(OutlierShape::level_shift());
        det.prepare(n);

        // Act
        assert!(det.process(&model));

        // Assert
        let sigma = RobustScaleEstimator::default().compute(y.view()).unwrap();
        for p in 0..n {
            assert_relative_eq!(det.t_stat(p, 0).unwrap(), y[p] / sigma, epsilon = 1e-12);
        }
        assert_eq!(det.t_stat(0, 1), Some(0.0));
        for p in 1..n {
            let tail: f64 = y.slice(s![p..]).sum();
            let expected = tail / ((n - p) as f64).sqrt() / sigma;
            assert_relative_eq!(det.t_stat(p, 1).unwrap(), expected, epsilon = 1e-12);
            let coef = det.coefficient(p, 1).unwrap();
            assert_relative_eq!(coef, tail / (n - p) as f64, epsilon = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Seasonal outliers have no rational form and are skipped without
    // failing the run.
    //
    // Given
    // -----
    // - AO + SO(4) on white noise.
    //
    // Expect
    // ------
    // - `process` succeeds; SO cells stay 0 and allowed; AO cells are filled.
    fn shapes_without_representation_are_skipped() {
        // Arrange
        let y = series();
        let model = RegArimaModel::new(y.clone(), ArimaModel::white_noise()).unwrap();
        let mut det = OutlierDetector::new(FastDetection::new());
        det.add_shape(OutlierShape::additive());
        det.add_shape(OutlierShape::seasonal_pulse(4).unwrap());
        det.prepare(y.len());

        // Act
        assert!(det.process(&model));

        // Assert
        for p in 4..y.len() {
            assert_eq!(det.t_stat(p, 1), Some(0.0));
            assert!(det.is_allowed(p, 1));
        }
        assert_eq!(det.max_outlier_shape(), Some(0));
    }

    #[test]
    // Purpose
    // -------
    // For white noise the zero-ended level shift gets the correction
    // `c = −1`: the filtered regressor is −1 before the event, 0 from it on.
    //
    // Given
    // -----
    // - White noise, zero-ended LS.
    //
    // Expect
    // ------
    // - `t(p) = −Σ_{t<p} y_t / √p / σ`.
    fn zero_ended_level_shift_uses_stationary_correction() {
        // Arrange
        let y = series();
        let n = y.len();
        let model = RegArimaModel::new(y.clone(), ArimaModel::white_noise()).unwrap();
        let mut det = OutlierDetector::new(FastDetection::new());
        det.add_shape(OutlierShape::zero_ended_level_shift());
        det.prepare(n);

        // Act
        assert!(det.process(&model));

        // Assert
        let sigma = RobustScaleEstimator::default().compute(y.view()).unwrap();
        for p in 1..n {
            let head: f64 = y.slice(s![..p]).sum();
            let expected = -head / (p as f64).sqrt() / sigma;
            assert_relative_eq!(det.t_stat(p, 0).unwrap(), expected, epsilon = 1e-10);
        }
    }
}
