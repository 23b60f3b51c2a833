//! Integration tests for outlier detection on regression-ARIMA models.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: from a simulated or deterministic
//!   series, through `RegArimaModel` construction, to exact and fast
//!   detector runs and their maximum / per-cell queries.
//! - Exercise realistic regimes (stationary AR noise, unit roots, missing
//!   values, several shapes at once) rather than closed-form toys only.
//!
//! Coverage
//! --------
//! - `outliers::ExactOutlierDetector` with conditional and Cholesky filters.
//! - `outliers::FastOutlierDetector`, including agreement with the exact
//!   method.
//! - `regarima::ArimaModel` (`sarima`, `new`, `fit_arma`) and
//!   `regarima::RegArimaModel` with missing values.
//! - `robust_scale::RobustScaleEstimator` as used by both detectors.
//!
//! Exclusions
//! ----------
//! - Fine-grained validation of polynomials, filters, QR and tables; those
//!   are covered by unit tests.
//! - Iterative selection of outliers across repeated runs.
use ndarray::{Array1, array};
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use regarima_outliers::{
    outliers::{ExactDetection, ExactOutlierDetector, FastOutlierDetector, OutlierShape},
    regarima::{ArimaModel, CholeskyArmaFilter, LagPolynomial, RegArimaModel, SarimaOrders},
};
use tracing_subscriber::EnvFilter;

/// Purpose
/// -------
/// Route `tracing` events to the test harness so that `RUST_LOG=debug`
/// shows per-run summaries.
///
/// Usage
/// -----
/// - Called at the top of each test; repeated initialization is ignored.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Purpose
/// -------
/// Simulate an AR(1) path `y_t = φ y_{t−1} + ε_t` with standard normal
/// innovations and a zero start.
///
/// Parameters
/// ----------
/// - `n`: Length of the path.
/// - `phi`: AR coefficient; `|phi| < 1` for a stationary path.
/// - `seed`: RNG seed, so every run sees the same data.
///
/// Returns
/// -------
/// - `Array1<f64>` of length `n`.
fn simulate_ar1(n: usize, phi: f64, seed: u64) -> Array1<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).expect("unit normal");
    let mut prev = 0.0;
    Array1::from_shape_fn(n, |_| {
        prev = phi * prev + normal.sample(&mut rng);
        prev
    })
}

/// Purpose
/// -------
/// Build an AR(1) noise model with coefficient `phi`.
fn ar1(phi: f64) -> ArimaModel {
    ArimaModel::sarima(SarimaOrders::regular(1, 0, 0), array![phi].view())
        .expect("AR(1) orders match one coefficient")
}

/// Purpose
/// -------
/// Build a pure differencing model `(1 − B)^d` with white-noise innovations.
fn integrated(d: usize) -> ArimaModel {
    let delta = LagPolynomial::differencing(d, 0, 0);
    ArimaModel::new(LagPolynomial::one(), delta, LagPolynomial::one()).expect("monic polynomials")
}

#[test]
// Purpose
// -------
// On outlier-free Gaussian noise no statistic should look significant.
//
// Given
// -----
// - 100 i.i.d. N(0, 1) draws with a fixed seed, white-noise model.
// - AO and LS shapes, exact and fast detectors.
//
// Expect
// ------
// - Every |t| below 5 for both detectors.
fn gaussian_noise_produces_no_large_statistics() {
    init_tracing();
    let y = simulate_ar1(100, 0.0, 11);
    let model = RegArimaModel::new(y, ArimaModel::white_noise()).unwrap();

    let mut exact = ExactOutlierDetector::default();
    let mut fast = FastOutlierDetector::default();
    exact.add_shape(OutlierShape::additive());
    exact.add_shape(OutlierShape::level_shift());
    fast.add_shape(OutlierShape::additive());
    fast.add_shape(OutlierShape::level_shift());
    exact.prepare(model.len());
    fast.prepare(model.len());

    assert!(exact.process(&model));
    assert!(fast.process(&model));

    assert!(exact.max_t_stat().abs() < 5.0, "exact max |t| = {}", exact.max_t_stat());
    assert!(fast.max_t_stat().abs() < 5.0, "fast max |t| = {}", fast.max_t_stat());
}

#[test]
// Purpose
// -------
// A planted additive outlier is located, and its statistic grows with
// its size.
//
// Given
// -----
// - AR(1) path (φ = 0.5, n = 100) with the matching AR(1) model.
// - An AO of size k ∈ {8, 12, 20, 40} added at position 50.
//
// Expect
// ------
// - `max_outlier_position() == 50` for every k.
// - `max_t_stat()` strictly increasing in k.
fn planted_additive_outlier_is_found_and_ranked_by_size() {
    init_tracing();
    let base = simulate_ar1(100, 0.5, 23);
    let mut previous = 0.0;

    for k in [8.0, 12.0, 20.0, 40.0] {
        let mut y = base.clone();
        y[50] += k;
        let model = RegArimaModel::new(y, ar1(0.5)).unwrap();
        let mut det = ExactOutlierDetector::default();
        det.add_shape(OutlierShape::additive());
        det.prepare(model.len());

        assert!(det.process(&model));

        assert_eq!(det.max_outlier_position(), Some(50), "k = {k}");
        let t = det.max_t_stat();
        assert!(t > previous, "t must increase with k: {t} after {previous}");
        previous = t;
    }
}

#[test]
// Purpose
// -------
// Exact and fast AO statistics coincide on stationary and differenced
// models without regression variables.
//
// Given
// -----
// - AR(1) (φ = 0.5) on a simulated AR(1) path, n = 80.
// - ARIMA(0,1,1) (θ = −0.4) on a random walk, n = 80.
//
// Expect
// ------
// - AR(1): statistics and coefficients agree at every position within
//   1e-6 relative tolerance.
// - ARIMA(0,1,1): agreement at every position ≥ 1 (the differencing
//   degree).
fn exact_and_fast_agree_on_additive_outliers() {
    init_tracing();
    let ima = ArimaModel::sarima(SarimaOrders::regular(0, 1, 1), array![-0.4].view()).unwrap();
    let walk = {
        let steps = simulate_ar1(80, 0.0, 5);
        let mut acc = 0.0;
        steps.mapv(|e| {
            acc += e;
            acc
        })
    };
    let cases = [(simulate_ar1(80, 0.5, 3), ar1(0.5), 0usize), (walk, ima, 1usize)];

    for (y, arima, first) in cases {
        let model = RegArimaModel::new(y, arima).unwrap();
        let mut exact = ExactOutlierDetector::default();
        let mut fast = FastOutlierDetector::default();
        exact.add_shape(OutlierShape::additive());
        fast.add_shape(OutlierShape::additive());
        exact.prepare(model.len());
        fast.prepare(model.len());

        assert!(exact.process(&model));
        assert!(fast.process(&model));

        approx::assert_relative_eq!(exact.scale(), fast.scale(), max_relative = 1e-12);
        for pos in first..model.len() {
            let te = exact.t_stat(pos, 0).unwrap();
            let tf = fast.t_stat(pos, 0).unwrap();
            approx::assert_relative_eq!(te, tf, epsilon = 1e-10, max_relative = 1e-6);
            let ce = exact.coefficient(pos, 0).unwrap();
            let cf = fast.coefficient(pos, 0).unwrap();
            approx::assert_relative_eq!(ce, cf, epsilon = 1e-10, max_relative = 1e-6);
        }
    }
}

#[test]
// Purpose
// -------
// `exclude` then `allow` restores eligibility, but the cell stays 0 until
// the next run.
//
// Given
// -----
// - A processed AO detector on an AR(1) path with a planted outlier at 30.
//
// Expect
// ------
// - After `exclude(30, 0)`: not allowed, statistic 0, new maximum elsewhere.
// - After `allow(30, 0)`: allowed, statistic still 0.
// - After another `process`: position 30 is the maximum again.
fn exclude_then_allow_restores_eligibility_after_next_run() {
    init_tracing();
    let mut y = simulate_ar1(60, 0.5, 8);
    y[30] += 15.0;
    let model = RegArimaModel::new(y, ar1(0.5)).unwrap();
    let mut det = FastOutlierDetector::default();
    det.add_shape(OutlierShape::additive());
    det.prepare(model.len());
    assert!(det.process(&model));
    assert_eq!(det.max_outlier_position(), Some(30));

    det.exclude(30, 0);
    assert!(!det.is_allowed(30, 0));
    assert_eq!(det.t_stat(30, 0), Some(0.0));
    assert_ne!(det.max_outlier_position(), Some(30));

    det.allow(30, 0);
    assert!(det.is_allowed(30, 0));
    assert_eq!(det.t_stat(30, 0), Some(0.0));

    assert!(det.process(&model));
    assert_eq!(det.max_outlier_position(), Some(30));
}

#[test]
// Purpose
// -------
// A shape whose excluded zone covers the whole series leaves nothing to
// test, and that is not an error.
//
// Given
// -----
// - SO with period 50 on a series of length 40.
//
// Expect
// ------
// - No cell allowed; `process` returns true; every cell 0; no maximum.
fn full_exclusion_zone_is_not_an_error() {
    init_tracing();
    let model = RegArimaModel::new(simulate_ar1(40, 0.0, 1), ArimaModel::white_noise()).unwrap();
    let mut det = ExactOutlierDetector::default();
    det.add_shape(OutlierShape::seasonal_pulse(50).unwrap());
    det.prepare(model.len());

    assert!((0..40).all(|p| !det.is_allowed(p, 0)));
    assert!(det.process(&model));
    assert!((0..40).all(|p| det.t_stat(p, 0) == Some(0.0)));
    assert_eq!(det.max_outlier(), None);
    assert_eq!(det.max_t_stat(), 0.0);
}

#[test]
// Purpose
// -------
// A perfectly linear series under a random-walk model has constant first
// differences, so no candidate stands out.
//
// Given
// -----
// - `y[i] = i + 1`, n = 20, ARIMA(0,1,0); AO, LS and TC(0.7).
//
// Expect
// ------
// - Every |t| below 1, except the TC at position 0: differencing leaves
//   only its decaying tail there, which is not identifiable from a level
//   change and is skipped.
fn linear_series_under_random_walk_has_small_statistics() {
    init_tracing();
    let y = Array1::from_shape_fn(20, |i| (i + 1) as f64);
    let model = RegArimaModel::new(y, integrated(1)).unwrap();
    let mut det = ExactOutlierDetector::default();
    det.add_shape(OutlierShape::additive());
    det.add_shape(OutlierShape::level_shift());
    det.add_shape(OutlierShape::transitory_change(0.7).unwrap());
    det.prepare(model.len());

    assert!(det.process(&model));

    for shape in 0..3 {
        let first = if shape == 2 { 1 } else { 0 };
        for pos in first..20 {
            let t = det.t_stat(pos, shape).unwrap();
            assert!(t.abs() < 1.0, "|t| = {t} at ({pos}, {shape})");
        }
    }
}

#[test]
// Purpose
// -------
// A large level shift on a quadratic trend is located by both detectors.
//
// Given
// -----
// - `x[i] = (i + 1)²`, n = 90, ARIMA(0,2,0) so the second differences are
//   the constant 2 and the robust scale is `σ = 2 / 0.6745`.
// - A level shift of `50σ` from index 10 on; shapes AO, LS, TC(0.7).
//
// Expect
// ------
// - `max_outlier_position() == 10`, reported as an LS, with `|t| > 10`.
fn level_shift_on_quadratic_trend_is_located() {
    init_tracing();
    let sigma = 2.0 / 0.674_489_750_196_081_7;
    let y = Array1::from_shape_fn(90, |i| {
        let base = ((i + 1) * (i + 1)) as f64;
        if i >= 10 { base + 50.0 * sigma } else { base }
    });
    let model = RegArimaModel::new(y, integrated(2)).unwrap();

    let mut exact = ExactOutlierDetector::default();
    let mut fast = FastOutlierDetector::default();
    for shape in [
        OutlierShape::additive(),
        OutlierShape::level_shift(),
        OutlierShape::transitory_change(0.7).unwrap(),
    ] {
        exact.add_shape(shape);
        fast.add_shape(shape);
    }
    exact.prepare(model.len());
    fast.prepare(model.len());

    assert!(exact.process(&model));
    assert!(fast.process(&model));

    for best in [exact.max_outlier().unwrap(), fast.max_outlier().unwrap()] {
        assert_eq!(best.position, 10);
        assert_eq!(best.code(), "LS");
        assert!(best.t_stat.abs() > 10.0, "t = {}", best.t_stat);
    }
    approx::assert_relative_eq!(exact.scale(), sigma, max_relative = 1e-9);
}

#[test]
// Purpose
// -------
// Missing observations are absorbed by internal pulse regressors, which
// makes the AO candidate at that position collinear.
//
// Given
// -----
// - AR(1) path (φ = 0.5, n = 50) with a NaN at position 7.
//
// Expect
// ------
// - `process` succeeds; `(7, AO)` is excluded and reads 0; neighbors are
//   finite and allowed.
fn missing_observation_excludes_collinear_additive_outlier() {
    init_tracing();
    let mut y = simulate_ar1(50, 0.5, 19);
    y[7] = f64::NAN;
    let model = RegArimaModel::new(y, ar1(0.5)).unwrap();
    assert_eq!(model.missing(), &[7]);

    let mut det = ExactOutlierDetector::default();
    det.add_shape(OutlierShape::additive());
    det.prepare(model.len());

    assert!(det.process(&model));

    assert!(!det.is_allowed(7, 0));
    assert_eq!(det.t_stat(7, 0), Some(0.0));
    for pos in [6, 8] {
        assert!(det.is_allowed(pos, 0));
        assert!(det.t_stat(pos, 0).unwrap().is_finite());
    }
}

#[test]
// Purpose
// -------
// The exact detector works with the Cholesky (GLS) filter and an ARMA
// model estimated from the data.
//
// Given
// -----
// - AR(1) path (φ = 0.5, n = 120) with an AO of size 12 at position 70.
// - AR(1) coefficient estimated by `ArimaModel::fit_arma`.
//
// Expect
// ------
// - The Cholesky-filtered exact detector puts the maximum at 70.
fn cholesky_filter_with_fitted_model_finds_planted_outlier() {
    init_tracing();
    let mut y = simulate_ar1(120, 0.5, 31);
    y[70] += 12.0;
    let arima = ArimaModel::fit_arma(y.view(), 1, 0, 0).expect("AR(1) fit should succeed");
    let model = RegArimaModel::new(y, arima).unwrap();

    let mut det = ExactOutlierDetector::new(ExactDetection::with_filter(CholeskyArmaFilter::new()));
    det.add_shape(OutlierShape::additive());
    det.prepare(model.len());

    assert!(det.process(&model));
    assert_eq!(det.max_outlier_position(), Some(70));
}
