//! regarima::arima — (seasonal) ARIMA noise models in polynomial form.
//!
//! Purpose
//! -------
//! Hold the three operators of an ARIMA noise model,
//! `φ(B) δ(B) z_t = θ(B) ε_t`, and derive the quantities the outlier engine
//! consumes: π- and ψ-weights, autocovariances and `φ(1)/θ(1)`.
//!
//! Key behaviors
//! -------------
//! - Build models from explicit polynomials ([`ArimaModel::new`]), from SARIMA
//!   orders plus a flat coefficient vector ([`ArimaModel::sarima`]), or via the
//!   airline shortcut ([`ArimaModel::airline`]).
//! - Estimate a non-seasonal ARIMA(p, d, q) with the `arima` crate
//!   ([`ArimaModel::fit_arma`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - All three polynomials are monic (constant term 1).
//! - `φ(B) = 1 − Σ φ_i B^i`, `θ(B) = 1 + Σ θ_j B^j`; seasonal factors are
//!   multiplied in.
//! - Stationarity/invertibility is not enforced. Autocovariances are computed
//!   from a truncated ψ-expansion and are only meaningful for stationary
//!   `φ(B)`.
//!
//! Downstream usage
//! ----------------
//! - `regarima::filter` uses π-weights (conditional filter) and
//!   autocovariances (Cholesky filter).
//! - `outliers::fast` uses the raw polynomials and
//!   [`ArimaModel::ar_over_ma_at_unity`].

use crate::regarima::{
    errors::{RegArimaError, RegArimaResult},
    polynomial::LagPolynomial,
};
use arima::estimate;
use ndarray::{Array1, ArrayView1, s};

/// Extra ψ-weights summed beyond the requested lag when computing
/// autocovariances.
pub const ACF_TRUNCATION: usize = 2000;

/// SARIMA orders `(p, d, q)(P, D, Q)_s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SarimaOrders {
    pub p: usize,
    pub d: usize,
    pub q: usize,
    pub bp: usize,
    pub bd: usize,
    pub bq: usize,
    pub period: usize,
}

impl SarimaOrders {
    /// Non-seasonal orders `(p, d, q)`.
    pub fn regular(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q, bp: 0, bd: 0, bq: 0, period: 1 }
    }

    /// Seasonal orders `(p, d, q)(bp, bd, bq)_period`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::InvalidPeriod`
    ///   If any seasonal order is non-zero and `period < 2`.
    pub fn seasonal(
        p: usize, d: usize, q: usize, bp: usize, bd: usize, bq: usize, period: usize,
    ) -> RegArimaResult<Self> {
        if bp + bd + bq > 0 && period < 2 {
            return Err(RegArimaError::InvalidPeriod { period });
        }
        Ok(Self { p, d, q, bp, bd, bq, period })
    }

    /// Number of free coefficients `p + bp + q + bq`.
    pub fn n_coefficients(&self) -> usize {
        self.p + self.bp + self.q + self.bq
    }
}

/// ARIMA noise model `φ(B) δ(B) z_t = θ(B) ε_t`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArimaModel {
    stationary_ar: LagPolynomial,
    nonstationary_ar: LagPolynomial,
    ma: LagPolynomial,
}

impl ArimaModel {
    /// Assemble a model from explicit polynomials.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::InvalidPolynomial`
    ///   If any polynomial is not monic.
    pub fn new(
        stationary_ar: LagPolynomial, nonstationary_ar: LagPolynomial, ma: LagPolynomial,
    ) -> RegArimaResult<Self> {
        for p in [&stationary_ar, &nonstationary_ar, &ma] {
            if p.coefficients()[0] != 1.0 {
                return Err(RegArimaError::InvalidPolynomial {
                    reason: "ARIMA polynomials must have a unit constant term",
                });
            }
        }
        Ok(Self { stationary_ar, nonstationary_ar, ma })
    }

    /// Model with all operators equal to 1.
    pub fn white_noise() -> Self {
        Self {
            stationary_ar: LagPolynomial::one(),
            nonstationary_ar: LagPolynomial::one(),
            ma: LagPolynomial::one(),
        }
    }

    /// Build a SARIMA model from orders and a flat coefficient vector.
    ///
    /// Parameters
    /// ----------
    /// - `orders`: [`SarimaOrders`]
    /// - `coefficients`: `ArrayView1<f64>`
    ///   Laid out as `[φ_1..φ_p, Φ_1..Φ_P, θ_1..θ_q, Θ_1..Θ_Q]`.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::CoefficientLengthMismatch`
    ///   If `coefficients.len() != orders.n_coefficients()`.
    /// - `RegArimaError::InvalidPolynomial`
    ///   If a coefficient is non-finite.
    pub fn sarima(orders: SarimaOrders, coefficients: ArrayView1<f64>) -> RegArimaResult<Self> {
        let expected = orders.n_coefficients();
        if coefficients.len() != expected {
            return Err(RegArimaError::CoefficientLengthMismatch {
                name: "sarima",
                expected,
                actual: coefficients.len(),
            });
        }
        let (p, bp, q) = (orders.p, orders.bp, orders.q);
        let period = orders.period.max(1);

        let ar = LagPolynomial::autoregressive(coefficients.slice(s![..p]), 1)?;
        let sar = LagPolynomial::autoregressive(coefficients.slice(s![p..p + bp]), period)?;
        let ma = LagPolynomial::moving_average(coefficients.slice(s![p + bp..p + bp + q]), 1)?;
        let sma = LagPolynomial::moving_average(coefficients.slice(s![p + bp + q..]), period)?;
        let delta = LagPolynomial::differencing(orders.d, orders.bd, period);

        Ok(Self { stationary_ar: ar.times(&sar), nonstationary_ar: delta, ma: ma.times(&sma) })
    }

    /// Airline model `(0,1,1)(0,1,1)_period` with MA parameters `theta` and
    /// `seasonal_theta`.
    pub fn airline(period: usize, theta: f64, seasonal_theta: f64) -> RegArimaResult<Self> {
        let orders = SarimaOrders::seasonal(0, 1, 1, 0, 1, 1, period)?;
        Self::sarima(orders, ndarray::array![theta, seasonal_theta].view())
    }

    /// Estimate a non-seasonal ARIMA(p, d, q) by fitting the `arima` crate's
    /// estimator to `series`.
    ///
    /// Parameters
    /// ----------
    /// - `series`: `ArrayView1<f64>`
    ///   Finite observations; missing values are not supported here.
    /// - `p`, `d`, `q`: `usize`
    ///   Orders. The estimator differences internally.
    ///
    /// Returns
    /// -------
    /// The fitted model. The intercept reported by the estimator is
    /// discarded because the outlier engine works on mean-free filtered
    /// series.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::NonFiniteData`
    ///   If `series` contains NaN/±inf.
    /// - `RegArimaError::Estimation`
    ///   If the estimator fails or returns an unexpected coefficient count.
    pub fn fit_arma(series: ArrayView1<f64>, p: usize, d: usize, q: usize) -> RegArimaResult<Self> {
        if let Some((index, &value)) = series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(RegArimaError::NonFiniteData { index, value });
        }
        let data: Vec<f64> = series.to_vec();
        let coeffs = estimate::fit(&data, p, d, q)?;
        if coeffs.len() != 1 + p + q {
            return Err(RegArimaError::Estimation(format!(
                "expected {} coefficients, got {}",
                1 + p + q,
                coeffs.len()
            )));
        }
        let params = Array1::from(coeffs[1..].to_vec());
        Self::sarima(SarimaOrders::regular(p, d, q), params.view())
    }

    pub fn stationary_ar(&self) -> &LagPolynomial {
        &self.stationary_ar
    }

    pub fn nonstationary_ar(&self) -> &LagPolynomial {
        &self.nonstationary_ar
    }

    pub fn ma(&self) -> &LagPolynomial {
        &self.ma
    }

    /// Degree of the differencing operator `δ(B)`.
    pub fn differencing_degree(&self) -> usize {
        self.nonstationary_ar.degree()
    }

    /// First `n` weights of `π(B) = φ(B) / θ(B)`.
    pub fn pi_weights(&self, n: usize) -> Array1<f64> {
        LagPolynomial::impulse_response(&self.stationary_ar, &self.ma, n)
    }

    /// First `n` weights of `ψ(B) = θ(B) / φ(B)`.
    pub fn psi_weights(&self, n: usize) -> Array1<f64> {
        LagPolynomial::impulse_response(&self.ma, &self.stationary_ar, n)
    }

    /// Autocovariances `γ_0..γ_{n−1}` of the stationary ARMA part for unit
    /// innovation variance, `γ_k = Σ_j ψ_j ψ_{j+k}`.
    pub fn autocovariances(&self, n: usize) -> Array1<f64> {
        let psi = self.psi_weights(n + ACF_TRUNCATION);
        let len = psi.len();
        Array1::from_shape_fn(n, |k| psi.slice(s![..len - k]).dot(&psi.slice(s![k..])))
    }

    /// `φ(1) / θ(1)`, the long-run gain of the π-filter.
    ///
    /// Errors
    /// ------
    /// - `RegArimaError::NonInvertibleAtUnity`
    ///   If `θ(1)` is zero.
    pub fn ar_over_ma_at_unity(&self) -> RegArimaResult<f64> {
        let den = self.ma.eval_at_one();
        if den.abs() <= f64::EPSILON {
            return Err(RegArimaError::NonInvertibleAtUnity);
        }
        Ok(self.stationary_ar.eval_at_one() / den)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - SARIMA assembly and coefficient-length validation.
    // - π/ψ weights and autocovariances against closed forms (AR(1), MA(1)).
    // - `fit_arma` on a simulated AR(1).
    //
    // They intentionally DO NOT cover:
    // - Accuracy of the external estimator beyond a coarse sanity band.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the airline model's polynomials.
    //
    // Given
    // -----
    // - `airline(4, −0.6, −0.5)`.
    //
    // Expect
    // ------
    // - δ has degree 5, φ = 1, θ = (1 − 0.6B)(1 − 0.5B^4).
    fn airline_builds_expected_polynomials() {
        // Arrange / Act
        let model = ArimaModel::airline(4, -0.6, -0.5).unwrap();

        // Assert
        assert_eq!(model.differencing_degree(), 5);
        assert!(model.stationary_ar().is_identity());
        let ma = model.ma().coefficients();
        assert_eq!(ma.len(), 6);
        assert_relative_eq!(ma[1], -0.6);
        assert_relative_eq!(ma[4], -0.5);
        assert_relative_eq!(ma[5], 0.3);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a wrong coefficient count is rejected.
    //
    // Given
    // -----
    // - ARIMA(1,0,1) orders with a single coefficient.
    //
    // Expect
    // ------
    // - `CoefficientLengthMismatch { expected: 2, actual: 1 }`.
    fn sarima_rejects_wrong_coefficient_count() {
        // Arrange
        let orders = SarimaOrders::regular(1, 0, 1);

        // Act
        let err = ArimaModel::sarima(orders, array![0.5].view()).unwrap_err();

        // Assert
        assert_eq!(
            err,
            RegArimaError::CoefficientLengthMismatch { name: "sarima", expected: 2, actual: 1 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Seasonal orders require a real period.
    //
    // Given
    // -----
    // - Seasonal differencing with period 1.
    //
    // Expect
    // ------
    // - `InvalidPeriod`.
    fn seasonal_orders_require_period_of_two_or_more() {
        // Act
        let err = SarimaOrders::seasonal(0, 0, 0, 0, 1, 0, 1).unwrap_err();

        // Assert
        assert_eq!(err, RegArimaError::InvalidPeriod { period: 1 });
    }

    #[test]
    // Purpose
    // -------
    // Check AR(1) weights and autocovariances against closed forms.
    //
    // Given
    // -----
    // - AR(1) with φ = 0.6.
    //
    // Expect
    // ------
    // - π = [1, −0.6, 0, …], ψ_j = 0.6^j, γ_k = 0.6^k / (1 − 0.36).
    fn ar1_weights_and_autocovariances_match_closed_form() {
        // Arrange
        let model = ArimaModel::sarima(SarimaOrders::regular(1, 0, 0), array![0.6].view()).unwrap();

        // Act
        let pi = model.pi_weights(4);
        let psi = model.psi_weights(4);
        let acf = model.autocovariances(4);

        // Assert
        assert_relative_eq!(pi[0], 1.0);
        assert_relative_eq!(pi[1], -0.6);
        assert_relative_eq!(pi[2], 0.0);
        for k in 0..4 {
            assert_relative_eq!(psi[k], 0.6_f64.powi(k as i32), epsilon = 1e-14);
            assert_relative_eq!(acf[k], 0.6_f64.powi(k as i32) / 0.64, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify `φ(1)/θ(1)` and its failure mode.
    //
    // Given
    // -----
    // - ARMA(1,1) with φ = 0.5, θ = 0.25, and an MA(1) with θ = −1.
    //
    // Expect
    // ------
    // - 0.5 / 1.25 = 0.4 for the first; `NonInvertibleAtUnity` for the second.
    fn ar_over_ma_at_unity_handles_regular_and_degenerate_cases() {
        // Arrange
        let arma =
            ArimaModel::sarima(SarimaOrders::regular(1, 0, 1), array![0.5, 0.25].view()).unwrap();
        let unit_ma =
            ArimaModel::sarima(SarimaOrders::regular(0, 0, 1), array![-1.0].view()).unwrap();

        // Act / Assert
        assert_relative_eq!(arma.ar_over_ma_at_unity().unwrap(), 0.4, epsilon = 1e-14);
        assert_eq!(unit_ma.ar_over_ma_at_unity().unwrap_err(), RegArimaError::NonInvertibleAtUnity);
    }

    #[test]
    // Purpose
    // -------
    // Smoke-test the external estimator on a simulated AR(1).
    //
    // Given
    // -----
    // - 500 draws of an AR(1) with φ = 0.5 and a fixed seed.
    //
    // Expect
    // ------
    // - A finite, stationary AR coefficient and no differencing.
    fn fit_arma_recovers_finite_ar1_coefficient() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(7);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut prev = 0.0;
        let series = Array1::from_shape_fn(500, |_| {
            prev = 0.5 * prev + normal.sample(&mut rng);
            prev
        });

        // Act
        let model = ArimaModel::fit_arma(series.view(), 1, 0, 0).unwrap();

        // Assert
        let phi = -model.stationary_ar().coefficients()[1];
        assert!(phi.is_finite());
        assert!(phi.abs() < 1.0, "fitted φ should be stationary, got {phi}");
        assert_eq!(model.differencing_degree(), 0);
    }

    #[test]
    // Purpose
    // -------
    // Reject non-finite inputs before calling the estimator.
    //
    // Given
    // -----
    // - A series with an infinite value at index 2.
    //
    // Expect
    // ------
    // - `NonFiniteData { index: 2, .. }`.
    fn fit_arma_rejects_non_finite_series() {
        // Arrange
        let series = array![1.0, 2.0, f64::INFINITY, 0.5];

        // Act
        let err = ArimaModel::fit_arma(series.view(), 1, 0, 0).unwrap_err();

        // Assert
        assert!(matches!(err, RegArimaError::NonFiniteData { index: 2, .. }));
    }
}
