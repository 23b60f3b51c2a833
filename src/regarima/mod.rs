//! regarima — regression models with ARIMA noise and their linear algebra.
//!
//! Purpose
//! -------
//! Provide the collaborators the outlier detectors consume: lag polynomials,
//! (seasonal) ARIMA noise models, the regression-ARIMA model container,
//! stationarizing ARMA filters, and a QR least-squares solver.
//!
//! Key behaviors
//! -------------
//! - [`LagPolynomial`] handles backshift algebra (products, differencing,
//!   rational impulse responses).
//! - [`ArimaModel`] holds `φ(B)`, `δ(B)`, `θ(B)`; [`ArimaModel::fit_arma`]
//!   estimates non-seasonal coefficients through the `arima` crate.
//! - [`RegArimaModel`] validates data and turns missing observations into
//!   pulse regressors.
//! - [`ArmaFilter`] is implemented by [`ConditionalArmaFilter`] and
//!   [`CholeskyArmaFilter`].
//! - [`QrSolver`] and [`forward_substitution`] supply the projections used by
//!   the exact detector.
//!
//! Conventions
//! -----------
//! - Series and matrices are `ndarray` types; `nalgebra` is used internally
//!   for factorizations.
//! - All fallible operations return [`RegArimaResult`].
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests against closed-form results
//!   (AR(1) weights, Prais–Winsten, exact linear fits).

pub mod arima;
pub mod errors;
pub mod filter;
pub mod model;
pub mod polynomial;
pub mod qr;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::arima::{ArimaModel, SarimaOrders};
pub use self::errors::{RegArimaError, RegArimaResult};
pub use self::filter::{ArmaFilter, CholeskyArmaFilter, ConditionalArmaFilter, forward_substitution};
pub use self::model::RegArimaModel;
pub use self::polynomial::LagPolynomial;
pub use self::qr::QrSolver;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::arima::{ArimaModel, SarimaOrders};
    pub use super::errors::{RegArimaError, RegArimaResult};
    pub use super::filter::{ArmaFilter, CholeskyArmaFilter, ConditionalArmaFilter};
    pub use super::model::RegArimaModel;
    pub use super::polynomial::LagPolynomial;
}
