//! outliers::exact — QR-based exact outlier t-statistics.
//!
//! Purpose
//! -------
//! For every allowed candidate `(position, shape)` compute the least-squares
//! coefficient and t-statistic the outlier regressor would get if it were
//! added to the filtered regression, without refitting the full model for
//! each candidate.
//!
//! Key behaviors
//! -------------
//! - Difference `y` and every regression variable with `δ(B)`, then whiten
//!   with a pluggable [`ArmaFilter`].
//! - Factor the filtered design once (`X = QR`). With `L = Rᵗ` and
//!   `w = L⁻¹ Xᵗ y`, a candidate `o` gets
//!   `M = L⁻¹ Xᵗ o`, `c = oᵗo − ‖M‖²` and `t = (oᵗy − w·M) / √c / σ`.
//! - The robust scale `σ` comes from the QR residuals (or from the filtered
//!   series when the model has no regression variables).
//!
//! Invariants & assumptions
//! ------------------------
//! - All fallible work (differencing, filtering, QR, scale) happens before
//!   the tables are touched.
//! - Candidates whose residual energy `c` is at most
//!   [`COLLINEARITY_TOL`]`·oᵗo` are collinear with the design and get
//!   excluded, which is how the AO at a missing observation is removed.
//!
//! Conventions
//! -----------
//! - Candidate regressors are generated once per shape on a buffer of length
//!   `2N` with the event at index `N`; the differenced window for position
//!   `p` starts at `N − p`.
//! - Projections `Xᵗo` are recomputed for each candidate.

use crate::{
    outliers::{
        detector::{DetectionContext, DetectionMethod, check_scale},
        errors::DetectorResult,
        tables::OutlierTables,
    },
    regarima::{
        errors::RegArimaResult,
        filter::{ArmaFilter, ConditionalArmaFilter, forward_substitution},
        model::RegArimaModel,
        polynomial::LagPolynomial,
        qr::QrSolver,
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use tracing::debug;

/// Relative residual energy below which a candidate counts as collinear.
pub const COLLINEARITY_TOL: f64 = 1e-9;

/// Exact detection method with a configurable ARMA filter.
#[derive(Debug)]
pub struct ExactDetection {
    filter: Box<dyn ArmaFilter>,
}

impl Default for ExactDetection {
    fn default() -> Self {
        Self { filter: Box::new(ConditionalArmaFilter::new()) }
    }
}

impl ExactDetection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `filter` instead of the conditional ARMA filter.
    pub fn with_filter(filter: impl ArmaFilter + 'static) -> Self {
        Self { filter: Box::new(filter) }
    }
}

/// Cholesky-like factor of the design and the projected response.
struct Projection {
    l: Array2<f64>,
    w: Array1<f64>,
}

/// Filtered regression problem shared by all candidates.
struct FilteredProblem {
    y: Array1<f64>,
    x: Array2<f64>,
    projection: Option<Projection>,
    scale: f64,
}

type Outcome = (usize, usize, Option<(f64, f64)>);

impl ExactDetection {
    fn filter_columns(
        &self, x: &Array2<f64>, delta: &LagPolynomial, n_eff: usize,
    ) -> RegArimaResult<Array2<f64>> {
        let mut xf = Array2::zeros((n_eff, x.ncols()));
        for (j, col) in x.columns().into_iter().enumerate() {
            let xd = delta.apply_valid(col)?;
            self.filter.apply(xd.view(), xf.column_mut(j))?;
        }
        Ok(xf)
    }

    fn filtered_problem(
        &mut self, model: &RegArimaModel, ctx: &DetectionContext<'_>,
    ) -> DetectorResult<FilteredProblem> {
        let arima = model.arima();
        let delta = arima.nonstationary_ar();
        let yd = delta.apply_valid(model.filled_y().view())?;
        let n_eff = self.filter.prepare(arima, yd.len())?;

        let mut yf = Array1::zeros(n_eff);
        self.filter.apply(yd.view(), yf.view_mut())?;
        let xf = self.filter_columns(&model.regression_variables(), delta, n_eff)?;

        if xf.ncols() == 0 {
            let scale = check_scale(ctx.scale_estimator.compute(yf.view())?)?;
            return Ok(FilteredProblem { y: yf, x: xf, projection: None, scale });
        }

        let mut qr = QrSolver::new();
        qr.solve(yf.view(), xf.view())?;
        let l = qr.r().t().to_owned();
        let xty = xf.t().dot(&yf);
        let mut w = Array1::zeros(xty.len());
        forward_substitution(l.view(), xty.view(), w.view_mut())?;
        let scale = check_scale(ctx.scale_estimator.compute(qr.residuals().view())?)?;

        Ok(FilteredProblem { y: yf, x: xf, projection: Some(Projection { l, w }), scale })
    }

    fn candidate(
        &self, p: &FilteredProblem, window: ArrayView1<f64>,
    ) -> RegArimaResult<Option<(f64, f64)>> {
        let mut ol = Array1::zeros(p.y.len());
        self.filter.apply(window, ol.view_mut())?;
        let xx = ol.dot(&ol);
        let xy = ol.dot(&p.y);
        if !xx.is_finite() || xx <= 0.0 {
            return Ok(None);
        }

        match &p.projection {
            None => Ok(Some((xy / xx, xy / xx.sqrt() / p.scale))),
            Some(proj) => {
                let l = p.x.t().dot(&ol);
                let mut m = Array1::zeros(l.len());
                forward_substitution(proj.l.view(), l.view(), m.view_mut())?;
                let c = xx - m.dot(&m);
                if c <= COLLINEARITY_TOL * xx {
                    return Ok(None);
                }
                let num = xy - proj.w.dot(&m);
                Ok(Some((num / c, num / c.sqrt() / p.scale)))
            }
        }
    }
}

impl DetectionMethod for ExactDetection {
    fn compute(
        &mut self, model: &RegArimaModel, ctx: &DetectionContext<'_>, tables: &mut OutlierTables,
    ) -> DetectorResult<f64> {
        let problem = self.filtered_problem(model, ctx)?;
        let n = model.len();
        let m = n - model.arima().differencing_degree();
        let delta = model.arima().nonstationary_ar();

        let mut outcomes: Vec<Outcome> = Vec::new();
        for (j, ws) in ctx.shapes.iter().enumerate() {
            let mut buffer = Array1::zeros(2 * n);
            ws.shape.fill(n, buffer.view_mut());
            let od = delta.apply_valid(buffer.view())?;
            for pos in ctx.lower..ctx.upper {
                if !tables.is_allowed(pos, j) {
                    continue;
                }
                let window = od.slice(s![n - pos..n - pos + m]);
                outcomes.push((pos, j, self.candidate(&problem, window)?));
            }
        }

        tables.reset_values();
        let mut excluded = 0usize;
        for (pos, j, outcome) in outcomes {
            match outcome {
                Some((coef, t)) => tables.set(pos, j, coef, t),
                None => {
                    tables.exclude(pos, j);
                    excluded += 1;
                }
            }
        }
        debug!(excluded, scale = problem.scale, "exact outlier statistics computed");
        Ok(problem.scale)
    }
}
