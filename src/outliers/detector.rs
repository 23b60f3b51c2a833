//! outliers::detector — orchestration of outlier detection runs.
//!
//! Purpose
//! -------
//! Manage everything shared by the exact and fast detectors: the registered
//! shapes and weights, the candidate window, the robust scale estimator, and
//! the result tables. The numerical work is delegated to a
//! [`DetectionMethod`].
//!
//! Key behaviors
//! -------------
//! - `prepare(n)` allocates tables for `n` positions and allows every cell
//!   outside the shapes' excluded zones; `set_bounds` narrows the window.
//! - `try_process(model)` validates the configuration, runs the method, and
//!   records the scale. `process(model)` is the boolean wrapper that logs the
//!   failure.
//! - Queries (`t_stat`, `coefficient`, `max_outlier`, ...) read the tables;
//!   the maximum is computed lazily.
//!
//! Invariants & assumptions
//! ------------------------
//! - Registering a shape drops the tables; `prepare` must be called again.
//! - A failed run leaves tables, mask and scale exactly as they were.
//! - Excluded cells read as 0 until the next successful run rewrites them
//!   (and then still 0 if they remain excluded).
//!
//! Conventions
//! -----------
//! - Bounds are half-open `[lower, upper)` in 0-based positions.
//! - Shape indices follow registration order.
//!
//! Downstream usage
//! ----------------
//! - Iterative outlier selection typically loops: `process`, read
//!   `max_outlier`, add the winner to the model's regressors, `exclude` it,
//!   and process again.

use crate::{
    outliers::{
        errors::{DetectorError, DetectorResult},
        shape::{OutlierShape, WeightedShape},
        tables::OutlierTables,
    },
    regarima::model::RegArimaModel,
    robust_scale::RobustScaleEstimator,
};
use tracing::{debug, warn};

/// Read-only configuration handed to a [`DetectionMethod`].
#[derive(Debug, Clone, Copy)]
pub struct DetectionContext<'a> {
    pub shapes: &'a [WeightedShape],
    pub lower: usize,
    pub upper: usize,
    pub scale_estimator: &'a RobustScaleEstimator,
}

impl DetectionContext<'_> {
    /// `true` when `position` lies in `[lower, upper)`.
    pub fn in_bounds(&self, position: usize) -> bool {
        position >= self.lower && position < self.upper
    }
}

/// Strategy computing per-(position, shape) statistics.
pub trait DetectionMethod {
    /// Fill `tables` for `model` and return the robust scale used.
    ///
    /// Implementations must finish every fallible step before writing to
    /// `tables`, so that an error leaves them untouched. Allowed cells in
    /// bounds are either written or excluded; other cells are left at 0.
    fn compute(
        &mut self, model: &RegArimaModel, ctx: &DetectionContext<'_>, tables: &mut OutlierTables,
    ) -> DetectorResult<f64>;
}

/// Most significant candidate of the last run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierCandidate {
    pub position: usize,
    pub shape_index: usize,
    pub shape: OutlierShape,
    pub coefficient: f64,
    pub t_stat: f64,
}

impl OutlierCandidate {
    pub fn code(&self) -> &'static str {
        self.shape.code()
    }
}

/// Outlier detector parameterized by its detection method.
#[derive(Debug, Clone)]
pub struct OutlierDetector<M> {
    shapes: Vec<WeightedShape>,
    tables: Option<OutlierTables>,
    lower: usize,
    upper: usize,
    scale_estimator: RobustScaleEstimator,
    scale: f64,
    method: M,
}

impl<M: Default> Default for OutlierDetector<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M> OutlierDetector<M> {
    pub fn new(method: M) -> Self {
        Self {
            shapes: Vec::new(),
            tables: None,
            lower: 0,
            upper: 0,
            scale_estimator: RobustScaleEstimator::default(),
            scale: 0.0,
            method,
        }
    }

    /// Replace the robust scale estimator (builder style).
    pub fn with_scale_estimator(mut self, estimator: RobustScaleEstimator) -> Self {
        self.scale_estimator = estimator;
        self
    }

    pub fn set_scale_estimator(&mut self, estimator: RobustScaleEstimator) {
        self.scale_estimator = estimator;
    }

    pub fn scale_estimator(&self) -> &RobustScaleEstimator {
        &self.scale_estimator
    }

    pub fn method(&self) -> &M {
        &self.method
    }

    pub fn method_mut(&mut self) -> &mut M {
        &mut self.method
    }

    // ---- Shapes ----

    /// Register `shape` with weight 1.
    pub fn add_shape(&mut self, shape: OutlierShape) {
        self.shapes.push(WeightedShape { shape, weight: 1.0 });
        self.tables = None;
    }

    /// Register `shape` with a ranking weight.
    ///
    /// Errors
    /// ------
    /// - `DetectorError::InvalidWeight`
    ///   If `weight` is not finite or not strictly positive.
    pub fn add_weighted_shape(&mut self, shape: OutlierShape, weight: f64) -> DetectorResult<()> {
        self.shapes.push(WeightedShape::new(shape, weight)?);
        self.tables = None;
        Ok(())
    }

    pub fn shapes(&self) -> &[WeightedShape] {
        &self.shapes
    }

    pub fn shape(&self, index: usize) -> Option<&OutlierShape> {
        self.shapes.get(index).map(|w| &w.shape)
    }

    // ---- Allocation ----

    /// Allocate tables for `n` positions, set bounds to `[0, n)` and allow
    /// every cell outside the shapes' excluded zones.
    pub fn prepare(&mut self, n: usize) {
        self.reallocate(n);
        self.lower = 0;
        self.upper = n;
    }

    /// Fresh tables for `n` positions and the current shapes. Bounds are
    /// clamped to `n`.
    pub fn reallocate(&mut self, n: usize) {
        let mut tables = OutlierTables::new(n, self.shapes.len());
        for (j, ws) in self.shapes.iter().enumerate() {
            let (start, end) = ws.shape.excluded_zone();
            for pos in start..n.saturating_sub(end) {
                tables.allow(pos, j);
            }
        }
        self.tables = Some(tables);
        self.upper = self.upper.min(n);
        self.lower = self.lower.min(self.upper);
    }

    /// Zero statistics and coefficients in place; keep mask and bounds.
    pub fn reset_values(&mut self) {
        if let Some(tables) = self.tables.as_mut() {
            tables.reset_values();
        }
    }

    /// Drop all tables. The next run requires `prepare`.
    pub fn release(&mut self) {
        self.tables = None;
    }

    pub fn is_prepared(&self) -> bool {
        self.tables.is_some()
    }

    /// Restrict candidates to `[lower, upper)`, clamped to the prepared
    /// length.
    pub fn set_bounds(&mut self, lower: usize, upper: usize) {
        let n = self.tables.as_ref().map_or(upper, OutlierTables::len);
        self.upper = upper.min(n);
        self.lower = lower.min(self.upper);
    }

    pub fn bounds(&self) -> (usize, usize) {
        (self.lower, self.upper)
    }

    // ---- Mask ----

    /// Forbid `(position, shape)` and zero its cell. Ignored out of range.
    pub fn exclude(&mut self, position: usize, shape: usize) {
        if let Some(tables) = self.tables.as_mut() {
            tables.exclude(position, shape);
        }
    }

    /// Re-allow `(position, shape)` and zero its cell. Ignored out of range.
    pub fn allow(&mut self, position: usize, shape: usize) {
        if let Some(tables) = self.tables.as_mut() {
            tables.allow(position, shape);
        }
    }

    pub fn is_allowed(&self, position: usize, shape: usize) -> bool {
        self.tables.as_ref().is_some_and(|t| t.is_allowed(position, shape))
    }

    // ---- Results ----

    pub fn coefficient(&self, position: usize, shape: usize) -> Option<f64> {
        self.tables.as_ref()?.coefficient(position, shape)
    }

    pub fn t_stat(&self, position: usize, shape: usize) -> Option<f64> {
        self.tables.as_ref()?.t_stat(position, shape)
    }

    /// Robust scale used by the last successful run (0 before any run).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    fn max_cell(&self) -> Option<(usize, usize)> {
        let tables = self.tables.as_ref()?;
        let weights: Vec<f64> = self.shapes.iter().map(|w| w.weight).collect();
        tables.max_cell(&weights)
    }

    /// Signed statistic of the most significant cell, 0 when none.
    pub fn max_t_stat(&self) -> f64 {
        self.max_outlier().map_or(0.0, |c| c.t_stat)
    }

    pub fn max_outlier_position(&self) -> Option<usize> {
        self.max_cell().map(|(pos, _)| pos)
    }

    pub fn max_outlier_shape(&self) -> Option<usize> {
        self.max_cell().map(|(_, shape)| shape)
    }

    /// Most significant candidate by `|T|·weight`.
    pub fn max_outlier(&self) -> Option<OutlierCandidate> {
        let (position, shape_index) = self.max_cell()?;
        let tables = self.tables.as_ref()?;
        Some(OutlierCandidate {
            position,
            shape_index,
            shape: self.shapes.get(shape_index)?.shape,
            coefficient: tables.coefficient(position, shape_index)?,
            t_stat: tables.t_stat(position, shape_index)?,
        })
    }
}

impl<M: DetectionMethod> OutlierDetector<M> {
    /// Run detection on `model`.
    ///
    /// Errors
    /// ------
    /// - `DetectorError::NoShapes`, `DetectorError::NotPrepared`,
    ///   `DetectorError::DegenerateBounds`, `DetectorError::LengthMismatch`
    ///   for configuration problems.
    /// - Any error raised by the detection method.
    pub fn try_process(&mut self, model: &RegArimaModel) -> DetectorResult<()> {
        if self.shapes.is_empty() {
            return Err(DetectorError::NoShapes);
        }
        let tables = self.tables.as_mut().ok_or(DetectorError::NotPrepared)?;
        if self.upper <= self.lower {
            return Err(DetectorError::DegenerateBounds { lower: self.lower, upper: self.upper });
        }
        if model.len() != tables.len() {
            return Err(DetectorError::LengthMismatch {
                expected: tables.len(),
                actual: model.len(),
            });
        }

        let ctx = DetectionContext {
            shapes: &self.shapes,
            lower: self.lower,
            upper: self.upper,
            scale_estimator: &self.scale_estimator,
        };
        let scale = self.method.compute(model, &ctx, tables)?;
        self.scale = scale;

        debug!(
            n = model.len(),
            shapes = self.shapes.len(),
            lower = self.lower,
            upper = self.upper,
            scale,
            "outlier detection run complete"
        );
        Ok(())
    }

    /// Run detection; `false` (after a `warn!`) if it failed.
    pub fn process(&mut self, model: &RegArimaModel) -> bool {
        match self.try_process(model) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "outlier detection failed");
                false
            }
        }
    }
}

/// Reject zero or non-finite scales before any table is written.
pub(crate) fn check_scale(scale: f64) -> DetectorResult<f64> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(DetectorError::DegenerateScale { value: scale });
    }
    Ok(scale)
}
