//! outliers::tables — per-(position, shape) result arena.
//!
//! Purpose
//! -------
//! Own the three parallel tables every detector writes into: t-statistics,
//! coefficients, and the allowed mask. All tables are indexed
//! `[position, shape]`.
//!
//! Key behaviors
//! -------------
//! - Writes go through [`OutlierTables::set`] / [`OutlierTables::exclude`] /
//!   [`OutlierTables::allow`], each of which invalidates the cached maximum.
//! - [`OutlierTables::max_cell`] lazily scans for the largest `|T|·weight`
//!   and caches the answer until the next write.
//!
//! Invariants & assumptions
//! ------------------------
//! - An excluded cell carries a statistic and coefficient of exactly 0.
//! - The scan visits shapes in registration order and positions in
//!   increasing order; only a strictly greater value replaces the current
//!   best, so the first cell wins ties. A table whose values are all 0
//!   yields no maximum.

use ndarray::Array2;
use std::cell::Cell;

/// State of the lazily computed maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MaxCache {
    Stale,
    Empty,
    At { position: usize, shape: usize },
}

#[derive(Debug, Clone)]
pub struct OutlierTables {
    t_stats: Array2<f64>,
    coefficients: Array2<f64>,
    allowed: Array2<bool>,
    max: Cell<MaxCache>,
}

impl OutlierTables {
    /// Zeroed tables for `n` positions and `n_shapes` shapes, nothing
    /// allowed yet.
    pub fn new(n: usize, n_shapes: usize) -> Self {
        Self {
            t_stats: Array2::zeros((n, n_shapes)),
            coefficients: Array2::zeros((n, n_shapes)),
            allowed: Array2::from_elem((n, n_shapes), false),
            max: Cell::new(MaxCache::Stale),
        }
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.t_stats.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.t_stats.is_empty()
    }

    pub fn n_shapes(&self) -> usize {
        self.t_stats.ncols()
    }

    fn contains(&self, position: usize, shape: usize) -> bool {
        position < self.len() && shape < self.n_shapes()
    }

    /// Zero statistics and coefficients; keep the mask.
    pub fn reset_values(&mut self) {
        self.t_stats.fill(0.0);
        self.coefficients.fill(0.0);
        self.max.set(MaxCache::Stale);
    }

    /// Record a result. Out-of-range indices are ignored.
    pub fn set(&mut self, position: usize, shape: usize, coefficient: f64, t_stat: f64) {
        if !self.contains(position, shape) {
            return;
        }
        self.coefficients[[position, shape]] = coefficient;
        self.t_stats[[position, shape]] = t_stat;
        self.max.set(MaxCache::Stale);
    }

    /// Mark a cell as not eligible and zero it. Out-of-range indices are
    /// ignored.
    pub fn exclude(&mut self, position: usize, shape: usize) {
        self.set_allowed(position, shape, false);
    }

    /// Mark a cell as eligible and zero it. Out-of-range indices are
    /// ignored.
    pub fn allow(&mut self, position: usize, shape: usize) {
        self.set_allowed(position, shape, true);
    }

    fn set_allowed(&mut self, position: usize, shape: usize, allowed: bool) {
        if !self.contains(position, shape) {
            return;
        }
        self.allowed[[position, shape]] = allowed;
        self.coefficients[[position, shape]] = 0.0;
        self.t_stats[[position, shape]] = 0.0;
        self.max.set(MaxCache::Stale);
    }

    pub fn is_allowed(&self, position: usize, shape: usize) -> bool {
        self.contains(position, shape) && self.allowed[[position, shape]]
    }

    pub fn coefficient(&self, position: usize, shape: usize) -> Option<f64> {
        self.contains(position, shape).then(|| self.coefficients[[position, shape]])
    }

    pub fn t_stat(&self, position: usize, shape: usize) -> Option<f64> {
        self.contains(position, shape).then(|| self.t_stats[[position, shape]])
    }

    /// Cell maximizing `|T|·weight`, or `None` if every weighted statistic
    /// is 0.
    ///
    /// `weights[j]` is the weight of shape `j`; missing weights count as 1.
    pub fn max_cell(&self, weights: &[f64]) -> Option<(usize, usize)> {
        let cached = match self.max.get() {
            MaxCache::Stale => {
                let fresh = self.scan(weights);
                self.max.set(fresh);
                fresh
            }
            done => done,
        };
        match cached {
            MaxCache::At { position, shape } => Some((position, shape)),
            _ => None,
        }
    }

    fn scan(&self, weights: &[f64]) -> MaxCache {
        let mut best = MaxCache::Empty;
        let mut best_value = 0.0;
        for (shape, column) in self.t_stats.columns().into_iter().enumerate() {
            let w = weights.get(shape).copied().unwrap_or(1.0);
            for (position, t) in column.iter().enumerate() {
                let value = t.abs() * w;
                if value > best_value {
                    best_value = value;
                    best = MaxCache::At { position, shape };
                }
            }
        }
        best
    }
}
