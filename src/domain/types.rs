//! Shared domain types.
//!
//! The hypothesis space is a rectangular grid: candidate means along the rows,
//! candidate standard deviations along the columns. A `PosteriorSnapshot` holds
//! one probability mass per cell in an `nalgebra::DMatrix` with that same shape,
//! so cell `(i, j)` always means `(means[i], sds[j])`.

use std::path::PathBuf;

use clap::ValueEnum;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Tolerance on `|Σ mass - 1|` for a snapshot to count as a distribution.
pub const MASS_TOLERANCE: f64 = 1e-6;

/// One candidate `(mean, sd)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hypothesis {
    pub mean: f64,
    pub sd: f64,
}

/// An inclusive numeric range `[lo, hi]` sampled every `step`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRange {
    pub lo: f64,
    pub hi: f64,
    pub step: f64,
}

impl GridRange {
    pub fn new(lo: f64, hi: f64, step: f64) -> Self {
        Self { lo, hi, step }
    }
}

/// Grid options: one range for the mean axis, one for the sd axis.
///
/// There are no defaults; callers always supply all six values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub mean: GridRange,
    pub sd: GridRange,
}

/// How likelihoods are accumulated during an update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LikelihoodMode {
    /// Sum log-densities and normalize with log-sum-exp.
    #[default]
    Log,
    /// Multiply raw densities. Long batches or poorly covering grids can
    /// underflow the evidence to zero, which is reported as `ZeroEvidence`.
    Product,
}

impl LikelihoodMode {
    pub fn label(self) -> &'static str {
        match self {
            LikelihoodMode::Log => "log",
            LikelihoodMode::Product => "product",
        }
    }
}

/// The discrete hypothesis space: the Cartesian product `means × sds`.
///
/// Both axes are non-empty, finite, and every sd is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisGrid {
    means: Vec<f64>,
    sds: Vec<f64>,
}

impl HypothesisGrid {
    /// Build a grid from explicit axis values.
    pub fn new(means: Vec<f64>, sds: Vec<f64>) -> Result<Self, InferenceError> {
        if means.is_empty() {
            return Err(InferenceError::InvalidGridConfiguration(
                "mean axis has no values".to_string(),
            ));
        }
        if sds.is_empty() {
            return Err(InferenceError::InvalidGridConfiguration(
                "sd axis has no values".to_string(),
            ));
        }
        if let Some(m) = means.iter().find(|m| !m.is_finite()) {
            return Err(InferenceError::InvalidGridConfiguration(format!(
                "mean value {m} is not finite"
            )));
        }
        if let Some(s) = sds.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(InferenceError::InvalidGridConfiguration(format!(
                "sd value {s} must be finite and > 0"
            )));
        }
        Ok(Self { means, sds })
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn sds(&self) -> &[f64] {
        &self.sds
    }

    /// `(rows, cols)` = `(|means|, |sds|)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.means.len(), self.sds.len())
    }

    /// Number of hypotheses (cells).
    pub fn len(&self) -> usize {
        self.means.len() * self.sds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hypothesis(&self, row: usize, col: usize) -> Hypothesis {
        Hypothesis {
            mean: self.means[row],
            sd: self.sds[col],
        }
    }

    /// Iterate all cells in row-major order as `(row, col, hypothesis)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, Hypothesis)> + '_ {
        (0..self.means.len())
            .flat_map(move |i| (0..self.sds.len()).map(move |j| (i, j, self.hypothesis(i, j))))
    }

    /// Cell whose axis values are closest to `(mean, sd)`.
    pub fn nearest(&self, mean: f64, sd: f64) -> (usize, usize) {
        (nearest_index(&self.means, mean), nearest_index(&self.sds, sd))
    }
}

fn nearest_index(values: &[f64], target: f64) -> usize {
    let mut best = 0;
    for (idx, v) in values.iter().enumerate() {
        if (v - target).abs() < (values[best] - target).abs() {
            best = idx;
        }
    }
    best
}

/// A distribution over the grid after `observations_seen` data points.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorSnapshot {
    masses: DMatrix<f64>,
    observations_seen: usize,
}

impl PosteriorSnapshot {
    pub fn new(masses: DMatrix<f64>, observations_seen: usize) -> Self {
        Self {
            masses,
            observations_seen,
        }
    }

    pub fn masses(&self) -> &DMatrix<f64> {
        &self.masses
    }

    pub fn mass(&self, row: usize, col: usize) -> f64 {
        self.masses[(row, col)]
    }

    pub fn observations_seen(&self) -> usize {
        self.observations_seen
    }

    pub fn shape(&self) -> (usize, usize) {
        self.masses.shape()
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.sum()
    }

    /// True when every mass is finite and non-negative.
    pub fn is_valid(&self) -> bool {
        self.masses.iter().all(|m| m.is_finite() && *m >= 0.0)
    }

    /// Check that the masses form a probability distribution: finite,
    /// non-negative, and summing to 1 within `MASS_TOLERANCE`.
    pub fn ensure_distribution(&self) -> Result<(), InferenceError> {
        let reason = if !self.is_valid() {
            Some("masses must be finite and non-negative".to_string())
        } else if (self.total_mass() - 1.0).abs() > MASS_TOLERANCE {
            Some(format!("total mass {} is not 1", self.total_mass()))
        } else {
            None
        };
        match reason {
            Some(reason) => Err(InferenceError::InvalidSnapshot {
                observations_seen: self.observations_seen,
                reason,
            }),
            None => Ok(()),
        }
    }

    /// Masses flattened in row-major order (grid iteration order).
    pub fn row_major(&self) -> Vec<f64> {
        self.masses.transpose().as_slice().to_vec()
    }

    /// Check that this snapshot covers `grid` exactly.
    pub fn ensure_matches(&self, grid: &HypothesisGrid) -> Result<(), InferenceError> {
        let (expected_rows, expected_cols) = grid.shape();
        let (actual_rows, actual_cols) = self.shape();
        if (expected_rows, expected_cols) != (actual_rows, actual_cols) {
            return Err(InferenceError::GridMismatch {
                expected_rows,
                expected_cols,
                actual_rows,
                actual_cols,
            });
        }
        Ok(())
    }
}

/// Ordered snapshots of one run over a single grid.
///
/// The grid is stored once, so every snapshot shares the same hypothesis keys.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    grid: HypothesisGrid,
    snapshots: Vec<PosteriorSnapshot>,
}

impl History {
    /// Start a history from its first snapshot (normally the prior).
    pub fn new(grid: HypothesisGrid, initial: PosteriorSnapshot) -> Result<Self, InferenceError> {
        initial.ensure_matches(&grid)?;
        initial.ensure_distribution()?;
        Ok(Self {
            grid,
            snapshots: vec![initial],
        })
    }

    /// A history with no snapshots yet.
    pub(crate) fn empty(grid: HypothesisGrid) -> Self {
        Self {
            grid,
            snapshots: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, snapshot: PosteriorSnapshot) {
        self.snapshots.push(snapshot);
    }

    pub fn grid(&self) -> &HypothesisGrid {
        &self.grid
    }

    pub fn snapshots(&self) -> &[PosteriorSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn first(&self) -> Option<&PosteriorSnapshot> {
        self.snapshots.first()
    }

    pub fn last(&self) -> Option<&PosteriorSnapshot> {
        self.snapshots.last()
    }

    /// Snapshot taken after exactly `observations_seen` observations.
    pub fn at(&self, observations_seen: usize) -> Option<&PosteriorSnapshot> {
        let first = self.snapshots.first()?.observations_seen();
        let idx = observations_seen.checked_sub(first)?;
        self.snapshots
            .get(idx)
            .filter(|s| s.observations_seen() == observations_seen)
    }
}

/// Where the observation stream comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationSource {
    /// A text/CSV file of scalars.
    File {
        path: PathBuf,
        column: Option<String>,
        strict: bool,
    },
    /// A seeded synthetic normal sample.
    Simulated {
        mean: f64,
        sd: f64,
        n: usize,
        seed: u64,
    },
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub grid: GridConfig,
    pub mode: LikelihoodMode,
    pub source: ObservationSource,

    /// Print a summary row every `every` snapshots (the last one is always printed).
    pub every: usize,

    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
