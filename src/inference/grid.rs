//! Grid construction and the uniform joint prior.
//!
//! Each axis is discretized as `lo + i·step` for `i = 0, 1, ...` while the value
//! stays within `hi` (with a small tolerance so `[0, 1]` by `0.1` includes `1.0`).
//! Values are computed from the index rather than accumulated, so long axes do
//! not drift.

use nalgebra::DMatrix;

use crate::domain::{GridRange, HypothesisGrid, PosteriorSnapshot};
use crate::error::InferenceError;

/// Upper bound on `|means| × |sds|`.
pub const MAX_GRID_CELLS: usize = 4_000_000;

/// Relative slack (in steps) when deciding whether `hi` is reached.
const STEP_EPS: f64 = 1e-9;

/// Discretize one axis.
pub fn discretize(range: &GridRange, axis: &str) -> Result<Vec<f64>, InferenceError> {
    let GridRange { lo, hi, step } = *range;
    if !(lo.is_finite() && hi.is_finite() && step.is_finite()) {
        return Err(InferenceError::InvalidGridConfiguration(format!(
            "{axis} range must be finite: lo={lo}, hi={hi}, step={step}"
        )));
    }
    if step <= 0.0 {
        return Err(InferenceError::InvalidGridConfiguration(format!(
            "{axis} step must be > 0 (got {step})"
        )));
    }
    if hi < lo {
        return Err(InferenceError::InvalidGridConfiguration(format!(
            "{axis} range is empty: lo={lo} > hi={hi}"
        )));
    }

    let count = ((hi - lo) / step + STEP_EPS).floor() + 1.0;
    if count > MAX_GRID_CELLS as f64 {
        return Err(InferenceError::InvalidGridConfiguration(format!(
            "{axis} axis would have {count} values (max {MAX_GRID_CELLS})"
        )));
    }
    let count = count as usize;

    Ok((0..count).map(|i| lo + step * i as f64).collect())
}

/// Build the hypothesis grid and its uniform prior (`observations_seen = 0`).
pub fn build_grid(
    mean_range: &GridRange,
    sd_range: &GridRange,
) -> Result<(HypothesisGrid, PosteriorSnapshot), InferenceError> {
    let means = discretize(mean_range, "mean")?;
    let sds = discretize(sd_range, "sd")?;

    let cells = means.len().saturating_mul(sds.len());
    if cells > MAX_GRID_CELLS {
        return Err(InferenceError::InvalidGridConfiguration(format!(
            "grid would have {cells} cells (max {MAX_GRID_CELLS})"
        )));
    }

    let grid = HypothesisGrid::new(means, sds)?;
    let prior = uniform_prior(&grid);
    Ok((grid, prior))
}

/// Independent uniform marginals on mean and sd, combined multiplicatively.
pub fn uniform_prior(grid: &HypothesisGrid) -> PosteriorSnapshot {
    let (rows, cols) = grid.shape();
    let p_mean = 1.0 / rows as f64;
    let p_sd = 1.0 / cols as f64;
    PosteriorSnapshot::new(DMatrix::from_element(rows, cols, p_mean * p_sd), 0)
}
