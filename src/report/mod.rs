//! Reporting utilities: snapshot summaries and formatted terminal output.

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{History, Hypothesis, HypothesisGrid, PosteriorSnapshot};

/// Point summaries of one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotSummary {
    pub observations_seen: usize,
    /// Most probable cell (first in row-major order on ties).
    pub map: Hypothesis,
    pub map_mass: f64,
    /// Posterior expectation of the mean.
    pub expected_mean: f64,
    /// Posterior expectation of the sd.
    pub expected_sd: f64,
    pub total_mass: f64,
}

/// Marginal distribution over the mean axis (row sums).
pub fn mean_marginal(snapshot: &PosteriorSnapshot) -> Vec<f64> {
    snapshot.masses().row_iter().map(|row| row.sum()).collect()
}

/// Marginal distribution over the sd axis (column sums).
pub fn sd_marginal(snapshot: &PosteriorSnapshot) -> Vec<f64> {
    snapshot.masses().column_iter().map(|col| col.sum()).collect()
}

/// Mass of the cell nearest `(mean, sd)`.
pub fn mass_near(grid: &HypothesisGrid, snapshot: &PosteriorSnapshot, mean: f64, sd: f64) -> f64 {
    let (i, j) = grid.nearest(mean, sd);
    snapshot.mass(i, j)
}

/// Summarize one snapshot against its grid.
pub fn summarize_snapshot(grid: &HypothesisGrid, snapshot: &PosteriorSnapshot) -> SnapshotSummary {
    let mut map = (0, 0);
    let mut map_mass = f64::NEG_INFINITY;
    for (i, j, _) in grid.iter() {
        let m = snapshot.mass(i, j);
        if m > map_mass {
            map_mass = m;
            map = (i, j);
        }
    }

    let expected_mean = weighted_mean(grid.means(), &mean_marginal(snapshot));
    let expected_sd = weighted_mean(grid.sds(), &sd_marginal(snapshot));

    SnapshotSummary {
        observations_seen: snapshot.observations_seen(),
        map: grid.hypothesis(map.0, map.1),
        map_mass,
        expected_mean,
        expected_sd,
        total_mass: snapshot.total_mass(),
    }
}

/// One summary per snapshot, in history order.
pub fn summarize_history(history: &History) -> Vec<SnapshotSummary> {
    history
        .snapshots()
        .iter()
        .map(|s| summarize_snapshot(history.grid(), s))
        .collect()
}

fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    let acc: f64 = values.iter().zip(weights).map(|(v, w)| v * w).sum();
    acc / total
}
