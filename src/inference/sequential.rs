//! Sequential history accumulation.
//!
//! The run is a serial fold over the observation stream: snapshot `k` is the
//! posterior of snapshot `k-1` updated with exactly the `k`-th observation.
//! The resulting `History` holds `N + 1` snapshots with `observations_seen`
//! running `0, 1, ..., N` (offset by the initial snapshot's count).
//!
//! A failed step stops the run. The error carries the history built so far and
//! the number of observations that had been incorporated when it happened.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{History, HypothesisGrid, LikelihoodMode, PosteriorSnapshot};
use crate::error::{AppError, InferenceError};
use crate::inference::update::update_with;

/// Sequential accumulation stopped early.
#[derive(Debug, Clone, Error)]
#[error("sequential update failed after {observations_seen} observations: {source}")]
pub struct AccumulationError {
    /// Observations incorporated into the last good snapshot.
    pub observations_seen: usize,
    pub source: InferenceError,
    /// Snapshots produced before the failure (possibly empty).
    pub partial: History,
}

impl From<AccumulationError> for AppError {
    fn from(err: AccumulationError) -> Self {
        AppError::new(err.source.exit_code(), err.to_string())
    }
}

/// Run the whole stream through the log-domain updater.
pub fn run_sequential(
    grid: &HypothesisGrid,
    initial: &PosteriorSnapshot,
    observations: &[f64],
) -> Result<History, AccumulationError> {
    run_sequential_with(grid, initial, observations, LikelihoodMode::default())
}

/// Run the whole stream one observation at a time.
pub fn run_sequential_with(
    grid: &HypothesisGrid,
    initial: &PosteriorSnapshot,
    observations: &[f64],
    mode: LikelihoodMode,
) -> Result<History, AccumulationError> {
    let mut history = match History::new(grid.clone(), initial.clone()) {
        Ok(h) => h,
        Err(source) => {
            return Err(AccumulationError {
                observations_seen: initial.observations_seen(),
                source,
                partial: History::empty(grid.clone()),
            });
        }
    };

    info!(
        cells = grid.len(),
        observations = observations.len(),
        mode = mode.label(),
        "starting sequential update"
    );

    for (idx, &x) in observations.iter().enumerate() {
        // `History::new` always holds the initial snapshot.
        let Some(current) = history.last() else { break };
        let seen = current.observations_seen();
        let next = match update_with(grid, current, &[x], mode) {
            Ok(next) => next,
            Err(source) => {
                let source = match source {
                    InferenceError::InvalidObservation { value, .. } => {
                        InferenceError::InvalidObservation { index: idx, value }
                    }
                    other => other,
                };
                warn!(
                    step = idx + 1,
                    observations_seen = seen,
                    error = %source,
                    "sequential update stopped"
                );
                return Err(AccumulationError {
                    observations_seen: seen,
                    source,
                    partial: history,
                });
            }
        };
        debug!(
            observations_seen = next.observations_seen(),
            x,
            max_mass = next.masses().max(),
            "snapshot"
        );
        history.push(next);
    }

    info!(snapshots = history.len(), "sequential update finished");
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_observations;
    use crate::domain::GridRange;
    use crate::inference::grid::build_grid;
    use crate::inference::update::update;
    use nalgebra::DMatrix;

    #[test]
    fn history_has_one_snapshot_per_observation() {
        let (grid, prior) =
            build_grid(&GridRange::new(-2.0, 2.0, 0.5), &GridRange::new(0.5, 2.0, 0.5)).unwrap();
        let data = [0.4, -0.2, 1.3, 0.0, 0.9];
        let history = run_sequential(&grid, &prior, &data).unwrap();

        assert_eq!(history.len(), data.len() + 1);
        assert_eq!(history.first(), Some(&prior));
        for (k, snap) in history.snapshots().iter().enumerate() {
            assert_eq!(snap.observations_seen(), k);
            assert_eq!(snap.shape(), grid.shape());
            assert!((snap.total_mass() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn final_snapshot_matches_single_batch_update() {
        let (grid, prior) =
            build_grid(&GridRange::new(-2.0, 2.0, 0.5), &GridRange::new(0.5, 2.0, 0.5)).unwrap();
        let data = [0.4, -0.2, 1.3];
        let history = run_sequential(&grid, &prior, &data).unwrap();
        let batched = update(&grid, &prior, &data).unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.observations_seen(), batched.observations_seen());
        for (a, b) in last.masses().iter().zip(batched.masses().iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_stream_yields_prior_only() {
        let (grid, prior) =
            build_grid(&GridRange::new(0.0, 1.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let history = run_sequential(&grid, &prior, &[]).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.at(0), Some(&prior));
    }

    #[test]
    fn zero_evidence_stops_run_and_keeps_partial_history() {
        let (grid, prior) =
            build_grid(&GridRange::new(0.0, 0.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let err = run_sequential_with(&grid, &prior, &[0.5, 1e6, 0.2], LikelihoodMode::Product)
            .unwrap_err();

        assert_eq!(err.observations_seen, 1);
        assert_eq!(err.source, InferenceError::ZeroEvidence { observations_seen: 1 });
        assert_eq!(err.partial.len(), 2);
        assert_eq!(err.partial.last().map(|s| s.observations_seen()), Some(1));
        assert!(err.to_string().contains("after 1 observations"));
    }

    #[test]
    fn invalid_observation_reports_stream_index() {
        let (grid, prior) =
            build_grid(&GridRange::new(0.0, 1.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let err = run_sequential(&grid, &prior, &[0.1, 0.2, f64::NAN]).unwrap_err();
        assert!(matches!(err.source, InferenceError::InvalidObservation { index: 2, .. }));
        assert_eq!(err.observations_seen, 2);
        assert_eq!(err.partial.len(), 3);
    }

    #[test]
    fn mismatched_initial_snapshot_yields_empty_partial() {
        let (grid, _) =
            build_grid(&GridRange::new(0.0, 1.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let (_, other_prior) =
            build_grid(&GridRange::new(0.0, 3.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let err = run_sequential(&grid, &other_prior, &[0.1]).unwrap_err();
        assert!(matches!(err.source, InferenceError::GridMismatch { .. }));
        assert!(err.partial.is_empty());
    }

    #[test]
    fn posterior_concentrates_on_true_parameters() {
        let (grid, prior) =
            build_grid(&GridRange::new(95.0, 105.0, 1.0), &GridRange::new(1.0, 4.0, 0.5)).unwrap();
        let (i, j) = grid.nearest(100.0, 2.0);

        let seeds: Vec<u64> = (1..=10).collect();
        let concentrated = seeds
            .iter()
            .filter(|&&seed| {
                let data = generate_observations(100.0, 2.0, 400, seed).unwrap();
                let history = run_sequential(&grid, &prior, &data).unwrap();
                let masses: Vec<f64> = history.snapshots().iter().map(|s| s.mass(i, j)).collect();

                let early: f64 = masses[..50].iter().sum::<f64>() / 50.0;
                let late: f64 = masses[masses.len() - 50..].iter().sum::<f64>() / 50.0;
                let last = masses[masses.len() - 1];
                late > early && last > 0.9 && last > masses[0]
            })
            .count();

        assert!(concentrated >= 9, "only {concentrated} of {} seeds concentrated", seeds.len());
    }

    #[test]
    fn corrupt_initial_snapshot_yields_empty_partial() {
        let (grid, _) =
            build_grid(&GridRange::new(99.0, 101.0, 1.0), &GridRange::new(1.0, 1.0, 1.0)).unwrap();
        let corrupt = PosteriorSnapshot::new(DMatrix::from_column_slice(3, 1, &[0.7, -0.2, 0.5]), 0);
        let err = run_sequential(&grid, &corrupt, &[100.0, 100.5]).unwrap_err();
        assert!(matches!(err.source, InferenceError::InvalidSnapshot { observations_seen: 0, .. }));
        assert_eq!(err.observations_seen, 0);
        assert!(err.partial.is_empty());
    }

    #[test]
    fn log_and_product_histories_agree() {
        let (grid, prior) =
            build_grid(&GridRange::new(8.0, 12.0, 0.5), &GridRange::new(0.5, 2.5, 0.5)).unwrap();
        let data = generate_observations(10.0, 1.0, 60, 11).unwrap();
        let log = run_sequential_with(&grid, &prior, &data, LikelihoodMode::Log).unwrap();
        let product = run_sequential_with(&grid, &prior, &data, LikelihoodMode::Product).unwrap();
        for (a, b) in log.snapshots().iter().zip(product.snapshots()) {
            for (x, y) in a.masses().iter().zip(b.masses().iter()) {
                assert!((x - y).abs() < 1e-9);
            }
        }
    }
}
