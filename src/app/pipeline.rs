//! Shared run pipeline used by the `run` command.
//!
//! observations (file or simulation) -> grid + prior -> sequential updates -> summaries
//!
//! A failed accumulation is not an early return here: the partial history is
//! kept in `RunOutput` so the caller can still print and export it before
//! reporting the failure.

use tracing::info;

use crate::data::{describe, generate_observations};
use crate::domain::{History, ObservationSource, RunConfig};
use crate::error::AppError;
use crate::inference::{AccumulationError, build_grid, run_sequential_with};
use crate::io::{RowError, load_observations};
use crate::report::{SnapshotSummary, summarize_history};

/// All computed outputs of a single `bg run`.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub observations: Vec<f64>,
    pub row_errors: Vec<RowError>,
    pub history: History,
    pub summaries: Vec<SnapshotSummary>,
    /// Set when accumulation stopped before the end of the stream.
    pub failure: Option<AccumulationError>,
}

impl RunOutput {
    /// Sample mean and sd of the observations that were loaded.
    pub fn data_moments(&self) -> Option<(f64, f64)> {
        describe(&self.observations)
    }
}

/// Load observations according to `config.source`.
pub fn load_source(config: &RunConfig) -> Result<(Vec<f64>, Vec<RowError>), AppError> {
    match &config.source {
        ObservationSource::File { path, column, strict } => {
            let data = load_observations(path, column.as_deref(), *strict)?;
            info!(
                path = %path.display(),
                rows_read = data.rows_read,
                used = data.values.len(),
                skipped = data.row_errors.len(),
                "loaded observations"
            );
            Ok((data.values, data.row_errors))
        }
        ObservationSource::Simulated { mean, sd, n, seed } => {
            let values = generate_observations(*mean, *sd, *n, *seed)?;
            info!(mean, sd, n, seed, "simulated observations");
            Ok((values, Vec::new()))
        }
    }
}

/// Execute the full pipeline.
pub fn run_inference(config: &RunConfig) -> Result<RunOutput, AppError> {
    let (observations, row_errors) = load_source(config)?;
    run_inference_with_observations(config, observations, row_errors)
}

/// Execute the pipeline on pre-loaded observations.
pub fn run_inference_with_observations(
    config: &RunConfig,
    observations: Vec<f64>,
    row_errors: Vec<RowError>,
) -> Result<RunOutput, AppError> {
    let (grid, prior) = build_grid(&config.grid.mean, &config.grid.sd)?;

    let (history, failure) = match run_sequential_with(&grid, &prior, &observations, config.mode) {
        Ok(history) => (history, None),
        Err(err) => (err.partial.clone(), Some(err)),
    };

    let summaries = summarize_history(&history);

    Ok(RunOutput {
        observations,
        row_errors,
        history,
        summaries,
        failure,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GridConfig, GridRange, LikelihoodMode};

    fn config(mode: LikelihoodMode, mean_hi: f64) -> RunConfig {
        RunConfig {
            grid: GridConfig {
                mean: GridRange::new(0.0, mean_hi, 1.0),
                sd: GridRange::new(1.0, 1.0, 1.0),
            },
            mode,
            source: ObservationSource::Simulated {
                mean: 2.0,
                sd: 1.0,
                n: 200,
                seed: 3,
            },
            every: 1,
            export_csv: None,
            export_json: None,
        }
    }

    #[test]
    fn simulated_run_produces_full_history() {
        let out = run_inference(&config(LikelihoodMode::Log, 4.0)).unwrap();
        assert_eq!(out.observations.len(), 200);
        assert_eq!(out.history.len(), 201);
        assert_eq!(out.summaries.len(), 201);
        assert!(out.failure.is_none());
        assert_eq!(out.summaries.last().map(|s| s.map.mean), Some(2.0));
    }

    #[test]
    fn failure_keeps_partial_history() {
        let out = run_inference_with_observations(
            &config(LikelihoodMode::Product, 0.0),
            vec![0.1, 1e6, 0.3],
            Vec::new(),
        )
        .unwrap();
        let failure = out.failure.as_ref().unwrap();
        assert_eq!(failure.observations_seen, 1);
        assert_eq!(out.history.len(), 2);
        assert_eq!(out.summaries.len(), 2);
    }

    #[test]
    fn invalid_grid_is_an_input_error() {
        let mut cfg = config(LikelihoodMode::Log, 4.0);
        cfg.grid.sd = GridRange::new(-1.0, -1.0, 1.0);
        let err = run_inference(&cfg).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
