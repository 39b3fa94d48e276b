//! Bayes-rule posterior update over the grid.
//!
//! ```text
//! unnormalized(h) = L(h | batch) · prior(h)
//! posterior(h)    = unnormalized(h) / Σ_h unnormalized(h)
//! ```
//!
//! Per-cell work is independent, so it is evaluated in parallel (one rayon task
//! per mean row). The normalizing sum is taken only after every cell is done.
//!
//! Zero-evidence policy: when the normalizing sum is zero or non-finite the update
//! fails with `InferenceError::ZeroEvidence` instead of producing NaN masses or a
//! substitute distribution.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{Hypothesis, HypothesisGrid, LikelihoodMode, PosteriorSnapshot};
use crate::error::InferenceError;
use crate::inference::likelihood::{likelihood, log_likelihood, validate_batch};
use crate::math::log_sum_exp;

/// Update `prior` with `batch` using the default (log-domain) mode.
pub fn update(
    grid: &HypothesisGrid,
    prior: &PosteriorSnapshot,
    batch: &[f64],
) -> Result<PosteriorSnapshot, InferenceError> {
    update_with(grid, prior, batch, LikelihoodMode::default())
}

/// Update `prior` with `batch` using an explicit likelihood mode.
///
/// The returned snapshot has `observations_seen = prior.observations_seen() + batch.len()`.
/// An empty batch returns the prior unchanged. A prior that is not a probability
/// distribution is rejected with `InvalidSnapshot` before any likelihood work.
pub fn update_with(
    grid: &HypothesisGrid,
    prior: &PosteriorSnapshot,
    batch: &[f64],
    mode: LikelihoodMode,
) -> Result<PosteriorSnapshot, InferenceError> {
    prior.ensure_matches(grid)?;
    prior.ensure_distribution()?;
    validate_batch(batch)?;

    if batch.is_empty() {
        return Ok(prior.clone());
    }

    let masses = match mode {
        LikelihoodMode::Product => product_posterior(grid, prior, batch)?,
        LikelihoodMode::Log => log_posterior(grid, prior, batch)?,
    };

    Ok(PosteriorSnapshot::new(
        masses,
        prior.observations_seen() + batch.len(),
    ))
}

fn product_posterior(
    grid: &HypothesisGrid,
    prior: &PosteriorSnapshot,
    batch: &[f64],
) -> Result<DMatrix<f64>, InferenceError> {
    let unnormalized = per_cell(grid, prior, |h, mass| likelihood(h, batch) * mass);

    let evidence = unnormalized.sum();
    if !(evidence.is_finite() && evidence > 0.0) {
        return Err(InferenceError::ZeroEvidence {
            observations_seen: prior.observations_seen(),
        });
    }

    Ok(unnormalized / evidence)
}

fn log_posterior(
    grid: &HypothesisGrid,
    prior: &PosteriorSnapshot,
    batch: &[f64],
) -> Result<DMatrix<f64>, InferenceError> {
    // Zero prior mass gives ln 0 = -inf, which exp() maps back to 0.
    let log_unnormalized = per_cell(grid, prior, |h, mass| log_likelihood(h, batch) + mass.ln());

    let log_evidence = log_sum_exp(log_unnormalized.as_slice());
    if !log_evidence.is_finite() {
        return Err(InferenceError::ZeroEvidence {
            observations_seen: prior.observations_seen(),
        });
    }

    Ok(log_unnormalized.map(|v| (v - log_evidence).exp()))
}

/// Evaluate `f(hypothesis, prior_mass)` for every cell.
fn per_cell<F>(grid: &HypothesisGrid, prior: &PosteriorSnapshot, f: F) -> DMatrix<f64>
where
    F: Fn(Hypothesis, f64) -> f64 + Sync,
{
    let (rows, cols) = grid.shape();
    let f = &f;
    let values: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map_iter(move |i| {
            (0..cols).map(move |j| f(grid.hypothesis(i, j), prior.mass(i, j)))
        })
        .collect();
    DMatrix::from_row_slice(rows, cols, &values)
}
