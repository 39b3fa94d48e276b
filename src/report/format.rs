//! Formatted terminal output.
//!
//! We keep formatting code in one place so the inference code stays clean and
//! output changes are localized.

use crate::domain::{HypothesisGrid, LikelihoodMode, PosteriorSnapshot, RunConfig};
use crate::report::{SnapshotSummary, mean_marginal, sd_marginal};

/// Header block: grid shape, mode, and dataset stats.
pub fn format_run_header(
    config: &RunConfig,
    grid: &HypothesisGrid,
    n_observations: usize,
    data_moments: Option<(f64, f64)>,
) -> String {
    let mut out = String::new();
    out.push_str("=== bg - sequential grid posterior (normal mean/sd) ===\n");
    out.push_str(&format!(
        "Grid: mean=[{}, {}] step {} ({} values) | sd=[{}, {}] step {} ({} values) | cells={}\n",
        config.grid.mean.lo,
        config.grid.mean.hi,
        config.grid.mean.step,
        grid.means().len(),
        config.grid.sd.lo,
        config.grid.sd.hi,
        config.grid.sd.step,
        grid.sds().len(),
        grid.len(),
    ));
    out.push_str(&format!("Likelihood: {}\n", mode_description(config.mode)));
    match data_moments {
        Some((m, s)) => out.push_str(&format!(
            "Observations: n={n_observations} | sample mean={m:.4} | sample sd={s:.4}\n"
        )),
        None => out.push_str("Observations: n=0\n"),
    }
    out
}

fn mode_description(mode: LikelihoodMode) -> &'static str {
    match mode {
        LikelihoodMode::Log => "log (log-sum-exp normalization)",
        LikelihoodMode::Product => "product (raw densities)",
    }
}

/// Table of snapshot summaries, keeping every `every`-th row plus the last.
pub fn format_summary_table(summaries: &[SnapshotSummary], every: usize) -> String {
    let every = every.max(1);
    let mut out = String::new();
    out.push_str(&format!(
        "{:>8}  {:>12}  {:>10}  {:>9}  {:>12}  {:>10}\n",
        "n", "MAP mean", "MAP sd", "MAP mass", "E[mean]", "E[sd]"
    ));
    let last = summaries.len().saturating_sub(1);
    for (idx, s) in summaries.iter().enumerate() {
        if idx % every != 0 && idx != last {
            continue;
        }
        out.push_str(&format!(
            "{:>8}  {:>12.4}  {:>10.4}  {:>9.4}  {:>12.4}  {:>10.4}\n",
            s.observations_seen, s.map.mean, s.map.sd, s.map_mass, s.expected_mean, s.expected_sd
        ));
    }
    out
}

/// Marginal masses for both axes of one snapshot.
pub fn format_marginals(grid: &HypothesisGrid, snapshot: &PosteriorSnapshot) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nMarginals after {} observations:\n",
        snapshot.observations_seen()
    ));
    out.push_str("  mean        mass\n");
    for (v, m) in grid.means().iter().zip(mean_marginal(snapshot)) {
        out.push_str(&format!("  {v:<10.4}  {m:.6}\n"));
    }
    out.push_str("  sd          mass\n");
    for (v, m) in grid.sds().iter().zip(sd_marginal(snapshot)) {
        out.push_str(&format!("  {v:<10.4}  {m:.6}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Hypothesis;

    fn summary(n: usize) -> SnapshotSummary {
        SnapshotSummary {
            observations_seen: n,
            map: Hypothesis { mean: 1.0, sd: 2.0 },
            map_mass: 0.5,
            expected_mean: 1.0,
            expected_sd: 2.0,
            total_mass: 1.0,
        }
    }

    #[test]
    fn table_keeps_every_kth_row_and_the_last() {
        let rows: Vec<SnapshotSummary> = (0..7).map(summary).collect();
        let table = format_summary_table(&rows, 3);
        // header + n = 0, 3, 6
        assert_eq!(table.lines().count(), 4);

        let rows: Vec<SnapshotSummary> = (0..5).map(summary).collect();
        let table = format_summary_table(&rows, 3);
        // header + n = 0, 3, 4
        assert_eq!(table.lines().count(), 4);
    }
}
