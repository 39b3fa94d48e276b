//! Read/write history JSON files.
//!
//! History JSON is the portable form of a finished run:
//! - run metadata (tool, generation time, likelihood mode)
//! - the grid axes
//! - one row-major mass vector per snapshot
//!
//! Reloading validates the grid, every snapshot's shape and normalization, and
//! the gapless `observations_seen` sequence.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::domain::{History, HypothesisGrid, LikelihoodMode, PosteriorSnapshot};
use crate::error::AppError;

/// On-disk history document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub mode: LikelihoodMode,
    pub means: Vec<f64>,
    pub sds: Vec<f64>,
    pub snapshots: Vec<SnapshotRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub observations_seen: usize,
    /// Row-major: index `i * sds.len() + j` is `(means[i], sds[j])`.
    pub masses: Vec<f64>,
}

impl HistoryFile {
    pub fn from_history(history: &History, mode: LikelihoodMode) -> Self {
        let grid = history.grid();
        HistoryFile {
            tool: "bg".to_string(),
            generated_at: Utc::now(),
            mode,
            means: grid.means().to_vec(),
            sds: grid.sds().to_vec(),
            snapshots: history
                .snapshots()
                .iter()
                .map(|s| SnapshotRecord {
                    observations_seen: s.observations_seen(),
                    masses: s.row_major(),
                })
                .collect(),
        }
    }

    /// Rebuild and validate the in-memory history.
    pub fn to_history(&self) -> Result<History, AppError> {
        let grid = HypothesisGrid::new(self.means.clone(), self.sds.clone())
            .map_err(|e| AppError::new(2, format!("Invalid history grid: {e}")))?;
        let (rows, cols) = grid.shape();

        let mut records = self.snapshots.iter();
        let first = records
            .next()
            .ok_or_else(|| AppError::new(3, "History file has no snapshots."))?;
        let mut history = History::new(grid, to_snapshot(first, rows, cols)?)
            .map_err(|e| AppError::new(2, format!("Invalid history snapshot: {e}")))?;

        let mut expected = first.observations_seen;
        for record in records {
            expected += 1;
            if record.observations_seen != expected {
                return Err(AppError::new(
                    2,
                    format!(
                        "History snapshots are not consecutive: expected observations_seen={expected}, found {}.",
                        record.observations_seen
                    ),
                ));
            }
            history.push(to_snapshot(record, rows, cols)?);
        }
        Ok(history)
    }
}

fn to_snapshot(record: &SnapshotRecord, rows: usize, cols: usize) -> Result<PosteriorSnapshot, AppError> {
    if record.masses.len() != rows * cols {
        return Err(AppError::new(
            2,
            format!(
                "Snapshot {} has {} masses; grid has {} cells.",
                record.observations_seen,
                record.masses.len(),
                rows * cols
            ),
        ));
    }
    let snapshot = PosteriorSnapshot::new(
        DMatrix::from_row_slice(rows, cols, &record.masses),
        record.observations_seen,
    );
    snapshot
        .ensure_distribution()
        .map_err(|e| AppError::new(2, format!("History file has an {e}.")))?;
    Ok(snapshot)
}

/// Write a history JSON file.
pub fn write_history_json(path: &Path, history: &History, mode: LikelihoodMode) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create history JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &HistoryFile::from_history(history, mode))
        .map_err(|e| AppError::new(2, format!("Failed to write history JSON: {e}")))?;

    Ok(())
}

/// Read a history JSON file.
pub fn read_history_json(path: &Path) -> Result<HistoryFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open history JSON '{}': {e}", path.display())))?;
    let doc: HistoryFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid history JSON: {e}")))?;
    Ok(doc)
}
