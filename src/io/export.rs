//! Export a history to long-format CSV.
//!
//! One row per `(snapshot, cell)`: `observations_seen,mean,sd,mass`. This is the
//! shape most plotting and animation tools want as input.

use std::io::Write;
use std::path::Path;

use crate::domain::History;
use crate::error::AppError;

/// Write the history as CSV to `path`.
pub fn write_history_csv(path: &Path, history: &History) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_history_csv_to(file, history)
}

/// Write the history as CSV to any writer.
pub fn write_history_csv_to<W: Write>(writer: W, history: &History) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["observations_seen", "mean", "sd", "mass"])
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    let grid = history.grid();
    for snap in history.snapshots() {
        let n = snap.observations_seen().to_string();
        for (i, j, h) in grid.iter() {
            wtr.write_record([
                n.clone(),
                h.mean.to_string(),
                h.sd.to_string(),
                format!("{:.12e}", snap.mass(i, j)),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    wtr.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}
