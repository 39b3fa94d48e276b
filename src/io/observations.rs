//! Observation ingest.
//!
//! Accepts either a plain list of numbers (one per line) or a CSV file. With
//! `column` set, the first record is a header and that column is used;
//! otherwise the first column is used and a non-numeric first record is treated
//! as a header.
//!
//! Blank lines and `#` comments are skipped. Bad rows are collected as
//! `RowError`s and skipped, unless `strict` is set.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: observations in file order plus skipped rows.
#[derive(Debug, Clone, Default)]
pub struct ObservationData {
    pub values: Vec<f64>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load observations from a file.
pub fn load_observations(path: &Path, column: Option<&str>, strict: bool) -> Result<ObservationData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open observations '{}': {e}", path.display())))?;
    let data = parse_observations(file, column, strict)?;
    if data.values.is_empty() {
        return Err(AppError::new(
            3,
            format!("No usable observations in '{}'.", path.display()),
        ));
    }
    Ok(data)
}

/// Parse observations from any reader.
pub fn parse_observations<R: Read>(reader: R, column: Option<&str>, strict: bool) -> Result<ObservationData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut out = ObservationData::default();
    let mut col_idx = 0;
    let mut header_pending = true;

    for (record_no, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| AppError::new(2, format!("Failed to read observations: {e}")))?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(record_no + 1);

        if is_blank(&record) {
            continue;
        }

        if header_pending {
            header_pending = false;
            if let Some(name) = column {
                col_idx = record
                    .iter()
                    .position(|h| h.eq_ignore_ascii_case(name))
                    .ok_or_else(|| AppError::new(2, format!("Column '{name}' not found in header.")))?;
                continue;
            }
            if record.get(0).is_some_and(|f| f.parse::<f64>().is_err()) {
                continue;
            }
        }

        out.rows_read += 1;
        match parse_field(&record, col_idx) {
            Ok(v) => out.values.push(v),
            Err(message) => {
                if strict {
                    return Err(AppError::new(2, format!("Line {line}: {message}")));
                }
                warn!(line, %message, "skipping observation row");
                out.row_errors.push(RowError { line, message });
            }
        }
    }

    Ok(out)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|f| f.is_empty())
}

fn parse_field(record: &StringRecord, idx: usize) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .ok_or_else(|| format!("missing column {}", idx + 1))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if !value.is_finite() {
        return Err(format!("'{raw}' is not finite"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_list_with_comments_and_blanks() {
        let input = "# heights\n101.2\n\n99.8\n100.5\n";
        let data = parse_observations(input.as_bytes(), None, false).unwrap();
        assert_eq!(data.values, vec![101.2, 99.8, 100.5]);
        assert!(data.row_errors.is_empty());
    }

    #[test]
    fn skips_unnamed_header_and_bad_rows() {
        let input = "value\n1.5\nabc\n2.5\nNaN\n";
        let data = parse_observations(input.as_bytes(), None, false).unwrap();
        assert_eq!(data.values, vec![1.5, 2.5]);
        assert_eq!(data.row_errors.len(), 2);
        assert_eq!(data.rows_read, 4);
    }

    #[test]
    fn selects_named_column() {
        let input = "id,height\na,170.0\nb,181.5\n";
        let data = parse_observations(input.as_bytes(), Some("height"), false).unwrap();
        assert_eq!(data.values, vec![170.0, 181.5]);
    }

    #[test]
    fn strict_mode_fails_on_bad_row() {
        let input = "1.0\noops\n";
        let err = parse_observations(input.as_bytes(), None, true).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_column_is_an_error() {
        let input = "id,height\na,1\n";
        assert!(parse_observations(input.as_bytes(), Some("weight"), false).is_err());
    }
}
