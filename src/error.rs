//! Error types.
//!
//! - `InferenceError` is returned by the inference core (grid building, updates).
//! - `AppError` is what the `bg` binary reports: a message plus a process exit code.
//!
//! Exit codes:
//! - 2: invalid input or configuration
//! - 3: insufficient data
//! - 4: numeric failure during inference

use thiserror::Error;

/// Errors raised by the inference core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// A grid range discretized to nothing, or an sd candidate was not positive.
    #[error("invalid grid configuration: {0}")]
    InvalidGridConfiguration(String),

    /// An observation in a batch was NaN or infinite.
    #[error("invalid observation at batch index {index}: {value}")]
    InvalidObservation { index: usize, value: f64 },

    /// A snapshot's mass matrix does not have the grid's shape.
    #[error(
        "snapshot shape {actual_rows}x{actual_cols} does not match grid shape {expected_rows}x{expected_cols}"
    )]
    GridMismatch {
        expected_rows: usize,
        expected_cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },

    /// A snapshot's masses are not a probability distribution.
    #[error("invalid snapshot after {observations_seen} observations: {reason}")]
    InvalidSnapshot {
        observations_seen: usize,
        reason: String,
    },

    /// Total evidence over the grid was zero (or non-finite) for a batch.
    #[error(
        "zero evidence after {observations_seen} observations: every hypothesis assigns \
         (numerically) zero likelihood to the batch; widen the grid or use log mode"
    )]
    ZeroEvidence { observations_seen: usize },
}

impl InferenceError {
    /// Exit code used when this error reaches the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            InferenceError::InvalidGridConfiguration(_)
            | InferenceError::InvalidObservation { .. }
            | InferenceError::GridMismatch { .. }
            | InferenceError::InvalidSnapshot { .. } => 2,
            InferenceError::ZeroEvidence { .. } => 4,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<InferenceError> for AppError {
    fn from(err: InferenceError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inference_errors_map_to_exit_codes() {
        let err: AppError = InferenceError::ZeroEvidence { observations_seen: 7 }.into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("after 7 observations"));

        let err: AppError = InferenceError::InvalidGridConfiguration("empty".into()).into();
        assert_eq!(err.exit_code(), 2);

        let err: AppError = InferenceError::InvalidSnapshot {
            observations_seen: 0,
            reason: "negative mass".into(),
        }
        .into();
        assert_eq!(err.exit_code(), 2);
    }
}
