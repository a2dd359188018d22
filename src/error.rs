//! Error types for the simulation pipeline.

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while generating, transforming or predicting a simulation.
///
/// Every variant is fatal for the run that produced it. The one soft failure
/// of the pipeline (an unrecognised cultivar under the lenient policy) never
/// reaches this type.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// End date precedes the start date or the range holds no days.
    #[error("Invalid date range: {start} -> {end} ({reason})")]
    InvalidRange {
        start: NaiveDate,
        end: NaiveDate,
        reason: &'static str,
    },

    /// A date string was not in `YYYY-MM-DD` form.
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Natural log requested for a non-positive value.
    #[error("Log domain error: column {column} row {row} has value {value}")]
    Domain {
        column: String,
        row: usize,
        value: f64,
    },

    /// Cultivar outside the encoded set under the strict policy.
    #[error("Unknown cultivar '{0}'")]
    UnknownCategory(String),

    /// Model output cannot be reduced to one scalar per row.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Model artifact missing or corrupt.
    #[error("Failed to load artifact {path}: {message}")]
    ArtifactLoad { path: PathBuf, message: String },

    /// Request parameter outside its accepted domain.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required column is absent from a feature frame.
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Failure while writing exported tables.
    #[error("Export failed: {0}")]
    Export(String),
}

impl SimulationError {
    pub fn invalid_range(start: NaiveDate, end: NaiveDate, reason: &'static str) -> Self {
        Self::InvalidRange { start, end, reason }
    }

    pub fn artifact_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::ArtifactLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn shape_mismatch(message: impl Into<String>) -> Self {
        Self::ShapeMismatch(message.into())
    }

    /// True for errors caused by the caller's request rather than by the
    /// artifacts or the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRange { .. }
                | Self::InvalidDate { .. }
                | Self::Domain { .. }
                | Self::UnknownCategory(_)
                | Self::InvalidInput(_)
        )
    }
}

impl From<csv::Error> for SimulationError {
    fn from(e: csv::Error) -> Self {
        Self::Export(e.to_string())
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(e: std::io::Error) -> Self {
        Self::Export(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;
