use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// Why a single data row was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum MalformedReason {
    /// The row does not have exactly five fields.
    ColumnCount { found: usize },
    /// A field is not a number after decimal substitution.
    NonNumeric { column: &'static str, text: String },
    /// A field uses `.` or more than one `,` as decimal separator.
    DecimalSeparator { column: &'static str, text: String },
    /// The cycle number is not integral.
    NonIntegerCycle { text: String },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::ColumnCount { found } => {
                write!(f, "expected 5 tab-separated fields, found {found}")
            }
            MalformedReason::NonNumeric { column, text } => {
                write!(f, "{column}: '{text}' is not a number")
            }
            MalformedReason::DecimalSeparator { column, text } => {
                write!(f, "{column}: '{text}' does not use ',' as decimal separator")
            }
            MalformedReason::NonIntegerCycle { text } => {
                write!(f, "cycle number '{text}' is not an integer")
            }
        }
    }
}

/// A data row that could not be parsed. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {reason}")]
pub struct MalformedRecordError {
    pub line: u64,
    pub reason: MalformedReason,
}

/// Whole-file load failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to split records: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),

    #[error("{mismatched} of {rows} data rows have the wrong column count; not a cycling data file")]
    Structural { mismatched: usize, rows: usize },

    #[error("No valid data rows ({skipped} skipped)")]
    NoRecords { skipped: usize },

    #[error(transparent)]
    InvalidConfig(#[from] InvalidParameterError),
}

// ---------------------------------------------------------------------------
// Processing errors
// ---------------------------------------------------------------------------

/// A cycle number outside the detected range was requested.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} number {requested}. Available: 1-{available}")]
pub struct CycleIndexError {
    pub kind: &'static str,
    pub requested: usize,
    pub available: usize,
}

impl CycleIndexError {
    pub fn cycle(requested: usize, available: usize) -> Self {
        Self {
            kind: "cycle",
            requested,
            available,
        }
    }
}

/// A parameter was rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid {name} {value}: {reason}")]
pub struct InvalidParameterError {
    pub name: &'static str,
    pub value: f64,
    pub reason: &'static str,
}

impl InvalidParameterError {
    pub fn new(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self {
            name,
            value,
            reason,
        }
    }
}
