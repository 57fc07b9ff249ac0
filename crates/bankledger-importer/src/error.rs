//! Import error types.

use std::path::PathBuf;
use thiserror::Error;

/// A problem with the input format or with one row of it.
///
/// Row-level variants are collected as warnings unless the import is strict.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputFormatError {
    /// The row does not have one field per layout column.
    #[error("row {row}: expected {expected} columns, found {found}")]
    WrongColumnCount {
        /// 1-based row number.
        row: usize,
        /// Columns in the layout.
        expected: usize,
        /// Fields in the row.
        found: usize,
    },

    /// The date field does not match the date template.
    #[error("row {row}: date '{value}' does not match format '{format}'")]
    InvalidDate {
        /// 1-based row number.
        row: usize,
        /// The raw field.
        value: String,
        /// The date template.
        format: String,
    },

    /// The amount field is not a number.
    #[error("row {row}: invalid amount '{value}'")]
    InvalidAmount {
        /// 1-based row number.
        row: usize,
        /// The raw field.
        value: String,
    },

    /// A date template that is not three `D`, `M`, `Y` parts.
    #[error("invalid date format '{0}'")]
    InvalidDateFormat(String),

    /// A column layout missing a mandatory column.
    #[error("invalid input format: {0}")]
    InvalidLayout(String),

    /// A field delimiter the CSV reader cannot use.
    #[error("invalid delimiter '{0}': must be a single ASCII character")]
    InvalidDelimiter(char),
}

impl InputFormatError {
    /// The row this error belongs to, for row-level errors.
    pub const fn row(&self) -> Option<usize> {
        match self {
            Self::WrongColumnCount { row, .. }
            | Self::InvalidDate { row, .. }
            | Self::InvalidAmount { row, .. } => Some(*row),
            Self::InvalidDateFormat(_) | Self::InvalidLayout(_) | Self::InvalidDelimiter(_) => {
                None
            }
        }
    }
}

/// Errors that abort an import.
#[derive(Debug, Error)]
pub enum ImportError {
    /// IO error reading the input file.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The CSV reader could not decode a record.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration, or a bad row in strict mode.
    #[error(transparent)]
    Format(#[from] InputFormatError),
}
