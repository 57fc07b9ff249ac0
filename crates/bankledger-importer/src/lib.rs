//! Bank CSV reader for bankledger
//!
//! This crate turns a bank's CSV export into [`Transaction`]s for the rule
//! engine. The export's shape is described by a column layout
//! (`Date,Desc,Amount`, `Date,Junk,Desc,PaidIn,PaidOut,Balance`, ...) and a
//! date template (`D/M/Y`, `Y-M-D`, `D M Y`, ...).
//!
//! Malformed rows do not stop the import: they are skipped and returned as
//! [`ImportResult::warnings`], unless the configuration is strict.
//!
//! # Example
//!
//! ```
//! use bankledger_importer::{extract_from_string, ImporterConfig};
//!
//! let config = ImporterConfig::csv()
//!     .account("Assets:Current")
//!     .layout("Date,Desc,Amount")
//!     .date_format("D/M/Y")
//!     .build();
//!
//! let result = extract_from_string("15/01/2024,COFFEE,-4.50\n", &config).unwrap();
//! assert_eq!(result.transactions.len(), 1);
//! assert_eq!(result.transactions[0].date_string(), "2024-01-15");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod csv_importer;
pub mod date;
pub mod error;
pub mod layout;

use bankledger_core::Transaction;
use std::path::Path;

pub use config::{CsvConfig, CsvConfigBuilder, ImporterConfig};
pub use csv_importer::CsvImporter;
pub use date::DateFormat;
pub use error::{ImportError, InputFormatError};
pub use layout::{Column, ColumnLayout};

/// Result of an import operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportResult {
    /// The extracted transactions, in file order.
    pub transactions: Vec<Transaction>,
    /// Rows that were skipped, and why.
    pub warnings: Vec<InputFormatError>,
}

impl ImportResult {
    /// Create a new import result.
    pub const fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions,
            warnings: Vec::new(),
        }
    }

    /// Create an empty import result.
    pub const fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Add a warning to the result.
    pub fn with_warning(mut self, warning: InputFormatError) -> Self {
        self.warnings.push(warning);
        self
    }

    /// Number of skipped rows.
    pub fn skipped(&self) -> usize {
        self.warnings.len()
    }
}

/// Extract transactions from a file using the given configuration.
pub fn extract_from_file(path: &Path, config: &ImporterConfig) -> Result<ImportResult, ImportError> {
    config.extract(path)
}

/// Extract transactions from file contents (useful for testing).
pub fn extract_from_string(
    content: &str,
    config: &ImporterConfig,
) -> Result<ImportResult, ImportError> {
    config.extract_from_string(content)
}
