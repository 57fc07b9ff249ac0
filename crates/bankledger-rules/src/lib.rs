//! Rule file parser for bankledger.
//!
//! A rule file is a sequence of blocks, each opened by a `Rule:` line:
//!
//! ```text
//! Rule:
//!   Name: Groceries
//!   Match: ANY
//!   Conditions:
//!     DESC CONTAINS "TESCO"
//!     DESC CONTAINS "ALDI"
//!   Allocations:
//!     "Expenses:Groceries" 100%
//! ```
//!
//! Lines starting with `;` or `#` are comments. Condition and allocation
//! lines are split shell-style, so values with spaces need quotes.
//!
//! # Example
//!
//! ```
//! let rules = bankledger_rules::parse(
//!     "Rule:\n  Name: Rent\n  Conditions:\n    DESC STARTS_WITH \"RENT\"\n  Allocations:\n    Expenses:Rent 100%\n",
//! )
//! .unwrap();
//! assert_eq!(rules.len(), 1);
//! assert_eq!(rules.rules()[0].name, "Rent");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
pub mod lexer;
mod parser;
mod span;

pub use error::{LoadError, RuleFileError, RuleFileErrorKind};
pub use span::Span;

use bankledger_core::RuleSet;
use std::fs;
use std::path::Path;

/// Parse rule file text into an ordered rule set.
///
/// The first error aborts parsing; no partial rule set is returned.
pub fn parse(source: &str) -> Result<RuleSet, RuleFileError> {
    parser::parse(source)
}

/// Read and parse a rule file.
pub fn load(path: &Path) -> Result<RuleSet, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match parse(&source) {
        Ok(rules) => {
            tracing::info!(path = %path.display(), rules = rules.len(), "loaded rule file");
            Ok(rules)
        }
        Err(error) => Err(LoadError::Parse {
            path: path.to_path_buf(),
            source_text: source,
            error,
        }),
    }
}
