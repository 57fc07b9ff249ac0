//! Bank CSV to ledger CLI.
//!
//! This crate provides the `bank-csv-to-ledger` command: it reads a bank's
//! CSV export, matches each transaction against a rule file and prints
//! balanced ledger entries.
//!
//! # Example Usage
//!
//! ```bash
//! bank-csv-to-ledger statement.csv Assets:Current
//! bank-csv-to-ledger -r rules.txt -D Y-M-D -I statement.csv Assets:Current
//! bank-csv-to-ledger -U statement.csv Assets:Current >> rules.txt
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cmd;
pub mod output;
pub mod report;
