//! Output writers for the run modes.

use bankledger_core::{Classified, Outcome, RuleSet};
use std::io::{self, Write};

/// Write the ledger for a classified batch.
///
/// Posted transactions print as their rendered entry, unmatched ones as a
/// single-posting entry against the bank account. Ignored transactions print
/// nothing. Every entry is followed by a blank line.
pub fn write_ledger<W: Write>(out: &mut W, classified: &[Classified<'_>]) -> io::Result<()> {
    for item in classified {
        match &item.outcome {
            Outcome::Posted { entry, .. } => writeln!(out, "{entry}")?,
            Outcome::Ignored { .. } => {}
            Outcome::Unmatched => writeln!(out, "{}", item.transaction.to_entry())?,
        }
    }
    Ok(())
}

/// Write only the unmatched transactions, one `date,desc,amount` line each.
pub fn write_unmatched<W: Write>(out: &mut W, classified: &[Classified<'_>]) -> io::Result<()> {
    for item in classified {
        if item.outcome == Outcome::Unmatched {
            writeln!(out, "{}", item.transaction)?;
        }
    }
    Ok(())
}

/// Write rules in rule file syntax, each followed by a blank line.
pub fn write_rules<W: Write>(out: &mut W, rules: &RuleSet) -> io::Result<()> {
    for rule in rules {
        writeln!(out, "{rule}")?;
    }
    Ok(())
}
