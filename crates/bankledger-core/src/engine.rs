//! Matching engine.
//!
//! Transactions are classified against a [`RuleSet`] independently of each
//! other, so the batch is matched in parallel with rayon. The output keeps
//! the input order, which callers establish with [`sort_by_date`].

use rayon::prelude::*;
use std::collections::BTreeSet;

use crate::allocation::RenderOptions;
use crate::entry::Entry;
use crate::error::InvalidRuleError;
use crate::rule::{Rule, RuleSet};
use crate::transaction::Transaction;

/// What happened to one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<'r> {
    /// A rule matched and rendered an entry.
    Posted {
        /// The matching rule.
        rule: &'r Rule,
        /// The rendered entry.
        entry: Entry,
    },
    /// An `Ignore:` rule matched; nothing is written.
    Ignored {
        /// The matching rule.
        rule: &'r Rule,
    },
    /// No rule matched.
    Unmatched,
}

/// A transaction paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified<'a> {
    /// The classified transaction.
    pub transaction: &'a Transaction,
    /// The outcome.
    pub outcome: Outcome<'a>,
}

/// Order transactions by date, keeping input order within a date.
pub fn sort_by_date(transactions: &mut [Transaction]) {
    transactions.sort_by_key(|txn| txn.date);
}

/// Classify every transaction against the rule set (first match wins).
///
/// The result is in the same order as `transactions`. The first
/// [`InvalidRuleError`] encountered aborts the whole batch.
pub fn classify<'a>(
    rules: &'a RuleSet,
    transactions: &'a [Transaction],
    options: &RenderOptions,
) -> Result<Vec<Classified<'a>>, InvalidRuleError> {
    transactions
        .par_iter()
        .map(|txn| {
            let outcome = match rules.first_match(txn)? {
                Some(rule) if rule.ignore => {
                    tracing::debug!(rule = %rule.name, date = %txn.date, "ignored by rule");
                    Outcome::Ignored { rule }
                }
                Some(rule) => {
                    tracing::debug!(rule = %rule.name, date = %txn.date, "matched rule");
                    Outcome::Posted {
                        rule,
                        entry: rule.render(txn, options)?,
                    }
                }
                None => Outcome::Unmatched,
            };
            Ok(Classified {
                transaction: txn,
                outcome,
            })
        })
        .collect()
}

/// Counts over a classified batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Transactions rendered by a rule.
    pub posted: usize,
    /// Transactions claimed by an ignore rule.
    pub ignored: usize,
    /// Transactions no rule matched.
    pub unmatched: usize,
}

impl Summary {
    /// Tally a classified batch.
    pub fn of(classified: &[Classified<'_>]) -> Self {
        let mut summary = Self::default();
        for item in classified {
            match item.outcome {
                Outcome::Posted { .. } => summary.posted += 1,
                Outcome::Ignored { .. } => summary.ignored += 1,
                Outcome::Unmatched => summary.unmatched += 1,
            }
        }
        summary
    }

    /// Transactions claimed by some rule.
    pub const fn matched(&self) -> usize {
        self.posted + self.ignored
    }
}

/// Skeleton rules for the distinct unmatched descriptions, sorted by
/// description.
pub fn skeleton_rules(classified: &[Classified<'_>]) -> RuleSet {
    let descriptions: BTreeSet<&str> = classified
        .iter()
        .filter(|item| item.outcome == Outcome::Unmatched)
        .map(|item| item.transaction.description.as_str())
        .collect();
    RuleSet::new(descriptions.into_iter().map(Rule::skeleton).collect())
}
