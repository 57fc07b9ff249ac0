//! Rendered ledger entries.
//!
//! An [`Entry`] is what a matched rule produces: a header line with the date
//! and description, followed by tab-separated postings. Amounts keep full
//! precision internally and are rounded to cents only when displayed.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Round a monetary value to two decimal places for display.
///
/// Midpoints round away from zero, and a negative zero is normalized so it
/// never prints as `-0.00`.
pub fn round_money(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// One account/amount line in an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Posting {
    /// The account receiving the amount.
    pub account: String,
    /// Full-precision amount.
    pub amount: Decimal,
}

impl Posting {
    /// Create a new posting.
    pub fn new(account: impl Into<String>, amount: Decimal) -> Self {
        Self {
            account: account.into(),
            amount,
        }
    }

    /// The amount as it is printed.
    pub fn display_amount(&self) -> Decimal {
        round_money(self.amount)
    }
}

impl fmt::Display for Posting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}\t{:.2}", self.account, self.display_amount())
    }
}

/// A ledger entry: a dated description followed by postings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Entry date.
    pub date: NaiveDate,
    /// Description line.
    pub description: String,
    /// Postings, in emission order.
    pub postings: Vec<Posting>,
}

impl Entry {
    /// Create an entry without postings.
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            description: description.into(),
            postings: Vec::new(),
        }
    }

    /// Append a posting.
    pub fn with_posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }

    /// Sum of the displayed (rounded) posting amounts.
    ///
    /// Zero for a fully allocated entry.
    pub fn residual(&self) -> Decimal {
        self.postings.iter().map(Posting::display_amount).sum()
    }

    /// Whether the displayed postings sum to zero.
    pub fn is_balanced(&self) -> bool {
        self.residual().is_zero()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}\t{}", self.date.format("%Y-%m-%d"), self.description)?;
        for posting in &self.postings {
            writeln!(f, "{posting}")?;
        }
        Ok(())
    }
}
