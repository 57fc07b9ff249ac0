//! Normalized bank transactions.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::entry::{round_money, Entry, Posting};

/// A single transaction read from a bank export.
///
/// Positive amounts are credits to `account`, negative amounts are debits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// The account this import batch belongs to (constant per run).
    pub account: String,
    /// Transaction date.
    pub date: NaiveDate,
    /// Free-text description from the bank.
    pub description: String,
    /// Signed amount.
    pub amount: Decimal,
}

impl Transaction {
    /// Create a new transaction.
    pub fn new(
        account: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
    ) -> Self {
        Self {
            account: account.into(),
            date,
            description: description.into(),
            amount,
        }
    }

    /// The date in its sortable `YYYY-MM-DD` form, as seen by DATE conditions.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Render this transaction as an entry with only the source posting.
    ///
    /// Used for transactions that no rule claimed.
    pub fn to_entry(&self) -> Entry {
        Entry::new(self.date, &self.description)
            .with_posting(Posting::new(&self.account, self.amount))
    }
}

/// Compact `date,description,amount` form.
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{:.2}",
            self.date_string(),
            self.description,
            round_money(self.amount)
        )
    }
}
