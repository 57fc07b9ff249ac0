//! Errors raised while evaluating rules.

use crate::condition::Predicate;
use rust_decimal::Decimal;
use thiserror::Error;

/// A rule that is structurally valid but cannot be evaluated or rendered.
///
/// These indicate a rule-authoring bug rather than a bad input row, so
/// callers abort the run instead of skipping the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRuleError {
    /// A substring predicate was used on the numeric amount field.
    #[error("can't use predicate {predicate} when testing the amount")]
    AmountSubstringTest {
        /// The offending predicate.
        predicate: Predicate,
    },

    /// An AMOUNT condition whose value is not a decimal number.
    #[error("invalid amount '{value}' in condition")]
    InvalidNumber {
        /// The literal from the rule.
        value: String,
    },

    /// An allocation share or tax that does not fit in a decimal.
    #[error("allocation to '{account}' is out of range for amount {amount}")]
    AllocationOutOfRange {
        /// The allocation account.
        account: String,
        /// The transaction amount being split.
        amount: Decimal,
    },
}
