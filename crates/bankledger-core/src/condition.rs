//! Typed match conditions.
//!
//! A [`Condition`] tests one [`Field`] of a transaction with a [`Predicate`].
//! String fields compare case-sensitively; ordering predicates on strings are
//! lexicographic, which is why dates are always compared in `YYYY-MM-DD`
//! form. The AMOUNT field compares numerically as an exact decimal value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::InvalidRuleError;
use crate::transaction::Transaction;

/// Which transaction attribute a condition tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Field {
    /// The import account (the payee label of the batch).
    Payee,
    /// The transaction description.
    Desc,
    /// The signed amount.
    Amount,
    /// The normalized date.
    Date,
}

impl Field {
    /// The keyword used in rule files.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Payee => "PAYEE",
            Self::Desc => "DESC",
            Self::Amount => "AMOUNT",
            Self::Date => "DATE",
        }
    }

    /// Look up a field by its rule-file keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "PAYEE" => Some(Self::Payee),
            "DESC" => Some(Self::Desc),
            "AMOUNT" => Some(Self::Amount),
            "DATE" => Some(Self::Date),
            _ => None,
        }
    }

    /// Whether this field is compared numerically.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Amount)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How the field value is compared against the condition value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Predicate {
    /// Substring test.
    Contains,
    /// Prefix test.
    StartsWith,
    /// Suffix test.
    EndsWith,
    /// Exact equality.
    Equals,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
}

impl Predicate {
    /// The canonical keyword used when writing rule files.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::StartsWith => "STARTS_WITH",
            Self::EndsWith => "ENDS_WITH",
            Self::Equals => "EQUALS",
            Self::Gt => "GT",
            Self::Ge => "GE",
            Self::Lt => "LT",
            Self::Le => "LE",
        }
    }

    /// Look up a predicate by keyword or operator alias (`==`, `EQ`, `>`, ...).
    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "EQUALS" | "==" | "EQ" => Some(Self::Equals),
            "CONTAINS" => Some(Self::Contains),
            "STARTS_WITH" => Some(Self::StartsWith),
            "ENDS_WITH" => Some(Self::EndsWith),
            "GT" | ">" => Some(Self::Gt),
            "GE" | ">=" => Some(Self::Ge),
            "LT" | "<" => Some(Self::Lt),
            "LE" | "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Substring predicates only make sense on string fields.
    pub const fn is_substring_test(self) -> bool {
        matches!(self, Self::Contains | Self::StartsWith | Self::EndsWith)
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Equals => ordering == Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Ge => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Le => ordering != Ordering::Greater,
            Self::Contains | Self::StartsWith | Self::EndsWith => false,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A single `<FIELD> <PREDICATE> <VALUE>` test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    /// The tested field.
    pub field: Field,
    /// The comparison.
    pub predicate: Predicate,
    /// The literal from the rule file.
    pub value: String,
}

impl Condition {
    /// Create a new condition.
    pub fn new(field: Field, predicate: Predicate, value: impl Into<String>) -> Self {
        Self {
            field,
            predicate,
            value: value.into(),
        }
    }

    /// Evaluate this condition against a transaction.
    ///
    /// Fails when a substring predicate targets the amount, or when an
    /// amount condition's value is not a decimal.
    pub fn evaluate(&self, txn: &Transaction) -> Result<bool, InvalidRuleError> {
        let subject: Cow<'_, str> = match self.field {
            Field::Amount => return self.evaluate_amount(txn.amount),
            Field::Payee => Cow::Borrowed(txn.account.as_str()),
            Field::Desc => Cow::Borrowed(txn.description.as_str()),
            Field::Date => Cow::Owned(txn.date_string()),
        };
        let value = self.value.as_str();

        Ok(match self.predicate {
            Predicate::Contains => subject.contains(value),
            Predicate::StartsWith => subject.starts_with(value),
            Predicate::EndsWith => subject.ends_with(value),
            other => other.accepts(subject.as_ref().cmp(value)),
        })
    }

    fn evaluate_amount(&self, amount: Decimal) -> Result<bool, InvalidRuleError> {
        if self.predicate.is_substring_test() {
            return Err(InvalidRuleError::AmountSubstringTest {
                predicate: self.predicate,
            });
        }
        let expected = self.amount_value()?;
        Ok(self.predicate.accepts(amount.cmp(&expected)))
    }

    /// Parse the value as a decimal, as used by AMOUNT conditions.
    pub fn amount_value(&self) -> Result<Decimal, InvalidRuleError> {
        Decimal::from_str(self.value.trim()).map_err(|_| InvalidRuleError::InvalidNumber {
            value: self.value.clone(),
        })
    }
}

/// Rule-file form, with the value always double-quoted.
impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.field,
            self.predicate,
            quote(&self.value)
        )
    }
}

/// Quote a value so that a shell-style tokenizer reads it back unchanged.
pub(crate) fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
