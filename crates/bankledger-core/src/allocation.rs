//! Allocation of a transaction amount to destination accounts.
//!
//! Each [`Allocation`] claims a [`Share`] of the transaction, either a
//! fraction of the amount or a fixed value, and may carve a [`Tax`] portion
//! out of that share into a separate account. Allocations post the negation
//! of what they claim, so a fully allocated transaction balances against its
//! source posting.
//!
//! Fixed shares are not scaled by the sign of the transaction:
//! with the default [`FixedSign::AsWritten`] a fixed `30` always posts
//! `-30.00`. There is no check that allocations add up to the whole amount.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::condition::quote;
use crate::entry::{round_money, Posting};
use crate::error::InvalidRuleError;

/// How a percentage tax rate is applied to the allocated amount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaxMode {
    /// Tax is added on top: `tax = allocated * rate`.
    #[default]
    Exclusive,
    /// Tax is already included: `tax = allocated - allocated / (1 + rate)`.
    Inclusive,
}

/// Sign applied to fixed (non-percent) shares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixedSign {
    /// The fixed value is claimed as written and posted negated.
    #[default]
    AsWritten,
    /// The fixed value is claimed negated and posted as written.
    Inverted,
}

/// Knobs for the allocation semantics that differ between rule dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Percentage tax semantics.
    pub tax_mode: TaxMode,
    /// Fixed share sign semantics.
    pub fixed_sign: FixedSign,
}

/// A share of an amount: a fraction or an absolute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Share {
    /// A fraction in 0..=1 semantics (written `50%` in rule files).
    Percent(Decimal),
    /// An absolute value.
    Fixed(Decimal),
}

impl Share {
    /// Parse a rule-file literal; a trailing `%` marks a percentage.
    pub fn parse(literal: &str) -> Option<Self> {
        let literal = literal.trim();
        if let Some(number) = literal.strip_suffix('%') {
            let percent: Decimal = number.trim().parse().ok()?;
            Some(Self::Percent(percent / Decimal::ONE_HUNDRED))
        } else {
            literal.parse().ok().map(Self::Fixed)
        }
    }

    /// Whether this is a percentage share.
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

/// Rule-file literal form (`50%` or `30`).
impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(fraction) => {
                write!(f, "{}%", (*fraction * Decimal::ONE_HUNDRED).normalize())
            }
            Self::Fixed(value) => write!(f, "{value}"),
        }
    }
}

/// The tax carved out of an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tax {
    /// Account receiving the tax portion.
    pub account: String,
    /// Percentage of the allocated amount, or a literal tax value.
    pub rate: Share,
}

/// The full-precision amounts computed for one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split {
    /// The claimed share of the transaction.
    pub allocated: Decimal,
    /// The tax portion of the claimed share (zero without a tax account).
    pub tax: Decimal,
    /// `allocated - tax`, posted to the allocation account.
    pub remainder: Decimal,
}

/// One destination line of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Allocation {
    /// Destination account.
    pub account: String,
    /// How much of the transaction this allocation claims.
    pub share: Share,
    /// Optional tax carve-out.
    pub tax: Option<Tax>,
}

impl Allocation {
    /// Create an allocation from a share.
    pub fn new(account: impl Into<String>, share: Share) -> Self {
        Self {
            account: account.into(),
            share,
            tax: None,
        }
    }

    /// Allocate a fraction of the transaction amount (`1` is 100%).
    pub fn percent(account: impl Into<String>, fraction: Decimal) -> Self {
        Self::new(account, Share::Percent(fraction))
    }

    /// Allocate a fixed value.
    pub fn fixed(account: impl Into<String>, value: Decimal) -> Self {
        Self::new(account, Share::Fixed(value))
    }

    /// Attach a tax carve-out. An empty tax account disables tax.
    pub fn with_tax(mut self, account: impl Into<String>, rate: Share) -> Self {
        let account = account.into();
        self.tax = if account.is_empty() {
            None
        } else {
            Some(Tax { account, rate })
        };
        self
    }

    /// Compute the allocated, tax and remainder amounts for a transaction amount.
    ///
    /// Fails when an intermediate amount overflows the decimal range.
    pub fn split(
        &self,
        amount: Decimal,
        options: &RenderOptions,
    ) -> Result<Split, InvalidRuleError> {
        let out_of_range = || InvalidRuleError::AllocationOutOfRange {
            account: self.account.clone(),
            amount,
        };

        let allocated = match self.share {
            Share::Percent(fraction) => amount.checked_mul(fraction).ok_or_else(out_of_range)?,
            Share::Fixed(value) => match options.fixed_sign {
                FixedSign::AsWritten => value,
                FixedSign::Inverted => -value,
            },
        };

        let tax = match self.tax.as_ref().map(|tax| tax.rate) {
            None => Decimal::ZERO,
            Some(Share::Fixed(value)) => value,
            Some(Share::Percent(rate)) => match options.tax_mode {
                TaxMode::Exclusive => allocated.checked_mul(rate),
                // A -100% inclusive rate has no net amount; no tax is carved out.
                TaxMode::Inclusive => match Decimal::ONE.checked_add(rate) {
                    Some(divisor) if divisor.is_zero() => Some(Decimal::ZERO),
                    divisor => divisor
                        .and_then(|divisor| allocated.checked_div(divisor))
                        .and_then(|net| allocated.checked_sub(net)),
                },
            }
            .ok_or_else(out_of_range)?,
        };

        Ok(Split {
            allocated,
            tax,
            remainder: allocated.checked_sub(tax).ok_or_else(out_of_range)?,
        })
    }

    /// The postings this allocation emits for a transaction amount.
    ///
    /// Always one posting for the allocation account; a second one for the
    /// tax account when the rounded tax is non-zero.
    pub fn postings(
        &self,
        amount: Decimal,
        options: &RenderOptions,
    ) -> Result<Vec<Posting>, InvalidRuleError> {
        let split = self.split(amount, options)?;
        let mut postings = vec![Posting::new(&self.account, -split.remainder)];
        if let Some(tax) = &self.tax {
            if !round_money(split.tax).is_zero() {
                postings.push(Posting::new(&tax.account, -split.tax));
            }
        }
        Ok(postings)
    }
}

/// Rule-file form: `"account" share ["tax account" rate]`.
impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", quote(&self.account), self.share)?;
        if let Some(tax) = &self.tax {
            write!(f, " {} {}", quote(&tax.account), tax.rate)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amounts(postings: Result<Vec<Posting>, InvalidRuleError>) -> Vec<(String, Decimal)> {
        postings
            .unwrap()
            .iter()
            .map(|p| (p.account.clone(), p.display_amount()))
            .collect()
    }

    #[test]
    fn test_share_parse() {
        assert_eq!(Share::parse("50%"), Some(Share::Percent(dec!(0.5))));
        assert_eq!(Share::parse("12.5%"), Some(Share::Percent(dec!(0.125))));
        assert_eq!(Share::parse("30"), Some(Share::Fixed(dec!(30))));
        assert_eq!(Share::parse("-4.20"), Some(Share::Fixed(dec!(-4.2))));
        assert_eq!(Share::parse("%"), None);
        assert_eq!(Share::parse("half"), None);
    }

    #[test]
    fn test_share_display() {
        assert_eq!(Share::Percent(dec!(1)).to_string(), "100%");
        assert_eq!(Share::Percent(dec!(0.125)).to_string(), "12.5%");
        assert_eq!(Share::Fixed(dec!(30.00)).to_string(), "30.00");
    }

    #[test]
    fn test_percent_with_percent_tax() {
        let alloc = Allocation::percent("A", dec!(0.5)).with_tax("T", Share::Percent(dec!(0.1)));
        let split = alloc.split(dec!(100.00), &RenderOptions::default()).unwrap();
        assert_eq!(split.allocated, dec!(50));
        assert_eq!(split.tax, dec!(5));
        assert_eq!(
            amounts(alloc.postings(dec!(100.00), &RenderOptions::default())),
            vec![("A".to_string(), dec!(-45.00)), ("T".to_string(), dec!(-5.00))]
        );
    }

    #[test]
    fn test_fixed_is_not_scaled_by_sign() {
        let alloc = Allocation::fixed("B", dec!(30));
        let options = RenderOptions::default();
        for amount in [dec!(-200.00), dec!(200.00)] {
            assert_eq!(
                amounts(alloc.postings(amount, &options)),
                vec![("B".to_string(), dec!(-30.00))]
            );
        }
    }

    #[test]
    fn test_fixed_inverted() {
        let alloc = Allocation::fixed("B", dec!(30));
        let options = RenderOptions {
            fixed_sign: FixedSign::Inverted,
            ..RenderOptions::default()
        };
        assert_eq!(
            amounts(alloc.postings(dec!(-200), &options)),
            vec![("B".to_string(), dec!(30.00))]
        );
    }

    #[test]
    fn test_fixed_tax_taken_literally() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Fixed(dec!(2.5)));
        let split = alloc.split(dec!(-40), &RenderOptions::default()).unwrap();
        assert_eq!(split.tax, dec!(2.5));
        assert_eq!(split.remainder, dec!(-42.5));
    }

    #[test]
    fn test_fixed_share_with_fixed_tax() {
        let alloc = Allocation::fixed("B", dec!(30)).with_tax("T", Share::Fixed(dec!(5)));
        assert_eq!(
            amounts(alloc.postings(dec!(-200), &RenderOptions::default())),
            vec![("B".to_string(), dec!(-25.00)), ("T".to_string(), dec!(-5.00))]
        );
    }

    #[test]
    fn test_fixed_share_with_percent_tax() {
        let alloc = Allocation::fixed("B", dec!(30)).with_tax("T", Share::Percent(dec!(0.1)));
        let split = alloc.split(dec!(-200), &RenderOptions::default()).unwrap();
        assert_eq!(split.allocated, dec!(30));
        assert_eq!(split.tax, dec!(3));
        assert_eq!(
            amounts(alloc.postings(dec!(-200), &RenderOptions::default())),
            vec![("B".to_string(), dec!(-27.00)), ("T".to_string(), dec!(-3.00))]
        );
    }

    #[test]
    fn test_inclusive_tax() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Percent(dec!(0.1)));
        let options = RenderOptions {
            tax_mode: TaxMode::Inclusive,
            ..RenderOptions::default()
        };
        assert_eq!(
            amounts(alloc.postings(dec!(110), &options)),
            vec![("A".to_string(), dec!(-100.00)), ("T".to_string(), dec!(-10.00))]
        );
    }

    #[test]
    fn test_no_tax_account_means_no_tax() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("", Share::Percent(dec!(0.2)));
        assert!(alloc.tax.is_none());
        let split = alloc.split(dec!(100), &RenderOptions::default()).unwrap();
        assert_eq!(split.tax, Decimal::ZERO);
        assert_eq!(alloc.postings(dec!(100), &RenderOptions::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_zero_tax_not_posted() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Percent(dec!(0)));
        assert_eq!(alloc.postings(dec!(100), &RenderOptions::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_negative_tax_is_posted() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Percent(dec!(0.1)));
        assert_eq!(
            amounts(alloc.postings(dec!(-50), &RenderOptions::default())),
            vec![("A".to_string(), dec!(45.00)), ("T".to_string(), dec!(5.00))]
        );
    }

    #[test]
    fn test_inclusive_minus_hundred_percent_has_no_tax() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Percent(dec!(-1)));
        let options = RenderOptions {
            tax_mode: TaxMode::Inclusive,
            ..RenderOptions::default()
        };
        let split = alloc.split(dec!(10), &options).unwrap();
        assert_eq!(split.tax, Decimal::ZERO);
    }

    #[test]
    fn test_overflowing_share_is_an_error() {
        let share = Share::parse("79228162514264337593543950335%").unwrap();
        let alloc = Allocation::new("A", share);
        let err = alloc.split(dec!(1000), &RenderOptions::default()).unwrap_err();
        assert_eq!(
            err,
            InvalidRuleError::AllocationOutOfRange {
                account: "A".to_string(),
                amount: dec!(1000),
            }
        );
        assert!(alloc.postings(dec!(1000), &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_overflowing_tax_is_an_error() {
        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Fixed(Decimal::MAX));
        assert!(alloc.split(dec!(-200), &RenderOptions::default()).is_err());

        let alloc = Allocation::percent("A", dec!(1)).with_tax("T", Share::Percent(Decimal::MAX));
        assert!(alloc.split(dec!(1000), &RenderOptions::default()).is_err());
    }

    #[test]
    fn test_display() {
        let alloc = Allocation::percent("Expenses:Food", dec!(0.5))
            .with_tax("Liabilities:GST", Share::Percent(dec!(0.1)));
        assert_eq!(
            alloc.to_string(),
            r#""Expenses:Food" 50% "Liabilities:GST" 10%"#
        );
    }
}
