//! Core types for bankledger
//!
//! This crate holds the rule engine that turns bank transactions into
//! balanced ledger entries:
//!
//! - [`Transaction`] - A normalized row from a bank export
//! - [`Condition`] - A typed predicate over one transaction field
//! - [`Allocation`] - How a share of the amount (plus optional tax) is posted
//! - [`Rule`] - Named conditions plus allocations, first match wins
//! - [`RuleSet`] - Ordered rules as loaded from a rule file
//! - [`Entry`] - The rendered ledger entry with its [`Posting`]s
//!
//! # Example
//!
//! ```
//! use bankledger_core::{
//!     Allocation, Condition, Field, Predicate, RenderOptions, Rule, RuleSet, Transaction,
//! };
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//!
//! let rule = Rule::new("Coffee")
//!     .with_condition(Condition::new(Field::Desc, Predicate::Contains, "COFFEE"))
//!     .with_allocation(Allocation::percent("Expenses:Coffee", dec!(1)));
//! let rules = RuleSet::new(vec![rule]);
//!
//! let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
//! let txn = Transaction::new("Assets:Bank", date, "COFFEE HOUSE", dec!(-4.50));
//!
//! let rule = rules.first_match(&txn).unwrap().expect("rule should match");
//! let entry = rule.render(&txn, &RenderOptions::default()).unwrap();
//! assert_eq!(entry.residual(), dec!(0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod allocation;
pub mod condition;
pub mod engine;
pub mod entry;
pub mod error;
pub mod rule;
pub mod transaction;

pub use allocation::{Allocation, FixedSign, RenderOptions, Share, Split, Tax, TaxMode};
pub use condition::{Condition, Field, Predicate};
pub use engine::{classify, skeleton_rules, sort_by_date, Classified, Outcome, Summary};
pub use entry::{round_money, Entry, Posting};
pub use error::InvalidRuleError;
pub use rule::{MatchMode, Rule, RuleSet, UNKNOWN_ACCOUNT};
pub use transaction::Transaction;

// Re-export commonly used external types
pub use chrono::NaiveDate;
pub use rust_decimal::Decimal;
