//! Match rules and rule sets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::allocation::{Allocation, RenderOptions};
use crate::condition::{Condition, Field, Predicate};
use crate::entry::{Entry, Posting};
use crate::error::InvalidRuleError;
use crate::transaction::Transaction;

/// Account used by generated skeleton rules.
pub const UNKNOWN_ACCOUNT: &str = "UNKNOWN:Unknown";

/// How the conditions of a rule combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMode {
    /// Every condition must hold.
    #[default]
    All,
    /// At least one condition must hold.
    Any,
}

impl MatchMode {
    /// The keyword used on the `Match:` line.
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Any => "ANY",
        }
    }

    /// Look up a mode by keyword (case-insensitive).
    pub fn from_keyword(word: &str) -> Option<Self> {
        if word.eq_ignore_ascii_case("ALL") {
            Some(Self::All)
        } else if word.eq_ignore_ascii_case("ANY") {
            Some(Self::Any)
        } else {
            None
        }
    }
}

/// A named bundle of conditions and allocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Unique rule name.
    pub name: String,
    /// AND/OR composition of the conditions.
    pub match_mode: MatchMode,
    /// Conditions, evaluated in declaration order.
    pub conditions: Vec<Condition>,
    /// Allocations, emitted in declaration order.
    pub allocations: Vec<Allocation>,
    /// A match claims the transaction but nothing is written for it.
    pub ignore: bool,
}

impl Rule {
    /// Create an empty rule matching in [`MatchMode::All`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            match_mode: MatchMode::All,
            conditions: Vec::new(),
            allocations: Vec::new(),
            ignore: false,
        }
    }

    /// A starting-point rule for an unmatched description: match it exactly
    /// and send everything to [`UNKNOWN_ACCOUNT`].
    pub fn skeleton(description: &str) -> Self {
        Self::new(description)
            .with_condition(Condition::new(Field::Desc, Predicate::Equals, description))
            .with_allocation(Allocation::percent(UNKNOWN_ACCOUNT, Decimal::ONE))
    }

    /// Set the match mode.
    pub const fn with_match_mode(mut self, mode: MatchMode) -> Self {
        self.match_mode = mode;
        self
    }

    /// Append a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append an allocation.
    pub fn with_allocation(mut self, allocation: Allocation) -> Self {
        self.allocations.push(allocation);
        self
    }

    /// Mark the rule as ignoring what it matches.
    pub const fn ignored(mut self) -> Self {
        self.ignore = true;
        self
    }

    /// Whether this rule applies to the transaction.
    ///
    /// An empty condition list matches everything in `All` mode and nothing
    /// in `Any` mode. Evaluation stops at the first decisive condition.
    pub fn matches(&self, txn: &Transaction) -> Result<bool, InvalidRuleError> {
        match self.match_mode {
            MatchMode::All => {
                for condition in &self.conditions {
                    if !condition.evaluate(txn)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            MatchMode::Any => {
                for condition in &self.conditions {
                    if condition.evaluate(txn)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Render the transaction as an entry: the source posting followed by
    /// each allocation's postings in declaration order.
    ///
    /// Fails if an allocation overflows the decimal range.
    pub fn render(
        &self,
        txn: &Transaction,
        options: &RenderOptions,
    ) -> Result<Entry, InvalidRuleError> {
        let mut entry = Entry::new(txn.date, &txn.description)
            .with_posting(Posting::new(&txn.account, txn.amount));
        for allocation in &self.allocations {
            entry
                .postings
                .extend(allocation.postings(txn.amount, options)?);
        }
        Ok(entry)
    }
}

/// Rule-file form of the rule block.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rule:")?;
        writeln!(f, "  Name: {}", self.name)?;
        if self.match_mode != MatchMode::All {
            writeln!(f, "  Match: {}", self.match_mode.keyword())?;
        }
        if self.ignore {
            writeln!(f, "  Ignore:")?;
        }
        writeln!(f, "  Conditions:")?;
        for condition in &self.conditions {
            writeln!(f, "    {condition}")?;
        }
        writeln!(f, "  Allocations:")?;
        for allocation in &self.allocations {
            writeln!(f, "    {allocation}")?;
        }
        Ok(())
    }
}

/// Rules in file order. Matching always walks this order; the first rule
/// that matches wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Create a rule set from rules in priority order.
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// The rules, in order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Iterate over the rules in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule, in file order, that matches the transaction.
    pub fn first_match(&self, txn: &Transaction) -> Result<Option<&Rule>, InvalidRuleError> {
        for rule in &self.rules {
            if rule.matches(txn)? {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Rule blocks separated by blank lines.
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{rule}")?;
        }
        Ok(())
    }
}
