//! Line-oriented rule file parser.
//!
//! The parser is a small state machine driven one line at a time. A `Rule:`
//! line closes the rule being built (if any) and opens a new one; the
//! section markers switch between reading conditions and allocations.

use std::collections::HashSet;

use bankledger_core::{Allocation, Condition, Field, MatchMode, Predicate, Rule, RuleSet, Share};
use rust_decimal::Decimal;

use crate::lexer::{self, LexError, Token};
use crate::{RuleFileError, RuleFileErrorKind, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingRule,
    InRuleHeader,
    InConditions,
    InAllocations,
}

/// A trimmed source line with its position in the file.
struct Line<'s> {
    number: usize,
    offset: usize,
    text: &'s str,
}

impl Line<'_> {
    fn span(&self) -> Span {
        Span::new(self.offset, self.offset + self.text.len())
    }

    fn error(&self, kind: RuleFileErrorKind, span: Span) -> RuleFileError {
        RuleFileError::new(kind, self.number, span.offset(self.offset))
    }
}

/// A rule under construction.
struct PendingRule {
    marker: Span,
    marker_line: usize,
    name: Option<(String, usize, Span)>,
    match_mode: MatchMode,
    ignore: bool,
    conditions: Vec<Condition>,
    allocations: Vec<Allocation>,
}

impl PendingRule {
    fn open(line: &Line<'_>) -> Self {
        Self {
            marker: line.span(),
            marker_line: line.number,
            name: None,
            match_mode: MatchMode::All,
            ignore: false,
            conditions: Vec::new(),
            allocations: Vec::new(),
        }
    }

    fn finish(self, seen: &mut HashSet<String>) -> Result<Rule, RuleFileError> {
        let Some((name, line, span)) = self.name.filter(|(name, ..)| !name.is_empty()) else {
            return Err(RuleFileError::new(
                RuleFileErrorKind::MissingName,
                self.marker_line,
                self.marker,
            )
            .with_hint("add a `Name:` line to the rule"));
        };
        if !seen.insert(name.clone()) {
            return Err(
                RuleFileError::new(RuleFileErrorKind::DuplicateName(name), line, span)
                    .with_hint("rule names must be unique within a file"),
            );
        }
        Ok(Rule {
            name,
            match_mode: self.match_mode,
            conditions: self.conditions,
            allocations: self.allocations,
            ignore: self.ignore,
        })
    }
}

/// Split the source into trimmed lines, tracking byte offsets.
fn lines(source: &str) -> impl Iterator<Item = Line<'_>> {
    let mut offset = 0;
    source
        .split_inclusive('\n')
        .enumerate()
        .map(move |(index, raw)| {
            let start = offset;
            offset += raw.len();
            let leading = raw.len() - raw.trim_start().len();
            Line {
                number: index + 1,
                offset: start + leading,
                text: raw.trim(),
            }
        })
}

pub fn parse(source: &str) -> Result<RuleSet, RuleFileError> {
    let mut state = State::AwaitingRule;
    let mut pending: Option<PendingRule> = None;
    let mut seen = HashSet::new();
    let mut rules = Vec::new();

    for line in lines(source) {
        let text = line.text;
        if text.is_empty() || text.starts_with(';') || text.starts_with('#') {
            continue;
        }

        if text.starts_with("Rule:") {
            if let Some(rule) = pending.take() {
                rules.push(rule.finish(&mut seen)?);
            }
            pending = Some(PendingRule::open(&line));
            state = State::InRuleHeader;
            continue;
        }

        let Some(rule) = pending.as_mut() else {
            tracing::debug!(line = line.number, "ignoring line before the first rule");
            continue;
        };

        if let Some(rest) = text.strip_prefix("Name:") {
            let name = rest.trim();
            let start = line.text.len() - rest.trim_start().len();
            let span = Span::new(start, start + name.len()).offset(line.offset);
            rule.name = Some((name.to_string(), line.number, span));
        } else if let Some(rest) = text
            .strip_prefix("Match:")
            .filter(|_| state == State::InRuleHeader)
        {
            rule.match_mode = parse_match_mode(&line, rest)?;
        } else if text.starts_with("Ignore:") {
            rule.ignore = true;
        } else if text.starts_with("Conditions:") {
            state = State::InConditions;
        } else if text.starts_with("Allocations:") {
            state = State::InAllocations;
        } else {
            match state {
                State::InConditions => {
                    if let Some(condition) = parse_condition(&line)? {
                        rule.conditions.push(condition);
                    }
                }
                State::InAllocations => {
                    if let Some(allocation) = parse_allocation(&line)? {
                        rule.allocations.push(allocation);
                    }
                }
                State::AwaitingRule | State::InRuleHeader => {
                    tracing::debug!(line = line.number, "ignoring unrecognized line");
                }
            }
        }
    }

    if let Some(rule) = pending {
        rules.push(rule.finish(&mut seen)?);
    }

    tracing::debug!(rules = rules.len(), "parsed rule file");
    Ok(RuleSet::new(rules))
}

fn parse_match_mode(line: &Line<'_>, rest: &str) -> Result<MatchMode, RuleFileError> {
    let word = rest.trim();
    MatchMode::from_keyword(word).ok_or_else(|| {
        line.error(
            RuleFileErrorKind::InvalidMatchMode(word.to_string()),
            Span::new(0, line.text.len()),
        )
        .with_hint("expected `Match: ALL` or `Match: ANY`")
    })
}

fn tokenize(line: &Line<'_>) -> Result<Vec<Token>, RuleFileError> {
    lexer::tokenize(line.text).map_err(|err| match err {
        LexError::UnclosedQuote { span } => line
            .error(RuleFileErrorKind::UnclosedQuote, span)
            .with_hint("close the quoted value on the same line"),
        LexError::TrailingBackslash { span } => line
            .error(RuleFileErrorKind::TrailingBackslash, span)
            .with_hint("write `\\\\` for a literal backslash"),
    })
}

/// `FIELD PREDICATE VALUE`; other token counts are skipped.
fn parse_condition(line: &Line<'_>) -> Result<Option<Condition>, RuleFileError> {
    let tokens = tokenize(line)?;
    let [field, predicate, value] = tokens.as_slice() else {
        tracing::warn!(
            line = line.number,
            tokens = tokens.len(),
            "skipping condition line without exactly 3 fields"
        );
        return Ok(None);
    };

    let field_kind = Field::from_keyword(&field.text).ok_or_else(|| {
        line.error(RuleFileErrorKind::UnknownField(field.text.clone()), field.span)
            .with_hint("fields are PAYEE, DESC, AMOUNT and DATE")
    })?;
    let predicate_kind = Predicate::from_keyword(&predicate.text).ok_or_else(|| {
        line.error(
            RuleFileErrorKind::UnknownPredicate(predicate.text.clone()),
            predicate.span,
        )
    })?;

    if field_kind.is_numeric()
        && !predicate_kind.is_substring_test()
        && value.text.trim().parse::<Decimal>().is_err()
    {
        return Err(line.error(
            RuleFileErrorKind::InvalidNumber(value.text.clone()),
            value.span,
        ));
    }

    Ok(Some(Condition::new(
        field_kind,
        predicate_kind,
        value.text.clone(),
    )))
}

/// `ACCOUNT SHARE [TAX_ACCOUNT TAX_RATE]`; other token counts are skipped.
fn parse_allocation(line: &Line<'_>) -> Result<Option<Allocation>, RuleFileError> {
    let tokens = tokenize(line)?;
    let share = |token: &Token| {
        Share::parse(&token.text).ok_or_else(|| {
            line.error(RuleFileErrorKind::InvalidNumber(token.text.clone()), token.span)
                .with_hint("write a number, with a trailing `%` for a percentage")
        })
    };

    match tokens.as_slice() {
        [account, amount] => Ok(Some(Allocation::new(account.text.clone(), share(amount)?))),
        [account, amount, tax_account, tax_rate] => Ok(Some(
            Allocation::new(account.text.clone(), share(amount)?)
                .with_tax(tax_account.text.clone(), share(tax_rate)?),
        )),
        _ => {
            tracing::warn!(
                line = line.number,
                tokens = tokens.len(),
                "skipping allocation line without 2 or 4 fields"
            );
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse_err(source: &str) -> RuleFileError {
        parse(source).unwrap_err()
    }

    #[test]
    fn test_empty_source() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("; just a comment\n\n# another\n").unwrap().is_empty());
    }

    #[test]
    fn test_single_rule() {
        let rules = parse(
            "Rule:\n  Name: Coffee\n  Conditions:\n    DESC CONTAINS \"COFFEE\"\n  Allocations:\n    \"Expenses:Coffee\" 100%\n",
        )
        .unwrap();
        assert_eq!(rules.len(), 1);
        let rule = &rules.rules()[0];
        assert_eq!(rule.name, "Coffee");
        assert_eq!(rule.match_mode, MatchMode::All);
        assert!(!rule.ignore);
        assert_eq!(
            rule.conditions,
            vec![Condition::new(Field::Desc, Predicate::Contains, "COFFEE")]
        );
        assert_eq!(
            rule.allocations,
            vec![Allocation::percent("Expenses:Coffee", dec!(1))]
        );
    }

    #[test]
    fn test_header_lines() {
        let rules = parse("Rule:\n  Name:   Transfers  \n  Match: any\n  Ignore:\n").unwrap();
        let rule = &rules.rules()[0];
        assert_eq!(rule.name, "Transfers");
        assert_eq!(rule.match_mode, MatchMode::Any);
        assert!(rule.ignore);
    }

    #[test]
    fn test_lines_before_first_rule_are_ignored() {
        let rules = parse("Name: Stray\nDESC FOO bar\nRule:\nName: Real\n").unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules.rules()[0].name, "Real");
    }

    #[test]
    fn test_header_before_sections_is_lenient() {
        let rules = parse("Rule:\n  Name: R\n  something else\n  Conditions:\n").unwrap();
        assert!(rules.rules()[0].conditions.is_empty());
    }

    #[test]
    fn test_comments_inside_sections() {
        let rules = parse(
            "Rule:\nName: R\nConditions:\n; DESC BOGUS x\n# FOO EQUALS y\nDESC EQUALS \"x\"\n",
        )
        .unwrap();
        assert_eq!(rules.rules()[0].conditions.len(), 1);
    }

    #[test]
    fn test_predicate_aliases() {
        let rules = parse(
            "Rule:\nName: R\nConditions:\nAMOUNT == 1\nAMOUNT > 1\nAMOUNT >= 1\nAMOUNT < 1\nAMOUNT <= 1\nAMOUNT EQ 1\n",
        )
        .unwrap();
        let predicates: Vec<_> = rules.rules()[0]
            .conditions
            .iter()
            .map(|c| c.predicate)
            .collect();
        assert_eq!(
            predicates,
            vec![
                Predicate::Equals,
                Predicate::Gt,
                Predicate::Ge,
                Predicate::Lt,
                Predicate::Le,
                Predicate::Equals,
            ]
        );
    }

    #[test]
    fn test_wrong_condition_token_count_is_skipped() {
        let rules = parse("Rule:\nName: R\nConditions:\nDESC CONTAINS two words\nDESC\n").unwrap();
        assert!(rules.rules()[0].conditions.is_empty());
    }

    #[test]
    fn test_allocation_with_tax() {
        let rules =
            parse("Rule:\nName: R\nAllocations:\n\"Expenses:Food\" 50% \"Liabilities:VAT\" 20%\n")
                .unwrap();
        assert_eq!(
            rules.rules()[0].allocations,
            vec![Allocation::percent("Expenses:Food", dec!(0.5))
                .with_tax("Liabilities:VAT", Share::Percent(dec!(0.2)))]
        );
    }

    #[test]
    fn test_fixed_allocation_and_tax() {
        let rules = parse("Rule:\nName: R\nAllocations:\nExpenses:Fees 30 Liabilities:VAT 5\n").unwrap();
        assert_eq!(
            rules.rules()[0].allocations,
            vec![Allocation::fixed("Expenses:Fees", dec!(30))
                .with_tax("Liabilities:VAT", Share::Fixed(dec!(5)))]
        );
    }

    #[test]
    fn test_wrong_allocation_token_count_is_skipped() {
        let rules = parse("Rule:\nName: R\nAllocations:\nA\nA 1 B\nA 1 B 2 C\nZ 10%\n").unwrap();
        let accounts: Vec<_> = rules.rules()[0]
            .allocations
            .iter()
            .map(|a| a.account.as_str())
            .collect();
        assert_eq!(accounts, vec!["Z"]);
    }

    #[test]
    fn test_missing_name() {
        let err = parse_err("Rule:\n  Conditions:\n");
        assert_eq!(err.kind, RuleFileErrorKind::MissingName);
        assert_eq!(err.line, 1);
        assert_eq!(err.span, Span::new(0, 5));
        assert!(err.hint.is_some());

        let err = parse_err("Rule:\nName:\n");
        assert_eq!(err.kind, RuleFileErrorKind::MissingName);
    }

    #[test]
    fn test_duplicate_name_span() {
        let source = "Rule:\nName: A\nRule:\nName: B\nRule:\n  Name: A\n";
        let err = parse_err(source);
        assert_eq!(err.kind, RuleFileErrorKind::DuplicateName("A".to_string()));
        assert_eq!(err.line, 6);
        assert_eq!(err.span.text(source), "A");
    }

    #[test]
    fn test_unknown_field_span() {
        let source = "Rule:\nName: R\nConditions:\n    MEMO CONTAINS x\n";
        let err = parse_err(source);
        assert_eq!(err.kind, RuleFileErrorKind::UnknownField("MEMO".to_string()));
        assert_eq!(err.line, 4);
        assert_eq!(err.span.text(source), "MEMO");
    }

    #[test]
    fn test_unknown_predicate() {
        let err = parse_err("Rule:\nName: R\nConditions:\nDESC LIKE x\n");
        assert_eq!(err.kind, RuleFileErrorKind::UnknownPredicate("LIKE".to_string()));
    }

    #[test]
    fn test_invalid_amount_condition() {
        let err = parse_err("Rule:\nName: R\nConditions:\nAMOUNT GT ten\n");
        assert_eq!(err.kind, RuleFileErrorKind::InvalidNumber("ten".to_string()));
    }

    #[test]
    fn test_amount_substring_test_loads() {
        // Rejected when evaluated, not when loaded.
        let rules = parse("Rule:\nName: R\nConditions:\nAMOUNT CONTAINS 9\n").unwrap();
        assert_eq!(rules.rules()[0].conditions[0].predicate, Predicate::Contains);
    }

    #[test]
    fn test_invalid_allocation_number() {
        let source = "Rule:\nName: R\nAllocations:\nA half\n";
        let err = parse_err(source);
        assert_eq!(err.kind, RuleFileErrorKind::InvalidNumber("half".to_string()));
        assert_eq!(err.span.text(source), "half");
    }

    #[test]
    fn test_unclosed_quote() {
        let err = parse_err("Rule:\nName: R\nConditions:\nDESC EQUALS \"oops\n");
        assert_eq!(err.kind, RuleFileErrorKind::UnclosedQuote);
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_trailing_backslash() {
        let source = "Rule:\nName: R\nConditions:\nDESC EQUALS cafe\\\n";
        let err = parse_err(source);
        assert_eq!(err.kind, RuleFileErrorKind::TrailingBackslash);
        assert_eq!(err.line, 4);
        assert_eq!(err.span.text(source), "cafe\\");
    }

    #[test]
    fn test_non_ascii_blank_stays_inside_value() {
        let rules = parse("Rule:\nName: R\nConditions:\nDESC CONTAINS CAF\u{a0}X\n").unwrap();
        assert_eq!(
            rules.rules()[0].conditions,
            vec![Condition::new(Field::Desc, Predicate::Contains, "CAF\u{a0}X")]
        );
    }

    #[test]
    fn test_match_prefix_is_an_account_in_allocations() {
        let rules = parse("Rule:\nName: R\nAllocations:\nMatch:Account 100%\n").unwrap();
        let rule = &rules.rules()[0];
        assert_eq!(rule.match_mode, MatchMode::All);
        assert_eq!(rule.allocations, vec![Allocation::percent("Match:Account", dec!(1))]);
    }

    #[test]
    fn test_match_line_after_header_is_not_a_header() {
        let source = "Rule:\nName: R\nConditions:\nMatch: ANY x\n";
        let err = parse_err(source);
        assert_eq!(err.kind, RuleFileErrorKind::UnknownField("Match:".to_string()));
        assert_eq!(err.span.text(source), "Match:");
    }

    #[test]
    fn test_invalid_match_mode() {
        let err = parse_err("Rule:\nName: R\nMatch: SOME\n");
        assert_eq!(err.kind, RuleFileErrorKind::InvalidMatchMode("SOME".to_string()));
    }

    #[test]
    fn test_crlf_line_endings() {
        let rules = parse("Rule:\r\nName: R\r\nConditions:\r\nDESC EQUALS x\r\n").unwrap();
        assert_eq!(rules.rules()[0].name, "R");
        assert_eq!(rules.rules()[0].conditions[0].value, "x");
    }
}
