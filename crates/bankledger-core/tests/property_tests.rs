//! Property-based tests for the rule engine.
//!
//! Run with: cargo test -p bankledger-core --test `property_tests`

use bankledger_core::{
    Allocation, Condition, Field, MatchMode, Predicate, RenderOptions, Rule, Share, TaxMode,
    Transaction,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

// ============================================================================
// Arbitrary generators
// ============================================================================

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (1971i32..2069i32, 1u32..13u32, 1u32..29u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn arb_description() -> impl Strategy<Value = String> {
    "[A-Z0-9 *]{0,24}"
}

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (arb_date(), arb_description(), arb_amount())
        .prop_map(|(date, desc, amount)| Transaction::new("Assets:Bank", date, desc, amount))
}

fn arb_substring_predicate() -> impl Strategy<Value = Predicate> {
    prop_oneof![
        Just(Predicate::Contains),
        Just(Predicate::StartsWith),
        Just(Predicate::EndsWith),
    ]
}

fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 4))
}

// ============================================================================
// Matching
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// Substring tests on the amount never evaluate.
    #[test]
    fn prop_amount_substring_is_invalid(
        txn in arb_transaction(),
        predicate in arb_substring_predicate(),
        value in "[0-9.-]{1,6}",
    ) {
        let condition = Condition::new(Field::Amount, predicate, value);
        prop_assert!(condition.evaluate(&txn).is_err());
    }

    /// No conditions: ALL matches everything, ANY matches nothing.
    #[test]
    fn prop_empty_conditions(txn in arb_transaction()) {
        prop_assert!(Rule::new("all").matches(&txn).unwrap());
        let any = Rule::new("any").with_match_mode(MatchMode::Any);
        prop_assert!(!any.matches(&txn).unwrap());
    }

    /// A DESC EQUALS condition built from the description always matches it.
    #[test]
    fn prop_desc_equals_self(txn in arb_transaction()) {
        let rule = Rule::skeleton(&txn.description);
        prop_assert!(rule.matches(&txn).unwrap());
    }

    /// DATE comparisons agree with calendar order.
    #[test]
    fn prop_date_string_order(txn in arb_transaction(), other in arb_date()) {
        let condition = Condition::new(
            Field::Date,
            Predicate::Lt,
            other.format("%Y-%m-%d").to_string(),
        );
        prop_assert_eq!(condition.evaluate(&txn).unwrap(), txn.date < other);
    }
}

// ============================================================================
// Allocation
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// A 100% allocation without tax balances exactly.
    #[test]
    fn prop_full_allocation_balances(txn in arb_transaction()) {
        let rule = Rule::new("r").with_allocation(Allocation::percent("Expenses:X", Decimal::ONE));
        let entry = rule.render(&txn, &RenderOptions::default()).unwrap();
        prop_assert_eq!(entry.postings.len(), 2);
        prop_assert!(entry.is_balanced());
    }

    /// Splitting into a share and its complement balances to the cent.
    #[test]
    fn prop_two_way_split_balances(txn in arb_transaction(), cents in 0i64..=100i64) {
        let first = Decimal::new(cents, 2);
        let rule = Rule::new("r")
            .with_allocation(Allocation::percent("A", first))
            .with_allocation(Allocation::percent("B", Decimal::ONE - first));
        let entry = rule.render(&txn, &RenderOptions::default()).unwrap();
        prop_assert!(entry.residual().abs() <= Decimal::new(1, 2));
    }

    /// Tax never leaks: remainder and tax always add back to the allocated amount.
    #[test]
    fn prop_tax_partitions_allocation(
        amount in arb_amount(),
        share in arb_percent(),
        rate in arb_percent(),
        inclusive in any::<bool>(),
    ) {
        let options = RenderOptions {
            tax_mode: if inclusive { TaxMode::Inclusive } else { TaxMode::Exclusive },
            ..RenderOptions::default()
        };
        let alloc = Allocation::percent("A", share).with_tax("T", Share::Percent(rate));
        let split = alloc.split(amount, &options).unwrap();
        let drift = (split.remainder + split.tax - split.allocated).abs();
        prop_assert!(drift < Decimal::new(1, 20), "drift {}", drift);
    }

    /// Fixed allocations post the negated value whatever the transaction sign.
    #[test]
    fn prop_fixed_ignores_sign(amount in arb_amount(), fixed in arb_amount()) {
        let alloc = Allocation::fixed("B", fixed);
        let postings = alloc.postings(amount, &RenderOptions::default()).unwrap();
        prop_assert_eq!(postings.len(), 1);
        prop_assert_eq!(postings[0].amount, -fixed);
    }
}
