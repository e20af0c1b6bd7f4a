//! Property-based tests for ledger derivation and validation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::accounts::PostingAccounts;
use super::posting::derive_legs;
use super::transaction::TransactionType;
use super::error::LedgerError;
use super::validation::{validate_entries, validate_posting};
use crate::finance::{FinancialCalculator, FlatRateInput};

/// Strategy to generate an amount from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|paisa| Decimal::new(paisa, 2))
}

fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn transaction_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Income),
        Just(TransactionType::Expense),
        Just(TransactionType::Transfer),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Derived legs always balance for any calculator output.
    #[test]
    fn prop_derived_legs_balance(
        kind in transaction_type(),
        amount in amount(),
        vat_rate in rate(),
        tds_rate in rate(),
        discount_rate in rate(),
    ) {
        let input = FlatRateInput::new(amount)
            .with_vat_rate(vat_rate)
            .with_tds_rate(tds_rate)
            .with_discount_rate(discount_rate);
        let amounts = FinancialCalculator::flat_rate(&input).unwrap();
        let legs = derive_legs(kind, &amounts, &PostingAccounts::default());

        prop_assert!(validate_posting(amounts.net_amount, &legs).is_ok());
        prop_assert!(legs.iter().all(|leg| leg.amount > Decimal::ZERO));
    }

    /// The cash leg always carries the net amount.
    #[test]
    fn prop_cash_leg_is_net(kind in transaction_type(), amount in amount()) {
        let amounts = FinancialCalculator::flat_rate(&FlatRateInput::new(amount)).unwrap();
        let accounts = PostingAccounts::default();
        let legs = derive_legs(kind, &amounts, &accounts);
        let cash: Decimal = legs
            .iter()
            .filter(|leg| leg.account == accounts.cash)
            .map(|leg| leg.amount)
            .sum();
        prop_assert_eq!(cash, amounts.net_amount);
    }

    /// Removing any leg from a multi-leg posting unbalances it.
    #[test]
    fn prop_dropping_a_leg_unbalances(amount in 1i64..100_000_000i64, drop_index in 0usize..3) {
        let amounts = FinancialCalculator::flat_rate(&FlatRateInput::new(Decimal::new(amount, 2))).unwrap();
        let mut legs = derive_legs(TransactionType::Income, &amounts, &PostingAccounts::default());
        prop_assume!(legs.len() == 3);
        legs.remove(drop_index);

        let result = validate_entries(&legs);
        let unbalanced = matches!(result, Err(LedgerError::Unbalanced { .. } | LedgerError::SingleSided));
        prop_assert!(unbalanced, "expected imbalance, got {:?}", result);
    }
}
