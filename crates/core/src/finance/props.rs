//! Property-based tests for amount calculation.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{FinancialCalculator, round_money};
use super::types::{FlatRateInput, LineItemInput};

/// Amounts from 0.00 to 10,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|paisa| Decimal::new(paisa, 2))
}

/// Rates from 0.00 to 100.00 percent.
fn rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|hundredths| Decimal::new(hundredths, 2))
}

fn line_item() -> impl Strategy<Value = LineItemInput> {
    (0i64..1_000, amount(), rate(), rate()).prop_map(|(qty, rate, discount, tax)| LineItemInput {
        product: String::new(),
        qty: Decimal::from(qty),
        rate,
        discount,
        tax,
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Net equals the discounted base plus VAT minus TDS, rounded once.
    #[test]
    fn prop_net_amount_law(
        amount in amount(),
        vat_rate in rate(),
        tds_rate in rate(),
        discount_rate in rate(),
    ) {
        let input = FlatRateInput::new(amount)
            .with_vat_rate(vat_rate)
            .with_tds_rate(tds_rate)
            .with_discount_rate(discount_rate);
        let out = FinancialCalculator::flat_rate(&input).unwrap();

        let hundred = Decimal::ONE_HUNDRED;
        let after_discount = amount * (Decimal::ONE - discount_rate / hundred);
        let expected = after_discount + after_discount * vat_rate / hundred
            - after_discount * tds_rate / hundred;
        prop_assert_eq!(out.net_amount, round_money(expected));
        prop_assert!(out.net_amount.scale() <= 2);
    }

    /// Reported figures stay within a cent of each other after rounding.
    #[test]
    fn prop_rounded_components_reconcile(
        amount in amount(),
        vat_rate in rate(),
        tds_rate in rate(),
        discount_rate in rate(),
    ) {
        let input = FlatRateInput::new(amount)
            .with_vat_rate(vat_rate)
            .with_tds_rate(tds_rate)
            .with_discount_rate(discount_rate);
        let out = FinancialCalculator::flat_rate(&input).unwrap();
        let recomposed = out.subtotal - out.discount_amount + out.vat_amount - out.tds_amount;
        prop_assert!((recomposed - out.net_amount).abs() <= Decimal::new(2, 2));
    }

    /// Line-item totals equal the rounded sum of unrounded per-item amounts.
    #[test]
    fn prop_line_items_aggregate(items in prop::collection::vec(line_item(), 0..8)) {
        let out = FinancialCalculator::line_items(&items).unwrap();
        let hundred = Decimal::ONE_HUNDRED;
        let expected: Decimal = items
            .iter()
            .map(|item| {
                let gross = item.qty * item.rate;
                let discounted = gross - gross * item.discount / hundred;
                discounted + discounted * item.tax / hundred
            })
            .sum();
        prop_assert_eq!(out.net_amount, round_money(expected));
        prop_assert_eq!(out.tds_amount, Decimal::ZERO);
    }
}
