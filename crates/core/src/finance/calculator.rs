//! VAT, TDS and discount calculations.
//!
//! Every intermediate value is kept at full precision; only the reported
//! figures are rounded, half away from zero, to two decimals.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::FinanceError;
use super::types::{AmountBreakdown, AmountInput, FlatRateInput, LineItemInput, PricedLineItem};

/// Decimal places kept for money.
pub const MONEY_SCALE: u32 = 2;

/// Largest amount, quantity, or unit rate accepted (one trillion).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest derived figure a stored money column holds: `NUMERIC(18, 2)`,
/// i.e. 9 999 999 999 999 999.99.
pub const MAX_STORED_AMOUNT: Decimal =
    Decimal::from_parts(2_808_348_671, 232_830_643, 0, false, 2);

/// Rounds to two decimals, half away from zero.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `amount * rate / 100`, unrounded.
#[must_use]
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}

/// VAT on `amount` at `rate` percent.
#[must_use]
pub fn vat(amount: Decimal, rate: Decimal) -> Decimal {
    percent_of(amount, rate)
}

/// TDS on `amount` at `rate` percent.
#[must_use]
pub fn tds(amount: Decimal, rate: Decimal) -> Decimal {
    percent_of(amount, rate)
}

/// Discount on `amount` at `rate` percent.
#[must_use]
pub fn discount(amount: Decimal, rate: Decimal) -> Decimal {
    percent_of(amount, rate)
}

pub(crate) fn check_amount(field: &str, value: Decimal) -> Result<(), FinanceError> {
    if value < Decimal::ZERO {
        return Err(FinanceError::NegativeAmount {
            field: field.to_string(),
        });
    }
    if value > MAX_AMOUNT {
        return Err(FinanceError::AmountTooLarge {
            field: field.to_string(),
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// Accepts a derived figure only if it exists and still fits a money column
/// once rounded. `None` is an overflowed `checked_*` result.
pub(crate) fn checked_money(field: &str, value: Option<Decimal>) -> Result<Decimal, FinanceError> {
    match value {
        Some(value) if round_money(value).abs() <= MAX_STORED_AMOUNT => Ok(value),
        _ => Err(FinanceError::AmountTooLarge {
            field: field.to_string(),
            max: MAX_STORED_AMOUNT,
        }),
    }
}

pub(crate) fn check_rate(field: &str, value: Decimal) -> Result<(), FinanceError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(FinanceError::RateOutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Unrounded figures for one line item.
struct LineFigures {
    gross: Decimal,
    discount: Decimal,
    tax: Decimal,
}

impl LineFigures {
    fn of(index: usize, item: &LineItemInput) -> Result<Self, FinanceError> {
        let field = format!("items[{index}].amount");
        let gross = checked_money(&field, item.qty.checked_mul(item.rate))?;
        let discount = percent_of(gross, item.discount);
        let tax = percent_of(gross - discount, item.tax);
        let figures = Self {
            gross,
            discount,
            tax,
        };
        checked_money(&field, Some(figures.amount()))?;
        Ok(figures)
    }

    fn amount(&self) -> Decimal {
        self.gross - self.discount + self.tax
    }
}

/// Pure amount calculator.
pub struct FinancialCalculator;

impl FinancialCalculator {
    /// Computes the breakdown for either input shape.
    ///
    /// # Errors
    ///
    /// Returns an error if any amount is negative or too large, or any rate is
    /// outside 0..=100.
    pub fn compute(input: &AmountInput) -> Result<AmountBreakdown, FinanceError> {
        match input {
            AmountInput::FlatRate(flat) => Self::flat_rate(flat),
            AmountInput::LineItems(items) => Self::line_items(items),
        }
    }

    /// Flat-rate pipeline: discount first, then VAT and TDS on the discounted base.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use khata_core::finance::{FinancialCalculator, FlatRateInput};
    ///
    /// let out = FinancialCalculator::flat_rate(&FlatRateInput::new(dec!(1000))).unwrap();
    /// assert_eq!(out.vat_amount, dec!(130.00));
    /// assert_eq!(out.net_amount, dec!(1130.00));
    /// ```
    pub fn flat_rate(input: &FlatRateInput) -> Result<AmountBreakdown, FinanceError> {
        check_amount("amount", input.amount)?;
        check_rate("discountRate", input.discount_rate)?;
        check_rate("vatRate", input.vat_rate)?;
        check_rate("tdsRate", input.tds_rate)?;

        let discount_amount = discount(input.amount, input.discount_rate);
        let after_discount = input.amount - discount_amount;
        let vat_amount = vat(after_discount, input.vat_rate);
        let tds_amount = tds(after_discount, input.tds_rate);
        let net_amount = after_discount + vat_amount - tds_amount;

        Ok(AmountBreakdown {
            subtotal: round_money(input.amount),
            discount_amount: round_money(discount_amount),
            vat_amount: round_money(vat_amount),
            tds_amount: round_money(tds_amount),
            net_amount: round_money(net_amount),
        })
    }

    /// Line-item aggregation: totals are summed over items at full precision.
    ///
    /// TDS does not apply on this path.
    ///
    /// # Errors
    ///
    /// Returns an error for out-of-range items, and `AmountTooLarge` when a
    /// line or any total no longer fits a money column.
    pub fn line_items(items: &[LineItemInput]) -> Result<AmountBreakdown, FinanceError> {
        let mut gross = Decimal::ZERO;
        let mut discount_total = Decimal::ZERO;
        let mut tax_total = Decimal::ZERO;

        for (index, item) in items.iter().enumerate() {
            Self::check_item(index, item)?;
            let figures = LineFigures::of(index, item)?;
            gross = checked_money("subtotal", gross.checked_add(figures.gross))?;
            discount_total =
                checked_money("discountAmount", discount_total.checked_add(figures.discount))?;
            tax_total = checked_money("vatAmount", tax_total.checked_add(figures.tax))?;
        }

        let net = gross
            .checked_sub(discount_total)
            .and_then(|base| base.checked_add(tax_total));
        let net = checked_money("netAmount", net)?;

        Ok(AmountBreakdown {
            subtotal: round_money(gross),
            discount_amount: round_money(discount_total),
            vat_amount: round_money(tax_total),
            tds_amount: Decimal::ZERO,
            net_amount: round_money(net),
        })
    }

    /// Validates the items and attaches each one's rounded display amount.
    ///
    /// # Errors
    ///
    /// Same per-item checks as [`Self::line_items`].
    pub fn price_items(items: &[LineItemInput]) -> Result<Vec<PricedLineItem>, FinanceError> {
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                Self::check_item(index, item)?;
                let figures = LineFigures::of(index, item)?;
                Ok(PricedLineItem {
                    product: item.product.clone(),
                    qty: item.qty,
                    rate: item.rate,
                    discount: item.discount,
                    tax: item.tax,
                    amount: round_money(figures.amount()),
                })
            })
            .collect()
    }

    fn check_item(index: usize, item: &LineItemInput) -> Result<(), FinanceError> {
        check_amount(&format!("items[{index}].qty"), item.qty)?;
        check_amount(&format!("items[{index}].rate"), item.rate)?;
        check_rate(&format!("items[{index}].discount"), item.discount)?;
        check_rate(&format!("items[{index}].tax"), item.tax)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn item(qty: Decimal, rate: Decimal, discount: Decimal, tax: Decimal) -> LineItemInput {
        LineItemInput {
            product: "Rice".to_string(),
            qty,
            rate,
            discount,
            tax,
        }
    }

    #[test]
    fn test_max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, dec!(1_000_000_000_000));
    }

    #[test]
    fn test_default_vat() {
        let out = FinancialCalculator::flat_rate(&FlatRateInput::new(dec!(1000))).unwrap();
        assert_eq!(out.vat_amount, dec!(130.00));
        assert_eq!(out.net_amount, dec!(1130.00));
        assert_eq!(out.tds_amount, dec!(0));
        assert_eq!(out.discount_amount, dec!(0));
        assert_eq!(out.subtotal, dec!(1000));
    }

    #[rstest]
    // discount 10%: base 900, VAT 117, TDS 1.5% = 13.5 → 1003.5
    #[case(dec!(1000), dec!(13), dec!(1.5), dec!(10), dec!(117.00), dec!(13.50), dec!(1003.50))]
    // zero VAT
    #[case(dec!(500), dec!(0), dec!(0), dec!(0), dec!(0), dec!(0), dec!(500))]
    // TDS only
    #[case(dec!(10000), dec!(0), dec!(15), dec!(0), dec!(0), dec!(1500), dec!(8500))]
    // half-cent VAT rounds up: 0.05 * 13% = 0.0065 → 0.01
    #[case(dec!(0.05), dec!(13), dec!(0), dec!(0), dec!(0.01), dec!(0), dec!(0.06))]
    fn test_flat_rate_cases(
        #[case] amount: Decimal,
        #[case] vat_rate: Decimal,
        #[case] tds_rate: Decimal,
        #[case] discount_rate: Decimal,
        #[case] expected_vat: Decimal,
        #[case] expected_tds: Decimal,
        #[case] expected_net: Decimal,
    ) {
        let input = FlatRateInput::new(amount)
            .with_vat_rate(vat_rate)
            .with_tds_rate(tds_rate)
            .with_discount_rate(discount_rate);
        let out = FinancialCalculator::flat_rate(&input).unwrap();
        assert_eq!(out.vat_amount, expected_vat);
        assert_eq!(out.tds_amount, expected_tds);
        assert_eq!(out.net_amount, expected_net);
    }

    #[test]
    fn test_vat_is_on_discounted_base() {
        let input = FlatRateInput::new(dec!(200)).with_discount_rate(dec!(50));
        let out = FinancialCalculator::flat_rate(&input).unwrap();
        // 13% of 100, not of 200
        assert_eq!(out.vat_amount, dec!(13.00));
        assert_eq!(out.discount_amount, dec!(100.00));
        assert_eq!(out.net_amount, dec!(113.00));
    }

    #[test]
    fn test_rounding_happens_once() {
        // 0.333.. discount on 1.00 leaves 0.6666..; VAT 13% = 0.08666..
        // Net from full precision = 0.75333.. → 0.75
        let input = FlatRateInput::new(dec!(1.00)).with_discount_rate(dec!(33.3333333333));
        let out = FinancialCalculator::flat_rate(&input).unwrap();
        assert_eq!(out.net_amount, dec!(0.75));
    }

    #[test]
    fn test_flat_rate_rejects_bad_input() {
        let negative = FlatRateInput::new(dec!(-1));
        assert!(matches!(
            FinancialCalculator::flat_rate(&negative),
            Err(FinanceError::NegativeAmount { .. })
        ));

        let high_vat = FlatRateInput::new(dec!(1)).with_vat_rate(dec!(100.01));
        assert!(matches!(
            FinancialCalculator::flat_rate(&high_vat),
            Err(FinanceError::RateOutOfRange { field, .. }) if field == "vatRate"
        ));

        let negative_tds = FlatRateInput::new(dec!(1)).with_tds_rate(dec!(-1));
        assert!(FinancialCalculator::flat_rate(&negative_tds).is_err());

        let huge = FlatRateInput::new(MAX_AMOUNT + dec!(1));
        assert!(matches!(
            FinancialCalculator::flat_rate(&huge),
            Err(FinanceError::AmountTooLarge { .. })
        ));
    }

    #[test]
    fn test_single_line_item() {
        let items = vec![item(dec!(2), dec!(100), dec!(10), dec!(13))];
        let out = FinancialCalculator::line_items(&items).unwrap();
        assert_eq!(out.subtotal, dec!(200));
        assert_eq!(out.discount_amount, dec!(20));
        assert_eq!(out.vat_amount, dec!(23.40));
        assert_eq!(out.net_amount, dec!(203.40));
        assert_eq!(out.tds_amount, dec!(0));
    }

    #[test]
    fn test_line_items_sum_before_rounding() {
        // Each line is 0.015 and displays as 0.02. Summed unrounded the
        // three lines net 0.045, which rounds to 0.05 rather than 0.06.
        let items = vec![
            item(dec!(1), dec!(0.01), dec!(0), dec!(50)),
            item(dec!(1), dec!(0.01), dec!(0), dec!(50)),
            item(dec!(1), dec!(0.01), dec!(0), dec!(50)),
        ];
        let out = FinancialCalculator::line_items(&items).unwrap();
        assert_eq!(out.vat_amount, dec!(0.02));
        assert_eq!(out.net_amount, dec!(0.05));

        let priced = FinancialCalculator::price_items(&items).unwrap();
        assert!(priced.iter().all(|p| p.amount == dec!(0.02)));
    }

    #[test]
    fn test_line_item_errors_name_index() {
        let items = vec![
            item(dec!(1), dec!(1), dec!(0), dec!(13)),
            item(dec!(1), dec!(1), dec!(120), dec!(13)),
        ];
        let err = FinancialCalculator::line_items(&items).unwrap_err();
        assert_eq!(err.field(), "items[1].discount");
    }

    #[test]
    fn test_max_stored_amount_matches_money_column() {
        assert_eq!(MAX_STORED_AMOUNT, dec!(9_999_999_999_999_999.99));
    }

    #[test]
    fn test_huge_line_items_rejected_not_panicking() {
        // Each line is 1e24, far past both a money column and the point
        // where a long enough list would overflow Decimal itself.
        let items = vec![item(MAX_AMOUNT, MAX_AMOUNT, dec!(0), dec!(0)); 100_000];

        let err = FinancialCalculator::line_items(&items).unwrap_err();
        assert_eq!(
            err,
            FinanceError::AmountTooLarge {
                field: "items[0].amount".to_string(),
                max: MAX_STORED_AMOUNT,
            }
        );
        assert!(FinancialCalculator::price_items(&items).is_err());
    }

    #[rstest]
    // ten lines of 1e15 each fit alone but not summed
    #[case(vec![item(dec!(1000), MAX_AMOUNT, dec!(0), dec!(0)); 10], "subtotal")]
    // 9e15 fits as gross; 13% tax pushes the line past the column
    #[case(vec![item(dec!(9000), MAX_AMOUNT, dec!(0), dec!(13))], "items[0].amount")]
    // two lines whose gross fits but whose taxed net does not
    #[case(vec![item(dec!(4500), MAX_AMOUNT, dec!(0), dec!(13)); 2], "netAmount")]
    fn test_line_totals_bounded_by_money_column(
        #[case] items: Vec<LineItemInput>,
        #[case] field: &str,
    ) {
        let err = FinancialCalculator::line_items(&items).unwrap_err();
        assert!(matches!(err, FinanceError::AmountTooLarge { .. }));
        assert_eq!(err.field(), field);
    }

    #[test]
    fn test_line_total_at_column_limit_accepted() {
        let items = vec![item(dec!(9999.99999999999999), MAX_AMOUNT, dec!(0), dec!(0))];
        let out = FinancialCalculator::line_items(&items).unwrap();
        assert_eq!(out.net_amount, MAX_STORED_AMOUNT);
    }

    #[test]
    fn test_compute_dispatches() {
        let flat = AmountInput::FlatRate(FlatRateInput::new(dec!(1000)));
        let lines = AmountInput::LineItems(vec![item(dec!(2), dec!(100), dec!(10), dec!(13))]);
        assert_eq!(
            FinancialCalculator::compute(&flat).unwrap().net_amount,
            dec!(1130.00)
        );
        assert_eq!(
            FinancialCalculator::compute(&lines).unwrap().net_amount,
            dec!(203.40)
        );
    }
}
