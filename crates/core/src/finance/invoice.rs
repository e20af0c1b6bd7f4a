//! Invoice line and total computation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calculator::{check_amount, check_rate, checked_money, round_money, vat};
use super::error::FinanceError;
use super::types::DEFAULT_VAT_RATE;

/// A requested invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineInput {
    /// What is being billed.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit, before VAT.
    pub unit_price: Decimal,
    /// VAT percentage, 13 when omitted.
    #[serde(default)]
    pub vat_rate: Option<Decimal>,
}

/// An invoice line with derived amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// What is being billed.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit, before VAT.
    pub unit_price: Decimal,
    /// `quantity * unit_price`, rounded.
    pub amount: Decimal,
    /// VAT percentage applied.
    pub vat_rate: Decimal,
    /// VAT on the line, rounded.
    pub vat_amount: Decimal,
}

/// Invoice lines with their aggregate totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    /// Priced lines, in input order.
    pub lines: Vec<InvoiceLine>,
    /// Sum of line amounts.
    pub subtotal: Decimal,
    /// Sum of line VAT.
    pub vat_total: Decimal,
    /// `subtotal + vat_total`.
    pub total: Decimal,
}

/// Prices every line and totals the invoice; totals are summed unrounded.
///
/// # Errors
///
/// Returns an error for negative or oversized quantities and prices, and for
/// VAT rates outside 0..=100. A line amount or total that would not fit a
/// money column is `AmountTooLarge`.
pub fn invoice_totals(items: &[InvoiceLineInput]) -> Result<InvoiceTotals, FinanceError> {
    let mut subtotal = Decimal::ZERO;
    let mut vat_total = Decimal::ZERO;
    let mut lines = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let rate = item.vat_rate.unwrap_or(DEFAULT_VAT_RATE);
        check_amount(&format!("lineItems[{index}].quantity"), item.quantity)?;
        check_amount(&format!("lineItems[{index}].unitPrice"), item.unit_price)?;
        check_rate(&format!("lineItems[{index}].vatRate"), rate)?;

        let amount = checked_money(
            &format!("lineItems[{index}].amount"),
            item.quantity.checked_mul(item.unit_price),
        )?;
        let line_vat = vat(amount, rate);
        subtotal = checked_money("subtotal", subtotal.checked_add(amount))?;
        vat_total = checked_money("vatTotal", vat_total.checked_add(line_vat))?;

        lines.push(InvoiceLine {
            description: item.description.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
            amount: round_money(amount),
            vat_rate: rate,
            vat_amount: round_money(line_vat),
        });
    }

    let total = checked_money("total", subtotal.checked_add(vat_total))?;

    Ok(InvoiceTotals {
        lines,
        subtotal: round_money(subtotal),
        vat_total: round_money(vat_total),
        total: round_money(total),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal, vat_rate: Option<Decimal>) -> InvoiceLineInput {
        InvoiceLineInput {
            description: "Consulting".to_string(),
            quantity,
            unit_price,
            vat_rate,
        }
    }

    #[test]
    fn test_default_rate_and_totals() {
        let totals = invoice_totals(&[
            line(dec!(2), dec!(500), None),
            line(dec!(1), dec!(1000), Some(dec!(0))),
        ])
        .unwrap();

        assert_eq!(totals.lines[0].amount, dec!(1000));
        assert_eq!(totals.lines[0].vat_rate, dec!(13));
        assert_eq!(totals.lines[0].vat_amount, dec!(130));
        assert_eq!(totals.lines[1].vat_amount, dec!(0));
        assert_eq!(totals.subtotal, dec!(2000));
        assert_eq!(totals.vat_total, dec!(130));
        assert_eq!(totals.total, dec!(2130));
    }

    #[test]
    fn test_empty_invoice_is_zero() {
        let totals = invoice_totals(&[]).unwrap();
        assert_eq!(totals.total, Decimal::ZERO);
        assert!(totals.lines.is_empty());
    }

    #[test]
    fn test_rejects_bad_lines() {
        let err = invoice_totals(&[line(dec!(-1), dec!(10), None)]).unwrap_err();
        assert_eq!(err.field(), "lineItems[0].quantity");

        let err = invoice_totals(&[line(dec!(1), dec!(10), Some(dec!(101)))]).unwrap_err();
        assert_eq!(err.field(), "lineItems[0].vatRate");
    }

    #[test]
    fn test_oversized_lines_rejected_not_panicking() {
        let max = crate::finance::MAX_AMOUNT;
        let items = vec![line(max, max, None); 100_000];
        let err = invoice_totals(&items).unwrap_err();
        assert!(matches!(err, FinanceError::AmountTooLarge { .. }));
        assert_eq!(err.field(), "lineItems[0].amount");

        // 9e15 fits a column, its VAT pushes the total past it
        let err = invoice_totals(&[line(dec!(9000), max, None)]).unwrap_err();
        assert_eq!(err.field(), "total");

        let err = invoice_totals(&vec![line(dec!(1000), max, Some(dec!(0))); 10]).unwrap_err();
        assert_eq!(err.field(), "subtotal");
    }

    #[test]
    fn test_deserializes_camel_case() {
        let input: InvoiceLineInput = serde_json::from_value(serde_json::json!({
            "description": "Tea",
            "quantity": 3,
            "unitPrice": "45.50"
        }))
        .unwrap();
        assert_eq!(input.unit_price, dec!(45.50));
        assert_eq!(input.vat_rate, None);
    }
}
