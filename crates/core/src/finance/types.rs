//! Input and output types for amount calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Standard VAT rate in Nepal, in percent.
pub const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(13, 0, 0, false, 0);

/// Flat-rate computation input: one base amount and top-level rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatRateInput {
    /// Pre-tax amount.
    pub amount: Decimal,
    /// VAT percentage applied to the discounted base.
    #[serde(default = "default_vat_rate")]
    pub vat_rate: Decimal,
    /// TDS percentage withheld from the discounted base.
    #[serde(default)]
    pub tds_rate: Decimal,
    /// Discount percentage applied to the amount first.
    #[serde(default)]
    pub discount_rate: Decimal,
}

fn default_vat_rate() -> Decimal {
    DEFAULT_VAT_RATE
}

impl FlatRateInput {
    /// Input with the default VAT rate and no TDS or discount.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            vat_rate: DEFAULT_VAT_RATE,
            tds_rate: Decimal::ZERO,
            discount_rate: Decimal::ZERO,
        }
    }

    /// Overrides the VAT rate.
    #[must_use]
    pub fn with_vat_rate(mut self, rate: Decimal) -> Self {
        self.vat_rate = rate;
        self
    }

    /// Sets the TDS rate.
    #[must_use]
    pub fn with_tds_rate(mut self, rate: Decimal) -> Self {
        self.tds_rate = rate;
        self
    }

    /// Sets the discount rate.
    #[must_use]
    pub fn with_discount_rate(mut self, rate: Decimal) -> Self {
        self.discount_rate = rate;
        self
    }
}

/// One line of a purchase or sales voucher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Product or service description.
    #[serde(default)]
    pub product: String,
    /// Quantity.
    pub qty: Decimal,
    /// Unit rate.
    pub rate: Decimal,
    /// Discount percentage on `qty * rate`.
    #[serde(default)]
    pub discount: Decimal,
    /// Tax percentage on the discounted line.
    #[serde(default)]
    pub tax: Decimal,
}

/// The two mutually exclusive ways a transaction's amounts are derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountInput {
    /// Top-level amount with discount, VAT and TDS rates.
    FlatRate(FlatRateInput),
    /// Sum over explicit line items, each carrying its own discount and tax.
    LineItems(Vec<LineItemInput>),
}

/// Derived amounts, each rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountBreakdown {
    /// Gross amount before discount.
    pub subtotal: Decimal,
    /// Total discount.
    pub discount_amount: Decimal,
    /// VAT (or line tax) total.
    pub vat_amount: Decimal,
    /// TDS withheld.
    pub tds_amount: Decimal,
    /// Net amount: discounted base plus VAT minus TDS.
    pub net_amount: Decimal,
}

/// A line item with its derived figures, as stored in transaction metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricedLineItem {
    /// Product or service description.
    pub product: String,
    /// Quantity.
    pub qty: Decimal,
    /// Unit rate.
    pub rate: Decimal,
    /// Discount percentage.
    pub discount: Decimal,
    /// Tax percentage.
    pub tax: Decimal,
    /// Line total after discount and tax, rounded for display.
    pub amount: Decimal,
}
