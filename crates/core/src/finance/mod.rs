//! Money calculations: VAT, TDS, discounts, invoice totals and NPR display.

pub mod calculator;
pub mod error;
pub mod invoice;
pub mod npr;
pub mod types;

#[cfg(test)]
mod props;

pub use calculator::{
    FinancialCalculator, MAX_AMOUNT, MAX_STORED_AMOUNT, MONEY_SCALE, round_money,
};
pub use error::FinanceError;
pub use invoice::{InvoiceLine, InvoiceLineInput, InvoiceTotals, invoice_totals};
pub use npr::{NprStyle, format_npr};
pub use types::{
    AmountBreakdown, AmountInput, DEFAULT_VAT_RATE, FlatRateInput, LineItemInput, PricedLineItem,
};
