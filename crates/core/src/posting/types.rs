//! Request and response shapes of the posting engine.
//!
//! Inputs keep every field optional so that missing fields can be reported
//! together rather than failing on the first one.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{PageRequest, Pagination, UserId};

use crate::finance::InvoiceLineInput;
use crate::ledger::{Customer, PaymentStatus, TransactionRecord};

/// A date as sent by a client: either one Gregorian string, or an object
/// carrying either or both calendar forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// `"2023-04-14"` or an RFC 3339 instant.
    Text(String),
    /// `{"gregorian": "...", "nepali": "..."}`.
    Dual {
        /// Gregorian form.
        #[serde(default)]
        gregorian: Option<String>,
        /// Bikram Sambat form.
        #[serde(default)]
        nepali: Option<String>,
    },
}

impl DateInput {
    /// Splits into `(gregorian, bikram_sambat)` halves.
    #[must_use]
    pub fn halves(&self) -> (Option<&str>, Option<&str>) {
        match self {
            Self::Text(text) => (Some(text.as_str()), None),
            Self::Dual { gregorian, nepali } => (gregorian.as_deref(), nepali.as_deref()),
        }
    }

    /// Returns true if no half carries any text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        let (gregorian, nepali) = self.halves();
        [gregorian, nepali]
            .into_iter()
            .flatten()
            .all(|half| half.trim().is_empty())
    }
}

/// Input to `createTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionInput {
    /// Pre-tax amount. Replaced by the line-item total when items are given.
    pub amount: Option<Decimal>,
    /// `income`, `expense` or `transfer`.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Free-text narrative.
    pub description: Option<String>,
    /// Free-text category.
    pub category: Option<String>,
    /// Booking day.
    pub date: Option<DateInput>,
    /// Tenant key.
    pub company: Option<String>,
    /// Client-assigned number; generated when absent.
    pub transaction_number: Option<String>,
    /// VAT percentage, default 13.
    pub vat_rate: Option<Decimal>,
    /// TDS percentage, default 0.
    pub tds_rate: Option<Decimal>,
    /// Discount percentage, default 0.
    pub discount_rate: Option<Decimal>,
    /// Initial settlement state, default pending.
    pub payment_status: Option<PaymentStatus>,
    /// Free-form metadata; `metadata.items` switches to line-item pricing.
    pub metadata: Option<serde_json::Value>,
    /// Authenticated user, supplied by the session layer.
    #[serde(skip)]
    pub created_by: Option<UserId>,
}

/// Query of `listTransactions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsQuery {
    /// Tenant key.
    pub company: Option<String>,
    /// Kind of transaction.
    #[serde(rename = "type")]
    pub transaction_type: Option<String>,
    /// Earliest Gregorian day, inclusive.
    pub start_date: Option<String>,
    /// Latest Gregorian day, inclusive.
    pub end_date: Option<String>,
    /// Page number, default 1.
    pub page: Option<u32>,
    /// Page size, default 10, at most 100.
    pub limit: Option<u32>,
}

impl ListTransactionsQuery {
    /// Normalized page request.
    #[must_use]
    pub fn page_request(&self) -> PageRequest {
        let defaults = PageRequest::default();
        PageRequest::new(
            self.page.unwrap_or(defaults.page),
            self.limit.unwrap_or(defaults.limit),
        )
    }
}

/// One page of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionPage {
    /// Matching transactions, newest first.
    pub transactions: Vec<TransactionRecord>,
    /// Page metadata.
    pub pagination: Pagination,
}

/// Input to `createInvoice`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceInput {
    /// `sales` or `purchase`.
    #[serde(rename = "type")]
    pub invoice_type: Option<String>,
    /// Initial status, default draft.
    pub status: Option<String>,
    /// Issue day.
    pub date: Option<DateInput>,
    /// Due day.
    pub due_date: Option<DateInput>,
    /// Counterparty.
    pub customer: Option<Customer>,
    /// Lines to bill.
    pub line_items: Option<Vec<InvoiceLineInput>>,
    /// Tenant key.
    pub company: Option<String>,
    /// Client-assigned number; generated when absent.
    pub invoice_number: Option<String>,
    /// Transaction to reconcile with.
    pub transaction_number: Option<String>,
    /// Authenticated user, supplied by the session layer.
    #[serde(skip)]
    pub created_by: Option<UserId>,
}
