//! Transaction aggregate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{TransactionId, UserId};

use super::entry::{LedgerEntry, str_enum};
use crate::calendar::DualDate;

/// What kind of financial event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received for goods or services sold.
    Income,
    /// Money paid for goods or services bought.
    Expense,
    /// Movement between the company's own accounts.
    Transfer,
}

str_enum!(TransactionType {
    Income => "income",
    Expense => "expense",
    Transfer => "transfer",
});

/// Settlement state of a transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Settled.
    Paid,
    /// Awaiting settlement.
    #[default]
    Pending,
    /// Past due.
    Overdue,
    /// Withdrawn; terminal.
    Cancelled,
}

str_enum!(PaymentStatus {
    Paid => "paid",
    Pending => "pending",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

impl PaymentStatus {
    /// Returns true if a transaction may move from `self` to `next`.
    ///
    /// pending → paid | overdue | cancelled, overdue → paid | cancelled,
    /// paid → cancelled. Cancelled is terminal.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Paid | Self::Overdue | Self::Cancelled)
                | (Self::Overdue, Self::Paid | Self::Cancelled)
                | (Self::Paid, Self::Cancelled)
        )
    }

    /// Returns true for states that close the transaction's lifecycle.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// A persisted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Unique identifier.
    pub id: TransactionId,
    /// Unique human-readable number, immutable once assigned.
    pub transaction_number: String,
    /// Kind of event.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Net amount: discounted base plus VAT minus TDS.
    pub amount: Decimal,
    /// Derived VAT.
    pub vat_amount: Decimal,
    /// Derived TDS.
    pub tds_amount: Decimal,
    /// Derived discount.
    pub discount_amount: Decimal,
    /// Free-text narrative.
    pub description: String,
    /// Free-text category.
    pub category: String,
    /// Booking day in both calendars.
    pub date: DualDate,
    /// Settlement state.
    pub payment_status: PaymentStatus,
    /// Tenant key.
    pub company: String,
    /// Caller-supplied metadata, with priced line items when present.
    pub metadata: serde_json::Value,
    /// Owning user.
    pub created_by: UserId,
    /// Last user to change the payment status.
    pub updated_by: Option<UserId>,
    /// When the transaction was created.
    pub created_at: DateTime<Utc>,
    /// When the transaction was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A transaction together with the ledger entries derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostedTransaction {
    /// The transaction.
    #[serde(flatten)]
    pub transaction: TransactionRecord,
    /// Its ledger entries, in entry-number order.
    pub entries: Vec<LedgerEntry>,
}
