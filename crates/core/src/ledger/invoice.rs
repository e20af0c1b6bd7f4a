//! Invoice records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use khata_shared::types::{InvoiceId, UserId};

use super::entry::str_enum;
use crate::calendar::DualDate;
use crate::finance::InvoiceLine;

/// Direction of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceType {
    /// Issued to a customer.
    Sales,
    /// Received from a supplier.
    Purchase,
}

str_enum!(InvoiceType { Sales => "sales", Purchase => "purchase" });

/// Where an invoice is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being prepared.
    #[default]
    Draft,
    /// Delivered to the counterparty.
    Sent,
    /// Settled.
    Paid,
    /// Past due.
    Overdue,
    /// Withdrawn.
    Cancelled,
}

str_enum!(InvoiceStatus {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

/// Counterparty details printed on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Legal or trading name.
    pub name: String,
    /// Postal address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Contact phone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Permanent Account Number issued by the Inland Revenue Department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan_number: Option<String>,
}

/// A persisted invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Unique identifier.
    pub id: InvoiceId,
    /// Unique human-readable number.
    pub invoice_number: String,
    /// Sales or purchase.
    #[serde(rename = "type")]
    pub invoice_type: InvoiceType,
    /// Lifecycle state.
    pub status: InvoiceStatus,
    /// Issue day.
    pub date: DualDate,
    /// Due day, never before `date`.
    pub due_date: DualDate,
    /// Counterparty.
    pub customer: Customer,
    /// Priced lines.
    pub line_items: Vec<InvoiceLine>,
    /// Sum of line amounts.
    pub subtotal: Decimal,
    /// Sum of line VAT.
    pub vat_total: Decimal,
    /// `subtotal + vat_total`.
    pub total: Decimal,
    /// Tenant key.
    pub company: String,
    /// Transaction this invoice reconciles with.
    pub transaction_number: Option<String>,
    /// Creating user.
    pub created_by: UserId,
    /// When the invoice was created.
    pub created_at: DateTime<Utc>,
}
