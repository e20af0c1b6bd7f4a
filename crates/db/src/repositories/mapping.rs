//! Conversions between `SeaORM` models and core domain records.

use std::fmt::Display;
use std::str::FromStr;

use chrono::Utc;
use sea_orm::{DbErr, Set, SqlErr};

use khata_core::calendar::DualDate;
use khata_core::ledger::{InvoiceRecord, LedgerEntry, TransactionRecord};
use khata_core::store::StoreError;
use khata_shared::types::{InvoiceId, LedgerEntryId, TransactionId, UserId};

use crate::entities::{invoices, ledger_entries, transactions};

/// Maps a database error onto the store taxonomy.
pub(crate) fn store_error(err: DbErr) -> StoreError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
        _ => StoreError::Backend(err.to_string()),
    }
}

fn corrupt(column: &str, detail: impl Display) -> StoreError {
    StoreError::Backend(format!("invalid {column} in stored row: {detail}"))
}

fn parse<T>(column: &str, raw: &str) -> Result<T, StoreError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.parse().map_err(|e| corrupt(column, e))
}

fn dual_date(column: &str, gregorian: chrono::NaiveDate) -> Result<DualDate, StoreError> {
    DualDate::from_gregorian(gregorian).map_err(|e| corrupt(column, e))
}

// ========== Transactions ==========

pub(crate) fn transaction_active(record: &TransactionRecord) -> transactions::ActiveModel {
    transactions::ActiveModel {
        id: Set(record.id.into_inner()),
        transaction_number: Set(record.transaction_number.clone()),
        transaction_type: Set(record.transaction_type.as_str().to_string()),
        amount: Set(record.amount),
        vat_amount: Set(record.vat_amount),
        tds_amount: Set(record.tds_amount),
        discount_amount: Set(record.discount_amount),
        description: Set(record.description.clone()),
        category: Set(record.category.clone()),
        date_gregorian: Set(record.date.gregorian()),
        date_nepali: Set(record.date.bikram_sambat().to_string()),
        payment_status: Set(record.payment_status.as_str().to_string()),
        company: Set(record.company.clone()),
        metadata: Set(record.metadata.clone()),
        created_by: Set(record.created_by.into_inner()),
        updated_by: Set(record.updated_by.map(UserId::into_inner)),
        created_at: Set(record.created_at.into()),
        updated_at: Set(record.updated_at.into()),
    }
}

pub(crate) fn transaction_record(model: transactions::Model) -> Result<TransactionRecord, StoreError> {
    Ok(TransactionRecord {
        id: TransactionId::from_uuid(model.id),
        transaction_type: parse("transaction_type", &model.transaction_type)?,
        payment_status: parse("payment_status", &model.payment_status)?,
        date: dual_date("date_gregorian", model.date_gregorian)?,
        transaction_number: model.transaction_number,
        amount: model.amount,
        vat_amount: model.vat_amount,
        tds_amount: model.tds_amount,
        discount_amount: model.discount_amount,
        description: model.description,
        category: model.category,
        company: model.company,
        metadata: model.metadata,
        created_by: UserId::from_uuid(model.created_by),
        updated_by: model.updated_by.map(UserId::from_uuid),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

// ========== Ledger entries ==========

pub(crate) fn entry_active(entry: &LedgerEntry) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        id: Set(entry.id.into_inner()),
        entry_number: Set(entry.entry_number.clone()),
        date_gregorian: Set(entry.date.gregorian()),
        date_nepali: Set(entry.date.bikram_sambat().to_string()),
        account_code: Set(entry.account_code.clone()),
        account_type: Set(entry.account_type.as_str().to_string()),
        entry_type: Set(entry.entry_type.as_str().to_string()),
        amount: Set(entry.amount),
        description: Set(entry.description.clone()),
        company: Set(entry.company.clone()),
        transaction_number: Set(entry.transaction_number.clone()),
        invoice_number: Set(entry.invoice_number.clone()),
        created_by: Set(entry.created_by.into_inner()),
        created_at: Set(entry.created_at.into()),
    }
}

pub(crate) fn ledger_entry(model: ledger_entries::Model) -> Result<LedgerEntry, StoreError> {
    Ok(LedgerEntry {
        id: LedgerEntryId::from_uuid(model.id),
        account_type: parse("account_type", &model.account_type)?,
        entry_type: parse("entry_type", &model.entry_type)?,
        date: dual_date("date_gregorian", model.date_gregorian)?,
        entry_number: model.entry_number,
        account_code: model.account_code,
        amount: model.amount,
        description: model.description,
        company: model.company,
        transaction_number: model.transaction_number,
        invoice_number: model.invoice_number,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

// ========== Invoices ==========

pub(crate) fn invoice_active(invoice: &InvoiceRecord) -> Result<invoices::ActiveModel, StoreError> {
    let customer = serde_json::to_value(&invoice.customer).map_err(|e| corrupt("customer", e))?;
    let line_items =
        serde_json::to_value(&invoice.line_items).map_err(|e| corrupt("line_items", e))?;

    Ok(invoices::ActiveModel {
        id: Set(invoice.id.into_inner()),
        invoice_number: Set(invoice.invoice_number.clone()),
        invoice_type: Set(invoice.invoice_type.as_str().to_string()),
        status: Set(invoice.status.as_str().to_string()),
        date_gregorian: Set(invoice.date.gregorian()),
        date_nepali: Set(invoice.date.bikram_sambat().to_string()),
        due_date_gregorian: Set(invoice.due_date.gregorian()),
        due_date_nepali: Set(invoice.due_date.bikram_sambat().to_string()),
        customer: Set(customer),
        line_items: Set(line_items),
        subtotal: Set(invoice.subtotal),
        vat_total: Set(invoice.vat_total),
        total: Set(invoice.total),
        company: Set(invoice.company.clone()),
        transaction_number: Set(invoice.transaction_number.clone()),
        created_by: Set(invoice.created_by.into_inner()),
        created_at: Set(invoice.created_at.into()),
    })
}

pub(crate) fn invoice_record(model: invoices::Model) -> Result<InvoiceRecord, StoreError> {
    Ok(InvoiceRecord {
        id: InvoiceId::from_uuid(model.id),
        invoice_type: parse("invoice_type", &model.invoice_type)?,
        status: parse("status", &model.status)?,
        date: dual_date("date_gregorian", model.date_gregorian)?,
        due_date: dual_date("due_date_gregorian", model.due_date_gregorian)?,
        customer: serde_json::from_value(model.customer).map_err(|e| corrupt("customer", e))?,
        line_items: serde_json::from_value(model.line_items)
            .map_err(|e| corrupt("line_items", e))?,
        invoice_number: model.invoice_number,
        subtotal: model.subtotal,
        vat_total: model.vat_total,
        total: model.total,
        company: model.company,
        transaction_number: model.transaction_number,
        created_by: UserId::from_uuid(model.created_by),
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use khata_core::ledger::{PaymentStatus, TransactionType};

    fn model() -> transactions::Model {
        let now = Utc::now();
        transactions::Model {
            id: uuid::Uuid::now_v7(),
            transaction_number: "TRX-ACM-000001".to_string(),
            transaction_type: "income".to_string(),
            amount: dec!(1130.00),
            vat_amount: dec!(130.00),
            tds_amount: dec!(0),
            discount_amount: dec!(0),
            description: "Consulting".to_string(),
            category: "Services".to_string(),
            date_gregorian: NaiveDate::from_ymd_opt(2023, 4, 14).unwrap(),
            date_nepali: "2080-01-01".to_string(),
            payment_status: "pending".to_string(),
            company: "Acme".to_string(),
            metadata: json!({}),
            created_by: uuid::Uuid::now_v7(),
            updated_by: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn test_transaction_row_converts() {
        let record = transaction_record(model()).unwrap();
        assert_eq!(record.transaction_type, TransactionType::Income);
        assert_eq!(record.payment_status, PaymentStatus::Pending);
        assert_eq!(record.date.bikram_sambat().to_string(), "2080-01-01");
    }

    #[test]
    fn test_unknown_status_is_backend_error() {
        let row = transactions::Model {
            payment_status: "settled".to_string(),
            ..model()
        };
        assert!(matches!(transaction_record(row), Err(StoreError::Backend(_))));
    }

    #[test]
    fn test_non_unique_db_error_is_backend() {
        let err = store_error(DbErr::RecordNotInserted);
        assert!(matches!(err, StoreError::Backend(_)));
    }
}
