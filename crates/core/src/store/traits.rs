//! Persistence contracts consumed by the posting engine.
//!
//! Implemented by the db crate on Postgres and by [`MemoryStore`](super::MemoryStore).

use chrono::{DateTime, NaiveDate, Utc};

use khata_shared::types::{PageRequest, UserId};

use super::error::StoreError;
use crate::ledger::{InvoiceRecord, PaymentStatus, PostedTransaction, TransactionRecord, TransactionType};
use crate::sequence::NumberSpace;

/// Conjunctive filter over transactions. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Tenant key.
    pub company: Option<String>,
    /// Kind of transaction.
    pub transaction_type: Option<TransactionType>,
    /// Earliest Gregorian day, inclusive.
    pub start_date: Option<NaiveDate>,
    /// Latest Gregorian day, inclusive.
    pub end_date: Option<NaiveDate>,
}

impl TransactionFilter {
    /// Filter matching every transaction of one company.
    #[must_use]
    pub fn for_company(company: &str) -> Self {
        Self {
            company: Some(company.to_string()),
            ..Self::default()
        }
    }

    /// Returns true if the record satisfies every set criterion.
    #[must_use]
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        let day = record.date.gregorian();
        self.company.as_ref().is_none_or(|c| *c == record.company)
            && self
                .transaction_type
                .is_none_or(|t| t == record.transaction_type)
            && self.start_date.is_none_or(|start| day >= start)
            && self.end_date.is_none_or(|end| day <= end)
    }
}

/// Payment status change to apply if the stored status is still `expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status the caller read.
    pub expected: PaymentStatus,
    /// Status to write.
    pub next: PaymentStatus,
    /// Acting user, stored as `updatedBy`.
    pub updated_by: UserId,
    /// Write time.
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for transaction persistence.
pub trait TransactionStore: Send + Sync {
    /// Counts transactions matching the filter.
    fn count_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Highest sequence among stored transaction numbers in `space`, or zero.
    ///
    /// Numbers count only when [`NumberSpace::sequence_of`] accepts them.
    fn latest_transaction_sequence(
        &self,
        space: &NumberSpace,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Writes a transaction and its entries atomically.
    ///
    /// Must fail with [`StoreError::UniqueViolation`] if the transaction number
    /// is already taken, leaving nothing written.
    fn insert_transaction(
        &self,
        posted: PostedTransaction,
    ) -> impl std::future::Future<Output = Result<PostedTransaction, StoreError>> + Send;

    /// Returns one page of matching transactions, newest first (ties broken by
    /// transaction number, descending), with the total match count.
    fn find_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> impl std::future::Future<Output = Result<(Vec<TransactionRecord>, u64), StoreError>> + Send;

    /// Loads a transaction with its entries.
    fn find_transaction(
        &self,
        transaction_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<PostedTransaction>, StoreError>> + Send;

    /// Returns true if the number is taken.
    fn transaction_exists(
        &self,
        transaction_number: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;

    /// Applies a status change only if the stored status still equals
    /// `change.expected`; otherwise fails with [`StoreError::Conflict`].
    fn update_payment_status(
        &self,
        transaction_number: &str,
        change: StatusChange,
    ) -> impl std::future::Future<Output = Result<TransactionRecord, StoreError>> + Send;
}

/// Repository trait for invoice persistence.
pub trait InvoiceStore: Send + Sync {
    /// Highest sequence among stored invoice numbers in `space`, or zero.
    fn latest_invoice_sequence(
        &self,
        space: &NumberSpace,
    ) -> impl std::future::Future<Output = Result<u64, StoreError>> + Send;

    /// Writes an invoice. When it links a transaction, that transaction's
    /// entries are tagged with the invoice number in the same write.
    ///
    /// Must fail with [`StoreError::UniqueViolation`] if the number is taken.
    fn insert_invoice(
        &self,
        invoice: InvoiceRecord,
    ) -> impl std::future::Future<Output = Result<InvoiceRecord, StoreError>> + Send;

    /// Loads an invoice.
    fn find_invoice(
        &self,
        invoice_number: &str,
    ) -> impl std::future::Future<Output = Result<Option<InvoiceRecord>, StoreError>> + Send;

    /// Returns true if the number is taken.
    fn invoice_exists(
        &self,
        invoice_number: &str,
    ) -> impl std::future::Future<Output = Result<bool, StoreError>> + Send;
}
