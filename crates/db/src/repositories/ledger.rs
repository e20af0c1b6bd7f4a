//! PostgreSQL-backed ledger store.
//!
//! A transaction and its entries are written in one database transaction;
//! the unique constraint on `transaction_number` is the final arbiter of
//! number allocation races.

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, TransactionTrait,
};

use tracing::warn;

use khata_core::ledger::{InvoiceRecord, PostedTransaction, TransactionRecord};
use khata_core::sequence::{MAX_SEQUENCE_DIGITS, NumberSpace, SEQUENCE_WIDTH};
use khata_core::store::{
    InvoiceStore, StatusChange, StoreError, TransactionFilter, TransactionStore,
};
use khata_shared::types::PageRequest;

use super::mapping::{
    entry_active, invoice_active, invoice_record, ledger_entry, store_error, transaction_active,
    transaction_record,
};
use crate::entities::{invoices, ledger_entries, transactions};

/// Ledger repository implementing the core store traits.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn filtered(filter: &TransactionFilter) -> Select<transactions::Entity> {
        let mut query = transactions::Entity::find();

        if let Some(company) = &filter.company {
            query = query.filter(transactions::Column::Company.eq(company.as_str()));
        }

        if let Some(tx_type) = filter.transaction_type {
            query = query.filter(transactions::Column::TransactionType.eq(tx_type.as_str()));
        }

        if let Some(start) = filter.start_date {
            query = query.filter(transactions::Column::DateGregorian.gte(start));
        }

        if let Some(end) = filter.end_date {
            query = query.filter(transactions::Column::DateGregorian.lte(end));
        }

        query
    }

    /// `MAX(sequence)` and the tail test over a number column for `space`.
    ///
    /// Only the substring offset is spliced into the SQL; it is derived from
    /// the lead's length, never from input text.
    fn sequence_exprs(column: &str, space: &NumberSpace) -> (SimpleExpr, SimpleExpr) {
        let from = space.lead().chars().count() + 1;
        let tail = format!("SUBSTRING({column} FROM {from})");
        (
            Expr::cust(format!("MAX(CAST({tail} AS BIGINT))")),
            Expr::cust(format!(
                "{tail} ~ '^[0-9]{{{SEQUENCE_WIDTH},{MAX_SEQUENCE_DIGITS}}}$'"
            )),
        )
    }

    fn as_sequence(highest: Option<Option<i64>>) -> Result<u64, StoreError> {
        let highest = highest.flatten().unwrap_or(0);
        u64::try_from(highest)
            .map_err(|_| StoreError::Backend(format!("negative sequence {highest} in stored number")))
    }

    async fn load_transaction(
        &self,
        transaction_number: &str,
    ) -> Result<Option<transactions::Model>, StoreError> {
        transactions::Entity::find()
            .filter(transactions::Column::TransactionNumber.eq(transaction_number))
            .one(&self.db)
            .await
            .map_err(store_error)
    }
}

impl TransactionStore for LedgerRepository {
    async fn count_transactions(&self, filter: &TransactionFilter) -> Result<u64, StoreError> {
        Self::filtered(filter)
            .count(&self.db)
            .await
            .map_err(store_error)
    }

    async fn latest_transaction_sequence(&self, space: &NumberSpace) -> Result<u64, StoreError> {
        let (max_sequence, is_sequence) = Self::sequence_exprs("transaction_number", space);
        let highest = transactions::Entity::find()
            .select_only()
            .column_as(max_sequence, "max_sequence")
            .filter(transactions::Column::TransactionNumber.starts_with(space.lead()))
            .filter(is_sequence)
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Self::as_sequence(highest)
    }

    async fn insert_transaction(
        &self,
        posted: PostedTransaction,
    ) -> Result<PostedTransaction, StoreError> {
        let txn = self.db.begin().await.map_err(store_error)?;

        transaction_active(&posted.transaction)
            .insert(&txn)
            .await
            .map_err(store_error)?;

        if !posted.entries.is_empty() {
            ledger_entries::Entity::insert_many(posted.entries.iter().map(entry_active))
                .exec(&txn)
                .await
                .map_err(store_error)?;
        }

        // Balance trigger is deferred, so an imbalance surfaces here.
        txn.commit().await.map_err(store_error)?;

        Ok(posted)
    }

    async fn find_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError> {
        let total = self.count_transactions(filter).await?;

        let rows = Self::filtered(filter)
            .order_by_desc(transactions::Column::DateGregorian)
            .order_by_desc(transactions::Column::TransactionNumber)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(store_error)?;

        let records = rows
            .into_iter()
            .map(transaction_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((records, total))
    }

    async fn find_transaction(
        &self,
        transaction_number: &str,
    ) -> Result<Option<PostedTransaction>, StoreError> {
        let Some(model) = self.load_transaction(transaction_number).await? else {
            return Ok(None);
        };

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionNumber.eq(transaction_number))
            .order_by_asc(ledger_entries::Column::EntryNumber)
            .all(&self.db)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(ledger_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(PostedTransaction {
            transaction: transaction_record(model)?,
            entries,
        }))
    }

    async fn transaction_exists(&self, transaction_number: &str) -> Result<bool, StoreError> {
        let count = transactions::Entity::find()
            .filter(transactions::Column::TransactionNumber.eq(transaction_number))
            .count(&self.db)
            .await
            .map_err(store_error)?;
        Ok(count > 0)
    }

    async fn update_payment_status(
        &self,
        transaction_number: &str,
        change: StatusChange,
    ) -> Result<TransactionRecord, StoreError> {
        let result = transactions::Entity::update_many()
            .col_expr(
                transactions::Column::PaymentStatus,
                Expr::value(change.next.as_str()),
            )
            .col_expr(
                transactions::Column::UpdatedBy,
                Expr::value(change.updated_by.into_inner()),
            )
            .col_expr(
                transactions::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(change.updated_at)),
            )
            .filter(transactions::Column::TransactionNumber.eq(transaction_number))
            .filter(transactions::Column::PaymentStatus.eq(change.expected.as_str()))
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        let model = self
            .load_transaction(transaction_number)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Transaction {transaction_number}")))?;

        if result.rows_affected == 0 {
            warn!(
                transaction_number,
                expected = %change.expected,
                found = %model.payment_status,
                "payment status changed concurrently"
            );
            return Err(StoreError::Conflict(format!(
                "transaction {transaction_number} is now {}, expected {}",
                model.payment_status, change.expected
            )));
        }

        transaction_record(model)
    }
}

impl InvoiceStore for LedgerRepository {
    async fn latest_invoice_sequence(&self, space: &NumberSpace) -> Result<u64, StoreError> {
        let (max_sequence, is_sequence) = Self::sequence_exprs("invoice_number", space);
        let highest = invoices::Entity::find()
            .select_only()
            .column_as(max_sequence, "max_sequence")
            .filter(invoices::Column::InvoiceNumber.starts_with(space.lead()))
            .filter(is_sequence)
            .into_tuple::<Option<i64>>()
            .one(&self.db)
            .await
            .map_err(store_error)?;
        Self::as_sequence(highest)
    }

    async fn insert_invoice(&self, invoice: InvoiceRecord) -> Result<InvoiceRecord, StoreError> {
        let model = invoice_active(&invoice)?;
        let txn = self.db.begin().await.map_err(store_error)?;

        model.insert(&txn).await.map_err(store_error)?;

        if let Some(linked) = &invoice.transaction_number {
            ledger_entries::Entity::update_many()
                .col_expr(
                    ledger_entries::Column::InvoiceNumber,
                    Expr::value(invoice.invoice_number.as_str()),
                )
                .filter(ledger_entries::Column::TransactionNumber.eq(linked.as_str()))
                .exec(&txn)
                .await
                .map_err(store_error)?;
        }

        txn.commit().await.map_err(store_error)?;

        Ok(invoice)
    }

    async fn find_invoice(&self, invoice_number: &str) -> Result<Option<InvoiceRecord>, StoreError> {
        invoices::Entity::find()
            .filter(invoices::Column::InvoiceNumber.eq(invoice_number))
            .one(&self.db)
            .await
            .map_err(store_error)?
            .map(invoice_record)
            .transpose()
    }

    async fn invoice_exists(&self, invoice_number: &str) -> Result<bool, StoreError> {
        let count = invoices::Entity::find()
            .filter(invoices::Column::InvoiceNumber.eq(invoice_number))
            .count(&self.db)
            .await
            .map_err(store_error)?;
        Ok(count > 0)
    }
}
