//! In-process store for tests and local runs.
//!
//! Uniqueness is enforced under a single lock, so it behaves like a store
//! with a unique index: concurrent inserts of the same number see exactly
//! one winner.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use khata_shared::types::PageRequest;

use super::error::StoreError;
use super::traits::{InvoiceStore, StatusChange, TransactionFilter, TransactionStore};
use crate::ledger::{InvoiceRecord, PostedTransaction, TransactionRecord};
use crate::sequence::NumberSpace;

#[derive(Debug, Default)]
struct State {
    transactions: BTreeMap<String, PostedTransaction>,
    invoices: HashMap<String, InvoiceRecord>,
}

/// Store backed by in-memory maps.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

impl TransactionStore for MemoryStore {
    async fn count_transactions(&self, filter: &TransactionFilter) -> Result<u64, StoreError> {
        let state = self.lock()?;
        let count = state
            .transactions
            .values()
            .filter(|posted| filter.matches(&posted.transaction))
            .count();
        Ok(count as u64)
    }

    async fn latest_transaction_sequence(&self, space: &NumberSpace) -> Result<u64, StoreError> {
        let state = self.lock()?;
        let highest = state
            .transactions
            .range(space.lead().to_string()..)
            .map(|(number, _)| number)
            .take_while(|number| number.starts_with(space.lead()))
            .filter_map(|number| space.sequence_of(number))
            .max();
        Ok(highest.unwrap_or(0))
    }

    async fn insert_transaction(
        &self,
        posted: PostedTransaction,
    ) -> Result<PostedTransaction, StoreError> {
        let mut state = self.lock()?;
        let number = posted.transaction.transaction_number.clone();
        if state.transactions.contains_key(&number) {
            return Err(StoreError::UniqueViolation(number));
        }
        state.transactions.insert(number, posted.clone());
        Ok(posted)
    }

    async fn find_transactions(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> Result<(Vec<TransactionRecord>, u64), StoreError> {
        let state = self.lock()?;
        let mut matching: Vec<&TransactionRecord> = state
            .transactions
            .values()
            .map(|posted| &posted.transaction)
            .filter(|record| filter.matches(record))
            .collect();
        matching.sort_by(|a, b| {
            b.date
                .gregorian()
                .cmp(&a.date.gregorian())
                .then_with(|| b.transaction_number.cmp(&a.transaction_number))
        });

        let total = matching.len() as u64;
        let skip = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(page.limit()).unwrap_or(usize::MAX);
        let records = matching.into_iter().skip(skip).take(take).cloned().collect();
        Ok((records, total))
    }

    async fn find_transaction(
        &self,
        transaction_number: &str,
    ) -> Result<Option<PostedTransaction>, StoreError> {
        Ok(self.lock()?.transactions.get(transaction_number).cloned())
    }

    async fn transaction_exists(&self, transaction_number: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.transactions.contains_key(transaction_number))
    }

    async fn update_payment_status(
        &self,
        transaction_number: &str,
        change: StatusChange,
    ) -> Result<TransactionRecord, StoreError> {
        let mut state = self.lock()?;
        let posted = state
            .transactions
            .get_mut(transaction_number)
            .ok_or_else(|| StoreError::NotFound(transaction_number.to_string()))?;
        let record = &mut posted.transaction;
        if record.payment_status != change.expected {
            return Err(StoreError::Conflict(format!(
                "{transaction_number} is now {}",
                record.payment_status
            )));
        }
        record.payment_status = change.next;
        record.updated_by = Some(change.updated_by);
        record.updated_at = change.updated_at;
        Ok(record.clone())
    }
}

impl InvoiceStore for MemoryStore {
    async fn latest_invoice_sequence(&self, space: &NumberSpace) -> Result<u64, StoreError> {
        let state = self.lock()?;
        let highest = state
            .invoices
            .keys()
            .filter_map(|number| space.sequence_of(number))
            .max();
        Ok(highest.unwrap_or(0))
    }

    async fn insert_invoice(&self, invoice: InvoiceRecord) -> Result<InvoiceRecord, StoreError> {
        let mut state = self.lock()?;
        if state.invoices.contains_key(&invoice.invoice_number) {
            return Err(StoreError::UniqueViolation(invoice.invoice_number));
        }
        if let Some(linked) = &invoice.transaction_number {
            let posted = state
                .transactions
                .get_mut(linked)
                .ok_or_else(|| StoreError::NotFound(linked.clone()))?;
            for entry in &mut posted.entries {
                entry.invoice_number = Some(invoice.invoice_number.clone());
            }
        }
        state
            .invoices
            .insert(invoice.invoice_number.clone(), invoice.clone());
        Ok(invoice)
    }

    async fn find_invoice(&self, invoice_number: &str) -> Result<Option<InvoiceRecord>, StoreError> {
        Ok(self.lock()?.invoices.get(invoice_number).cloned())
    }

    async fn invoice_exists(&self, invoice_number: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.invoices.contains_key(invoice_number))
    }
}
