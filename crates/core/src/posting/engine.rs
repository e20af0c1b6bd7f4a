//! Posting engine.
//!
//! Orchestrates one write: validate the request, normalize its date, price it,
//! derive balanced ledger legs, then allocate a number and persist the
//! transaction with its entries in a single store write. Nothing is written
//! unless every step before the write succeeds.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{error, info};

use khata_shared::PostingConfig;
use khata_shared::types::{InvoiceId, Pagination, TransactionId, UserId};

use super::error::PostingError;
use super::types::{
    CreateInvoiceInput, CreateTransactionInput, DateInput, ListTransactionsQuery, TransactionPage,
};
use crate::calendar::{DualDate, parse_gregorian};
use crate::finance::{
    AmountBreakdown, AmountInput, DEFAULT_VAT_RATE, FinancialCalculator, FlatRateInput,
    LineItemInput, PricedLineItem, invoice_totals,
};
use crate::ledger::{
    EntryContext, InvoiceRecord, InvoiceStatus, InvoiceType, LedgerError, PaymentStatus,
    PostedTransaction, PostingAccounts, PostingLeg, TransactionRecord, TransactionType,
    derive_legs, number_entries, validate_posting,
};
use crate::sequence::{RetryPolicy, SequenceAllocator};
use crate::store::{InvoiceStore, StatusChange, TransactionFilter, TransactionStore};

/// Tunables of a [`PostingEngine`].
#[derive(Debug, Clone)]
pub struct PostingOptions {
    /// Conflict retry bound and backoff.
    pub retry: RetryPolicy,
    /// Prefix of generated transaction numbers.
    pub transaction_prefix: String,
    /// Prefix of generated invoice numbers.
    pub invoice_prefix: String,
    /// VAT rate used when a flat-rate request gives none.
    pub default_vat_rate: Decimal,
    /// Accounts postings are derived against.
    pub accounts: PostingAccounts,
}

impl Default for PostingOptions {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            transaction_prefix: "TRX".to_string(),
            invoice_prefix: "INV".to_string(),
            default_vat_rate: DEFAULT_VAT_RATE,
            accounts: PostingAccounts::default(),
        }
    }
}

impl From<&PostingConfig> for PostingOptions {
    fn from(config: &PostingConfig) -> Self {
        Self {
            retry: RetryPolicy::new(
                config.max_allocation_retries,
                std::time::Duration::from_millis(config.retry_backoff_ms),
            ),
            transaction_prefix: config.transaction_prefix.clone(),
            invoice_prefix: config.invoice_prefix.clone(),
            default_vat_rate: config.default_vat_rate,
            accounts: PostingAccounts::default(),
        }
    }
}

/// A transaction request that passed validation and pricing.
struct ValidatedTransaction {
    transaction_type: TransactionType,
    description: String,
    category: String,
    company: String,
    date: DualDate,
    amounts: AmountBreakdown,
    payment_status: PaymentStatus,
    metadata: Value,
    created_by: UserId,
}

impl ValidatedTransaction {
    fn assemble(
        &self,
        transaction_number: String,
        legs: &[PostingLeg],
        now: DateTime<Utc>,
    ) -> PostedTransaction {
        let entries = number_entries(
            legs,
            &EntryContext {
                transaction_number: &transaction_number,
                date: self.date,
                description: &self.description,
                company: &self.company,
                created_by: self.created_by,
                created_at: now,
            },
        );
        PostedTransaction {
            transaction: TransactionRecord {
                id: TransactionId::new(),
                transaction_number,
                transaction_type: self.transaction_type,
                amount: self.amounts.net_amount,
                vat_amount: self.amounts.vat_amount,
                tds_amount: self.amounts.tds_amount,
                discount_amount: self.amounts.discount_amount,
                description: self.description.clone(),
                category: self.category.clone(),
                date: self.date,
                payment_status: self.payment_status,
                company: self.company.clone(),
                metadata: self.metadata.clone(),
                created_by: self.created_by,
                updated_by: None,
                created_at: now,
                updated_at: now,
            },
            entries,
        }
    }
}

/// An invoice request that passed validation and pricing, minus its number.
struct ValidatedInvoice {
    record: InvoiceRecord,
}

/// Trimmed, non-empty text or `None`.
fn present(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn present_date(value: Option<&DateInput>) -> Option<&DateInput> {
    value.filter(|date| !date.is_blank())
}

fn missing_fields(checks: &[(bool, &str)]) -> PostingError {
    PostingError::MissingFields(
        checks
            .iter()
            .filter(|(is_present, _)| !is_present)
            .map(|(_, name)| (*name).to_string())
            .collect(),
    )
}

fn parse_date(date: &DateInput) -> Result<DualDate, PostingError> {
    let (gregorian, nepali) = date.halves();
    Ok(DualDate::parse(gregorian, nepali)?)
}

/// Line items from `metadata.items`, or `None` when absent or empty.
fn line_items(metadata: Option<&Value>) -> Result<Option<Vec<LineItemInput>>, PostingError> {
    let Some(items) = metadata.and_then(|m| m.get("items")) else {
        return Ok(None);
    };
    if items.is_null() {
        return Ok(None);
    }
    let items: Vec<LineItemInput> = serde_json::from_value(items.clone())
        .map_err(|e| PostingError::validation("metadata.items", e.to_string()))?;
    Ok((!items.is_empty()).then_some(items))
}

fn build_metadata(
    metadata: Option<Value>,
    priced: Option<Vec<PricedLineItem>>,
    amounts: &AmountBreakdown,
) -> Result<Value, PostingError> {
    let mut object = match metadata {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(object)) => object,
        Some(_) => return Err(PostingError::validation("metadata", "must be an object")),
    };
    if let Some(priced) = priced {
        let to_value = |value: serde_json::Result<Value>| {
            value.map_err(|e| PostingError::Internal(format!("metadata encoding: {e}")))
        };
        object.insert("items".to_string(), to_value(serde_json::to_value(priced))?);
        object.insert(
            "subtotal".to_string(),
            to_value(serde_json::to_value(amounts.subtotal))?,
        );
    }
    Ok(Value::Object(object))
}

/// Validates, prices, numbers and persists transactions and invoices.
pub struct PostingEngine<S> {
    store: S,
    transactions: SequenceAllocator,
    invoices: SequenceAllocator,
    accounts: PostingAccounts,
    default_vat_rate: Decimal,
}

impl<S> PostingEngine<S>
where
    S: TransactionStore + InvoiceStore,
{
    /// Creates an engine over a store.
    #[must_use]
    pub fn new(store: S, options: PostingOptions) -> Self {
        Self {
            store,
            transactions: SequenceAllocator::new(options.transaction_prefix, options.retry),
            invoices: SequenceAllocator::new(options.invoice_prefix, options.retry),
            accounts: options.accounts,
            default_vat_rate: options.default_vat_rate,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    // ========== Transactions ==========

    /// Creates and posts a transaction.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without a creating user
    /// - `MissingFields` listing every absent required field
    /// - `Validation` / `Calendar` for malformed values
    /// - `Conflict` for a client-supplied number already in use
    /// - `AllocationExhausted` when generated numbers keep colliding
    /// - `Internal` for storage failures
    pub async fn create_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<PostedTransaction, PostingError> {
        let requested = present(input.transaction_number.as_ref());
        let draft = self.validate_transaction(input)?;

        let legs = derive_legs(draft.transaction_type, &draft.amounts, &self.accounts);
        if let Err(err) = validate_posting(draft.amounts.net_amount, &legs) {
            error!(error = %err, company = %draft.company, "derived postings do not balance");
            return Err(err.into());
        }

        let now = Utc::now();
        let store = &self.store;
        let assemble = |number: String| draft.assemble(number, &legs, now);

        let posted = match requested {
            Some(requested) => {
                self.transactions
                    .claim(
                        &requested,
                        |id| async move { store.transaction_exists(&id).await },
                        |id| store.insert_transaction(assemble(id)),
                    )
                    .await?
            }
            None => {
                self.transactions
                    .allocate(
                        &draft.company,
                        |space| async move { store.latest_transaction_sequence(&space).await },
                        |number| store.insert_transaction(assemble(number.to_string())),
                    )
                    .await?
            }
        };

        info!(
            transaction_number = %posted.transaction.transaction_number,
            company = %posted.transaction.company,
            amount = %posted.transaction.amount,
            entries = posted.entries.len(),
            "Transaction posted"
        );
        Ok(posted)
    }

    fn validate_transaction(
        &self,
        input: CreateTransactionInput,
    ) -> Result<ValidatedTransaction, PostingError> {
        let created_by = input.created_by.ok_or(PostingError::Unauthorized)?;

        let kind = present(input.transaction_type.as_ref());
        let description = present(input.description.as_ref());
        let category = present(input.category.as_ref());
        let date = present_date(input.date.as_ref());
        let company = present(input.company.as_ref());

        let (Some(amount), Some(kind), Some(description), Some(category), Some(date), Some(company)) =
            (input.amount, kind, description, category, date, company)
        else {
            return Err(missing_fields(&[
                (input.amount.is_some(), "amount"),
                (present(input.transaction_type.as_ref()).is_some(), "type"),
                (present(input.description.as_ref()).is_some(), "description"),
                (present(input.category.as_ref()).is_some(), "category"),
                (present_date(input.date.as_ref()).is_some(), "date"),
                (present(input.company.as_ref()).is_some(), "company"),
            ]));
        };

        let transaction_type: TransactionType = kind.parse().map_err(|_| {
            PostingError::validation("type", format!("'{kind}' is not one of income, expense, transfer"))
        })?;
        let date = parse_date(date)?;

        let (amounts, priced) = match line_items(input.metadata.as_ref())? {
            Some(items) => {
                if input.vat_rate.is_some() || input.tds_rate.is_some() || input.discount_rate.is_some() {
                    return Err(PostingError::validation(
                        "metadata.items",
                        "line items carry their own discount and tax and cannot be combined with vatRate, tdsRate or discountRate",
                    ));
                }
                if amount < Decimal::ZERO {
                    return Err(PostingError::validation("amount", "cannot be negative"));
                }
                let priced = FinancialCalculator::price_items(&items)?;
                let amounts = FinancialCalculator::compute(&AmountInput::LineItems(items))?;
                (amounts, Some(priced))
            }
            None => {
                let flat = FlatRateInput {
                    amount,
                    vat_rate: input.vat_rate.unwrap_or(self.default_vat_rate),
                    tds_rate: input.tds_rate.unwrap_or(Decimal::ZERO),
                    discount_rate: input.discount_rate.unwrap_or(Decimal::ZERO),
                };
                (FinancialCalculator::compute(&AmountInput::FlatRate(flat))?, None)
            }
        };

        let metadata = build_metadata(input.metadata, priced, &amounts)?;

        Ok(ValidatedTransaction {
            transaction_type,
            description,
            category,
            company,
            date,
            amounts,
            payment_status: input.payment_status.unwrap_or_default(),
            metadata,
            created_by,
        })
    }

    fn transaction_filter(query: &ListTransactionsQuery) -> Result<TransactionFilter, PostingError> {
        let transaction_type = present(query.transaction_type.as_ref())
            .map(|kind| {
                kind.parse::<TransactionType>().map_err(|_| {
                    PostingError::validation("type", format!("'{kind}' is not one of income, expense, transfer"))
                })
            })
            .transpose()?;
        let start_date = present(query.start_date.as_ref())
            .map(|date| parse_gregorian(&date))
            .transpose()?;
        let end_date = present(query.end_date.as_ref())
            .map(|date| parse_gregorian(&date))
            .transpose()?;

        Ok(TransactionFilter {
            company: present(query.company.as_ref()),
            transaction_type,
            start_date,
            end_date,
        })
    }

    /// Lists transactions, newest first, one page at a time.
    ///
    /// # Errors
    ///
    /// Returns `Validation` / `Calendar` errors for malformed filters.
    pub async fn list_transactions(
        &self,
        query: &ListTransactionsQuery,
    ) -> Result<TransactionPage, PostingError> {
        let filter = Self::transaction_filter(query)?;
        let page = query.page_request();
        let (transactions, total) = self.store.find_transactions(&filter, page).await?;
        Ok(TransactionPage {
            transactions,
            pagination: Pagination::new(page, total),
        })
    }

    /// Counts transactions matching the query's filters; paging is ignored.
    pub async fn count_transactions(&self, query: &ListTransactionsQuery) -> Result<u64, PostingError> {
        let filter = Self::transaction_filter(query)?;
        Ok(self.store.count_transactions(&filter).await?)
    }

    /// Loads a transaction with its ledger entries.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown number.
    pub async fn get_transaction(&self, transaction_number: &str) -> Result<PostedTransaction, PostingError> {
        self.store
            .find_transaction(transaction_number.trim())
            .await?
            .ok_or_else(|| PostingError::NotFound(format!("Transaction {}", transaction_number.trim())))
    }

    /// Moves a transaction to a new payment status.
    ///
    /// Only `paymentStatus`, `updatedBy` and `updatedAt` change. Moving to
    /// `paid` re-checks that the transaction's entries balance.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without an acting user
    /// - `NotFound` for an unknown number
    /// - `Ledger(InvalidStatusTransition)` for a disallowed move
    /// - `Conflict` if the status changed concurrently
    pub async fn update_payment_status(
        &self,
        transaction_number: &str,
        next: PaymentStatus,
        actor: Option<UserId>,
    ) -> Result<TransactionRecord, PostingError> {
        let actor = actor.ok_or(PostingError::Unauthorized)?;
        let posted = self.get_transaction(transaction_number).await?;
        let current = posted.transaction.payment_status;

        if !current.can_transition_to(next) {
            return Err(LedgerError::InvalidStatusTransition { from: current, to: next }.into());
        }
        if next == PaymentStatus::Paid {
            if let Err(err) = validate_posting(posted.transaction.amount, &posted.entries) {
                error!(
                    error = %err,
                    transaction_number = %posted.transaction.transaction_number,
                    "stored postings do not balance"
                );
                return Err(err.into());
            }
        }

        let updated = self
            .store
            .update_payment_status(
                &posted.transaction.transaction_number,
                StatusChange {
                    expected: current,
                    next,
                    updated_by: actor,
                    updated_at: Utc::now(),
                },
            )
            .await?;

        info!(
            transaction_number = %updated.transaction_number,
            from = %current,
            to = %next,
            "Payment status updated"
        );
        Ok(updated)
    }

    // ========== Invoices ==========

    /// Creates an invoice, optionally reconciled against a transaction.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` without a creating user
    /// - `MissingFields` listing every absent required field
    /// - `Validation` / `Calendar` / `Ledger(DueBeforeIssue)` for malformed values
    /// - `NotFound` if the linked transaction does not exist
    /// - `Ledger(Reconciliation)` if the invoice total differs from the
    ///   linked transaction's amount
    /// - `Conflict` / `AllocationExhausted` as for transactions
    pub async fn create_invoice(&self, input: CreateInvoiceInput) -> Result<InvoiceRecord, PostingError> {
        let requested = present(input.invoice_number.as_ref());
        let draft = self.validate_invoice(input).await?;
        let store = &self.store;
        let assemble = |number: String| InvoiceRecord {
            invoice_number: number,
            ..draft.record.clone()
        };

        let invoice = match requested {
            Some(requested) => {
                self.invoices
                    .claim(
                        &requested,
                        |id| async move { store.invoice_exists(&id).await },
                        |id| store.insert_invoice(assemble(id)),
                    )
                    .await?
            }
            None => {
                let company = draft.record.company.as_str();
                self.invoices
                    .allocate(
                        company,
                        |space| async move { store.latest_invoice_sequence(&space).await },
                        |number| store.insert_invoice(assemble(number.to_string())),
                    )
                    .await?
            }
        };

        info!(
            invoice_number = %invoice.invoice_number,
            company = %invoice.company,
            total = %invoice.total,
            transaction_number = invoice.transaction_number.as_deref().unwrap_or(""),
            "Invoice created"
        );
        Ok(invoice)
    }

    async fn validate_invoice(&self, input: CreateInvoiceInput) -> Result<ValidatedInvoice, PostingError> {
        let created_by = input.created_by.ok_or(PostingError::Unauthorized)?;

        let kind = present(input.invoice_type.as_ref());
        let date = present_date(input.date.as_ref());
        let due_date = present_date(input.due_date.as_ref());
        let customer = input
            .customer
            .as_ref()
            .filter(|c| !c.name.trim().is_empty());
        let line_items = input.line_items.as_ref().filter(|items| !items.is_empty());
        let company = present(input.company.as_ref());

        let (Some(kind), Some(date), Some(due_date), Some(customer), Some(line_items), Some(company)) =
            (kind, date, due_date, customer, line_items, company)
        else {
            return Err(missing_fields(&[
                (present(input.invoice_type.as_ref()).is_some(), "type"),
                (present_date(input.date.as_ref()).is_some(), "date"),
                (present_date(input.due_date.as_ref()).is_some(), "dueDate"),
                (
                    input.customer.as_ref().is_some_and(|c| !c.name.trim().is_empty()),
                    "customer.name",
                ),
                (input.line_items.as_ref().is_some_and(|items| !items.is_empty()), "lineItems"),
                (present(input.company.as_ref()).is_some(), "company"),
            ]));
        };

        let invoice_type: InvoiceType = kind.parse().map_err(|_| {
            PostingError::validation("type", format!("'{kind}' is not one of sales, purchase"))
        })?;
        let status = present(input.status.as_ref())
            .map(|status| {
                status.parse::<InvoiceStatus>().map_err(|_| {
                    PostingError::validation(
                        "status",
                        format!("'{status}' is not one of draft, sent, paid, overdue, cancelled"),
                    )
                })
            })
            .transpose()?
            .unwrap_or_default();

        let date = parse_date(date)?;
        let due_date = parse_date(due_date)?;
        if due_date.gregorian() < date.gregorian() {
            return Err(LedgerError::DueBeforeIssue.into());
        }

        let totals = invoice_totals(line_items)?;

        let transaction_number = present(input.transaction_number.as_ref());
        if let Some(linked) = &transaction_number {
            let posted = self
                .store
                .find_transaction(linked)
                .await?
                .filter(|posted| posted.transaction.company == company)
                .ok_or_else(|| PostingError::NotFound(format!("Transaction {linked}")))?;
            if posted.transaction.amount != totals.total {
                return Err(LedgerError::Reconciliation {
                    invoice_total: totals.total,
                    transaction_amount: posted.transaction.amount,
                }
                .into());
            }
        }

        let mut customer = customer.clone();
        customer.name = customer.name.trim().to_string();

        Ok(ValidatedInvoice {
            record: InvoiceRecord {
                id: InvoiceId::new(),
                invoice_number: String::new(),
                invoice_type,
                status,
                date,
                due_date,
                customer,
                line_items: totals.lines,
                subtotal: totals.subtotal,
                vat_total: totals.vat_total,
                total: totals.total,
                company,
                transaction_number,
                created_by,
                created_at: Utc::now(),
            },
        })
    }

    /// Loads an invoice.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown number.
    pub async fn get_invoice(&self, invoice_number: &str) -> Result<InvoiceRecord, PostingError> {
        self.store
            .find_invoice(invoice_number.trim())
            .await?
            .ok_or_else(|| PostingError::NotFound(format!("Invoice {}", invoice_number.trim())))
    }
}
