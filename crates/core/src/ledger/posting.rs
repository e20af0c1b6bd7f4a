//! Derivation of ledger legs from a transaction's amounts.
//!
//! | type     | debit                                   | credit                                   |
//! |----------|-----------------------------------------|------------------------------------------|
//! | income   | cash (net), TDS receivable (tds)        | sales (net - vat + tds), VAT payable (vat) |
//! | expense  | expense (net - vat + tds), VAT receivable (vat) | cash (net), TDS payable (tds)    |
//! | transfer | transfer clearing (net)                 | cash (net)                               |
//!
//! Zero legs are dropped.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use khata_shared::types::{LedgerEntryId, UserId};

use super::accounts::{Account, PostingAccounts};
use super::entry::{EntryType, LedgerEntry};
use super::transaction::TransactionType;
use super::validation::Posting;
use crate::calendar::DualDate;
use crate::finance::AmountBreakdown;

/// One debit or credit before it is numbered and persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostingLeg {
    /// Target account.
    pub account: Account,
    /// Side.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
}

impl Posting for PostingLeg {
    fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

fn leg(account: &Account, entry_type: EntryType, amount: Decimal) -> Option<PostingLeg> {
    (amount > Decimal::ZERO).then(|| PostingLeg {
        account: account.clone(),
        entry_type,
        amount,
    })
}

/// Derives the double-entry legs for a transaction.
#[must_use]
pub fn derive_legs(
    transaction_type: TransactionType,
    amounts: &AmountBreakdown,
    accounts: &PostingAccounts,
) -> Vec<PostingLeg> {
    let net = amounts.net_amount;
    let vat = amounts.vat_amount;
    let tds = amounts.tds_amount;
    let base = net - vat + tds;

    let legs = match transaction_type {
        TransactionType::Income => [
            leg(&accounts.cash, EntryType::Debit, net),
            leg(&accounts.tds_receivable, EntryType::Debit, tds),
            leg(&accounts.sales, EntryType::Credit, base),
            leg(&accounts.vat_payable, EntryType::Credit, vat),
        ],
        TransactionType::Expense => [
            leg(&accounts.expense, EntryType::Debit, base),
            leg(&accounts.vat_receivable, EntryType::Debit, vat),
            leg(&accounts.cash, EntryType::Credit, net),
            leg(&accounts.tds_payable, EntryType::Credit, tds),
        ],
        TransactionType::Transfer => [
            leg(&accounts.transfer_clearing, EntryType::Debit, net),
            leg(&accounts.cash, EntryType::Credit, net),
            None,
            None,
        ],
    };
    legs.into_iter().flatten().collect()
}

/// Fields shared by every entry of one transaction.
#[derive(Debug, Clone, Copy)]
pub struct EntryContext<'a> {
    /// Number of the originating transaction.
    pub transaction_number: &'a str,
    /// Booking day.
    pub date: DualDate,
    /// Narrative.
    pub description: &'a str,
    /// Tenant key.
    pub company: &'a str,
    /// Posting user.
    pub created_by: UserId,
    /// Write time.
    pub created_at: DateTime<Utc>,
}

/// Numbers legs as `<transactionNumber>-01`, `-02`, ... and turns them into entries.
#[must_use]
pub fn number_entries(legs: &[PostingLeg], context: &EntryContext<'_>) -> Vec<LedgerEntry> {
    legs.iter()
        .enumerate()
        .map(|(index, leg)| LedgerEntry {
            id: LedgerEntryId::new(),
            entry_number: format!("{}-{:02}", context.transaction_number, index + 1),
            date: context.date,
            account_code: leg.account.code.clone(),
            account_type: leg.account.account_type,
            entry_type: leg.entry_type,
            amount: leg.amount,
            description: context.description.to_string(),
            company: context.company.to_string(),
            transaction_number: Some(context.transaction_number.to_string()),
            invoice_number: None,
            created_by: context.created_by,
            created_at: context.created_at,
        })
        .collect()
}
