//! Business rule validation for ledger postings.

use rust_decimal::Decimal;

use super::entry::EntryType;
use super::error::LedgerError;

/// Anything with a side and an amount.
pub trait Posting {
    /// Debit or credit.
    fn entry_type(&self) -> EntryType;
    /// Amount posted.
    fn amount(&self) -> Decimal;
}

impl Posting for super::entry::LedgerEntry {
    fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Validates that a set of postings is balanced.
///
/// # Errors
///
/// Returns an error if there are no postings, any amount is not positive,
/// only one side is present, or debits and credits differ.
pub fn validate_entries<P: Posting>(entries: &[P]) -> Result<(), LedgerError> {
    if entries.is_empty() {
        return Err(LedgerError::NoEntries);
    }

    let mut total_debits = Decimal::ZERO;
    let mut total_credits = Decimal::ZERO;
    let mut has_debit = false;
    let mut has_credit = false;

    for entry in entries {
        if entry.amount() <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount);
        }

        match entry.entry_type() {
            EntryType::Debit => {
                total_debits += entry.amount();
                has_debit = true;
            }
            EntryType::Credit => {
                total_credits += entry.amount();
                has_credit = true;
            }
        }
    }

    if !has_debit || !has_credit {
        return Err(LedgerError::SingleSided);
    }

    if total_debits != total_credits {
        return Err(LedgerError::Unbalanced {
            debits: total_debits,
            credits: total_credits,
        });
    }

    Ok(())
}

/// Validates the postings of a transaction with the given net amount.
///
/// A zero-amount transaction posts nothing and is accepted with no entries.
pub fn validate_posting<P: Posting>(net_amount: Decimal, entries: &[P]) -> Result<(), LedgerError> {
    if net_amount.is_zero() && entries.is_empty() {
        return Ok(());
    }
    validate_entries(entries)
}
