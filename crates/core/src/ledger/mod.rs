//! Double-entry ledger model.
//!
//! - Transactions, their payment lifecycle, and invoices
//! - Ledger entries and the chart of accounts they post to
//! - Derivation of balanced legs from computed amounts
//! - Balance validation

pub mod accounts;
pub mod entry;
pub mod error;
pub mod invoice;
pub mod posting;
pub mod transaction;
pub mod validation;

#[cfg(test)]
mod validation_props;

pub use accounts::{Account, PostingAccounts};
pub use entry::{AccountType, EntryType, LedgerEntry};
pub use error::LedgerError;
pub use invoice::{Customer, InvoiceRecord, InvoiceStatus, InvoiceType};
pub use posting::{EntryContext, PostingLeg, derive_legs, number_entries};
pub use transaction::{PaymentStatus, PostedTransaction, TransactionRecord, TransactionType};
pub use validation::{Posting, validate_entries, validate_posting};
