//! Entity re-exports.

pub use super::invoices::Entity as Invoices;
pub use super::ledger_entries::Entity as LedgerEntries;
pub use super::transactions::Entity as Transactions;
