//! `SeaORM` entity definitions.

pub mod prelude;

pub mod invoices;
pub mod ledger_entries;
pub mod transactions;
