//! Posting engine: turns validated requests into numbered, balanced ledger
//! records.
//!
//! # Flow
//!
//! 1. Validate required fields and the acting user
//! 2. Normalize the date to both calendars
//! 3. Price the request (flat rates or line items)
//! 4. Derive balanced ledger legs
//! 5. Allocate or claim a number and persist everything in one write

pub mod engine;
pub mod error;
pub mod types;


pub use engine::{PostingEngine, PostingOptions};
pub use error::PostingError;
pub use types::{
    CreateInvoiceInput, CreateTransactionInput, DateInput, ListTransactionsQuery, TransactionPage,
};
