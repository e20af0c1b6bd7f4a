//! Persistence seam between the posting engine and storage backends.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use traits::{InvoiceStore, StatusChange, TransactionFilter, TransactionStore};
