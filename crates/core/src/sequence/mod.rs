//! Collision-free, human-readable document numbering.

pub mod allocator;
pub mod error;
pub mod number;
pub mod retry;

pub use allocator::SequenceAllocator;
pub use error::AllocationError;
pub use number::{
    CompanyCode, DocumentNumber, MAX_SEQUENCE_DIGITS, NumberSpace, SEQUENCE_WIDTH,
    validate_client_identifier,
};
pub use retry::RetryPolicy;
