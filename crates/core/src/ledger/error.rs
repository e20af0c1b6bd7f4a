//! Ledger error types for posting and lifecycle rules.

use rust_decimal::Decimal;
use thiserror::Error;

use super::transaction::PaymentStatus;

/// Errors that can occur when deriving or validating ledger data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// A non-zero transaction produced no entries.
    #[error("Transaction must have at least one entry")]
    NoEntries,

    /// Entries are all debits or all credits.
    #[error("Transaction must have both debit and credit entries")]
    SingleSided,

    /// An entry amount is zero or negative.
    #[error("Entry amount must be positive")]
    InvalidAmount,

    /// Debits and credits differ.
    #[error("Transaction is not balanced. Debit: {debits}, Credit: {credits}")]
    Unbalanced {
        /// Total debits.
        debits: Decimal,
        /// Total credits.
        credits: Decimal,
    },

    // ========== Lifecycle Errors ==========
    /// The requested payment status change is not allowed.
    #[error("Cannot change payment status from {from} to {to}")]
    InvalidStatusTransition {
        /// Current status.
        from: PaymentStatus,
        /// Requested status.
        to: PaymentStatus,
    },

    // ========== Invoice Errors ==========
    /// A linked invoice does not match its transaction.
    #[error("Invoice total {invoice_total} does not match transaction amount {transaction_amount}")]
    Reconciliation {
        /// Computed invoice total.
        invoice_total: Decimal,
        /// Net amount of the linked transaction.
        transaction_amount: Decimal,
    },

    /// An invoice falls due before it is issued.
    #[error("Due date cannot be before the invoice date")]
    DueBeforeIssue,
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NoEntries => "NO_ENTRIES",
            Self::SingleSided => "SINGLE_SIDED",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::Unbalanced { .. } => "UNBALANCED_TRANSACTION",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::Reconciliation { .. } => "RECONCILIATION_MISMATCH",
            Self::DueBeforeIssue => "DUE_BEFORE_ISSUE",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - caller input
            Self::DueBeforeIssue => 400,

            // 422 Unprocessable - business rules
            Self::InvalidStatusTransition { .. } | Self::Reconciliation { .. } => 422,

            // 500 - derived postings are computed here, so imbalance is a defect
            Self::NoEntries | Self::SingleSided | Self::InvalidAmount | Self::Unbalanced { .. } => {
                500
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerError::NoEntries.error_code(), "NO_ENTRIES");
        assert_eq!(
            LedgerError::InvalidStatusTransition {
                from: PaymentStatus::Cancelled,
                to: PaymentStatus::Paid,
            }
            .error_code(),
            "INVALID_STATUS_TRANSITION"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(LedgerError::DueBeforeIssue.http_status_code(), 400);
        assert_eq!(
            LedgerError::Reconciliation {
                invoice_total: Decimal::ONE,
                transaction_amount: Decimal::TWO,
            }
            .http_status_code(),
            422
        );
        assert_eq!(LedgerError::SingleSided.http_status_code(), 500);
    }

    #[test]
    fn test_error_display() {
        let err = LedgerError::Unbalanced {
            debits: Decimal::new(10000, 2),
            credits: Decimal::new(5000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Transaction is not balanced. Debit: 100.00, Credit: 50.00"
        );

        let err = LedgerError::InvalidStatusTransition {
            from: PaymentStatus::Cancelled,
            to: PaymentStatus::Paid,
        };
        assert_eq!(err.to_string(), "Cannot change payment status from cancelled to paid");
    }
}
