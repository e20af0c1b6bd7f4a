//! Ledger entry domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use khata_shared::types::{LedgerEntryId, UserId};

use crate::calendar::DualDate;

/// Type of ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit entry (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

/// Classification of the account an entry posts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Resources owned.
    Asset,
    /// Obligations owed.
    Liability,
    /// Owner's interest.
    Equity,
    /// Income earned.
    Revenue,
    /// Costs incurred.
    Expense,
}

macro_rules! str_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase wire name.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}'",
                        stringify!($ty)
                    )),
                }
            }
        }
    };
}

pub(crate) use str_enum;

str_enum!(EntryType { Debit => "debit", Credit => "credit" });
str_enum!(AccountType {
    Asset => "asset",
    Liability => "liability",
    Equity => "equity",
    Revenue => "revenue",
    Expense => "expense",
});

/// A single persisted debit or credit posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Unique identifier for this entry.
    pub id: LedgerEntryId,
    /// Human-readable entry number, `<transactionNumber>-NN`.
    pub entry_number: String,
    /// Day the entry is booked on.
    pub date: DualDate,
    /// Chart-of-accounts code.
    pub account_code: String,
    /// Classification of the account.
    pub account_type: AccountType,
    /// Debit or credit.
    pub entry_type: EntryType,
    /// Positive amount.
    pub amount: Decimal,
    /// Narrative copied from the originating document.
    pub description: String,
    /// Tenant key.
    pub company: String,
    /// Originating transaction, for lookup only.
    pub transaction_number: Option<String>,
    /// Invoice reconciled against the originating transaction, for lookup only.
    pub invoice_number: Option<String>,
    /// User who caused the posting.
    pub created_by: UserId,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.entry_type {
            EntryType::Debit => self.amount,
            EntryType::Credit => -self.amount,
        }
    }
}
