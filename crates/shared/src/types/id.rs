//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where a `TransactionId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(TransactionId, "Unique identifier for a posted transaction.");
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(InvoiceId, "Unique identifier for an invoice.");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_time_ordered() {
        let first = TransactionId::new();
        let second = TransactionId::new();
        assert!(first.into_inner() < second.into_inner());
    }

    #[test]
    fn test_parse_and_display() {
        let raw = "0191b3a2-7c1e-7d4a-9f3e-2b8c6d5e4f10";
        let id: UserId = raw.parse().unwrap();
        assert_eq!(id.to_string(), raw);
        assert!("not-a-uuid".parse::<InvoiceId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let id = LedgerEntryId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
    }
}
