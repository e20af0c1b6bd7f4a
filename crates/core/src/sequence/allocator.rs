//! Optimistic per-company sequence allocation.
//!
//! The next number is proposed from a fresh read of the highest sequence
//! already used in the company's number space (`<PREFIX>-<CODE>-`) and written
//! in the same step. The store's uniqueness constraint decides the winner when
//! two writers propose the same number; the loser re-reads and tries again, up
//! to the retry policy's bound. No in-process lock is taken, so allocation
//! stays correct across processes.
//!
//! Reading the space rather than counting the company's records keeps numbers
//! moving when another company shares the code or a client-supplied
//! identifier already sits in the space.

use std::future::Future;

use tracing::{debug, warn};

use super::error::AllocationError;
use super::number::{CompanyCode, DocumentNumber, NumberSpace, validate_client_identifier};
use super::retry::RetryPolicy;
use crate::store::StoreError;

/// Allocates `<PREFIX>-<CODE>-<NNNNNN>` numbers for one document kind.
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    prefix: String,
    policy: RetryPolicy,
}

impl SequenceAllocator {
    /// Creates an allocator for numbers starting with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>, policy: RetryPolicy) -> Self {
        Self {
            prefix: prefix.into().to_ascii_uppercase(),
            policy,
        }
    }

    /// The prefix this allocator issues.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The retry policy in force.
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// The number space this allocator draws from for `company`.
    #[must_use]
    pub fn space(&self, company: &str) -> NumberSpace {
        NumberSpace::new(&self.prefix, CompanyCode::from_company(company))
    }

    /// Generates a number for `company` and writes it.
    ///
    /// `latest` returns the highest sequence already used in the space, zero
    /// when it is empty. `write` persists the record under the proposed number
    /// and must fail with [`StoreError::UniqueViolation`] if the number is taken.
    ///
    /// # Errors
    ///
    /// Returns `Exhausted` once every attempt has collided, or `Store` for any
    /// other store failure (which is never retried).
    pub async fn allocate<T, C, CF, W, WF>(
        &self,
        company: &str,
        mut latest: C,
        mut write: W,
    ) -> Result<T, AllocationError>
    where
        C: FnMut(NumberSpace) -> CF,
        CF: Future<Output = Result<u64, StoreError>>,
        W: FnMut(DocumentNumber) -> WF,
        WF: Future<Output = Result<T, StoreError>>,
    {
        let space = self.space(company);
        let attempts = self.policy.max_attempts();

        for attempt in 1..=attempts {
            let highest = latest(space.clone()).await?;
            let number = space.number(highest.saturating_add(1));

            match write(number.clone()).await {
                Ok(written) => {
                    debug!(%number, attempt, "sequence number allocated");
                    return Ok(written);
                }
                Err(StoreError::UniqueViolation(_)) => {
                    warn!(
                        %number,
                        company,
                        attempt,
                        max_attempts = attempts,
                        "sequence number taken by a concurrent writer"
                    );
                    if attempt < attempts {
                        let wait = self.policy.backoff(attempt);
                        if !wait.is_zero() {
                            tokio::time::sleep(wait).await;
                        }
                    }
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(AllocationError::Exhausted { attempts })
    }

    /// Writes a record under a client-supplied identifier.
    ///
    /// Only a uniqueness check is made; a collision is reported, never retried.
    ///
    /// # Errors
    ///
    /// Returns `InvalidIdentifier` for a malformed identifier and
    /// `DuplicateIdentifier` when it is already used, whether found by the
    /// up-front check or by the store's constraint on write.
    pub async fn claim<T, E, EF, W, WF>(
        &self,
        requested: &str,
        exists: E,
        write: W,
    ) -> Result<T, AllocationError>
    where
        E: FnOnce(String) -> EF,
        EF: Future<Output = Result<bool, StoreError>>,
        W: FnOnce(String) -> WF,
        WF: Future<Output = Result<T, StoreError>>,
    {
        let identifier = validate_client_identifier(requested)?;

        if exists(identifier.clone()).await? {
            return Err(AllocationError::DuplicateIdentifier(identifier));
        }

        match write(identifier.clone()).await {
            Ok(written) => Ok(written),
            Err(StoreError::UniqueViolation(_)) => {
                Err(AllocationError::DuplicateIdentifier(identifier))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

    fn allocator(max_retries: u32) -> SequenceAllocator {
        SequenceAllocator::new("trx", RetryPolicy::immediate(max_retries))
    }

    #[tokio::test]
    async fn test_first_number_for_company() {
        let number = allocator(5)
            .allocate(
                "Acme Traders",
                |_space| async { Ok(0) },
                |number| async move { Ok(number.to_string()) },
            )
            .await
            .unwrap();
        assert_eq!(number, "TRX-ACM-000001");
    }

    #[tokio::test]
    async fn test_retry_rereads_latest() {
        // Two numbers are already taken but the first read is stale.
        let reads = AtomicU64::new(0);
        let taken: HashSet<String> = ["TRX-ACM-000001", "TRX-ACM-000002"]
            .into_iter()
            .map(String::from)
            .collect();

        let number = allocator(5)
            .allocate(
                "Acme",
                |_space| {
                    let read = reads.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(if read == 0 { 1 } else { 2 }) }
                },
                |number| {
                    let result = if taken.contains(&number.to_string()) {
                        Err(StoreError::UniqueViolation(number.to_string()))
                    } else {
                        Ok(number)
                    };
                    async move { result }
                },
            )
            .await
            .unwrap();

        assert_eq!(number.to_string(), "TRX-ACM-000003");
        assert_eq!(reads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_after_bound() {
        let writes = AtomicU32::new(0);
        let err = allocator(5)
            .allocate(
                "Acme",
                |_space| async { Ok(0) },
                |number: DocumentNumber| {
                    writes.fetch_add(1, Ordering::SeqCst);
                    async move { Err::<(), _>(StoreError::UniqueViolation(number.to_string())) }
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Exhausted { attempts: 6 }));
        assert_eq!(writes.load(Ordering::SeqCst), 6);
    }

    #[tokio::test]
    async fn test_backend_errors_are_not_retried() {
        let writes = AtomicU32::new(0);
        let err = allocator(5)
            .allocate(
                "Acme",
                |_space| async { Ok(0) },
                |_number| {
                    writes.fetch_add(1, Ordering::SeqCst);
                    async { Err::<(), _>(StoreError::Backend("connection reset".into())) }
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::Store(StoreError::Backend(_))));
        assert_eq!(writes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_latest_is_read_from_the_number_space() {
        let taken = ["TRX-ACM-000001", "TRX-ACM-000004", "PO-17", "INV-ACM-000009"];
        let number = allocator(5)
            .allocate(
                "Acme Traders",
                |space: NumberSpace| {
                    let highest = taken.iter().filter_map(|n| space.sequence_of(n)).max();
                    async move { Ok(highest.unwrap_or(0)) }
                },
                |number| async move { Ok(number.to_string()) },
            )
            .await
            .unwrap();
        assert_eq!(number, "TRX-ACM-000005");
    }

    #[tokio::test]
    async fn test_claim_duplicate_is_not_written() {
        let written = Mutex::new(Vec::<String>::new());
        let err = allocator(5)
            .claim(
                "PO-17",
                |_id| async { Ok(true) },
                |id| {
                    written.lock().unwrap().push(id);
                    async { Ok(()) }
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::DuplicateIdentifier(id) if id == "PO-17"));
        assert!(written.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_claim_race_maps_to_duplicate() {
        let err = allocator(5)
            .claim(
                "PO-17",
                |_id| async { Ok(false) },
                |id| async move { Err::<(), _>(StoreError::UniqueViolation(id)) },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AllocationError::DuplicateIdentifier(_)));
    }

    #[tokio::test]
    async fn test_claim_trims_identifier() {
        let id = allocator(5)
            .claim(" PO-17 ", |_id| async { Ok(false) }, |id| async move { Ok(id) })
            .await
            .unwrap();
        assert_eq!(id, "PO-17");
    }
}
