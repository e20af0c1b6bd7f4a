//! Bounded retry with exponential backoff.

use std::time::Duration;

/// Backoff never grows past `base_backoff * 2^MAX_BACKOFF_SHIFT`.
const MAX_BACKOFF_SHIFT: u32 = 4;

/// How many times to retry a conflicting write and how long to wait between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry; doubles on each further retry.
    pub base_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub const fn new(max_retries: u32, base_backoff: Duration) -> Self {
        Self {
            max_retries,
            base_backoff,
        }
    }

    /// Policy that retries without waiting.
    #[must_use]
    pub const fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }

    /// Total attempts including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait after the given failed attempt (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.base_backoff.saturating_mul(1 << shift)
    }
}
