//! Retry decisions for failed page fetches.
//!
//! Transient failures (timeouts, network errors, 429 and 5xx responses) are
//! retried with a capped exponential backoff. Permanent failures (404, bad
//! URLs, hard blocks) are surfaced immediately.

use std::time::Duration;

use brandlist_core::AppConfig;

use crate::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per page, the first try included.
    pub max_attempts: u32,
    pub base_ms: u64,
    pub cap_ms: u64,
}

/// Result of [`RetryPolicy::should_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub retry: bool,
    pub delay: Duration,
}

impl RetryDecision {
    const STOP: RetryDecision = RetryDecision {
        retry: false,
        delay: Duration::ZERO,
    };
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_ms: 1_000,
            cap_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_ms: config.retry_base_ms,
            cap_ms: config.retry_cap_ms,
        }
    }

    /// Decides whether to try again after attempt number `attempt`
    /// (1-based) failed with `err`.
    ///
    /// # Backoff schedule (base 1000 ms, cap 8000 ms)
    ///
    /// | Failed attempt | Delay before next attempt |
    /// |----------------|---------------------------|
    /// | 1              | 1000 ms                   |
    /// | 2              | 2000 ms                   |
    /// | 3              | 4000 ms                   |
    /// | 4              | 8000 ms                   |
    /// | 5+             | 8000 ms (capped)          |
    #[must_use]
    pub fn should_retry(&self, attempt: u32, err: &FetchError) -> RetryDecision {
        if !is_transient(err) || attempt >= self.max_attempts {
            return RetryDecision::STOP;
        }
        RetryDecision {
            retry: true,
            delay: self.delay_for(attempt),
        }
    }

    /// `min(cap, base * 2^(attempt-1))`, saturating on overflow.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63);
        let delay_ms = self.base_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay_ms.min(self.cap_ms))
    }
}

/// Returns `true` for fetch failures worth retrying after a backoff delay.
///
/// A block answered with 429 or 5xx is rate limiting and may clear; a 403
/// or a challenge page will not.
#[must_use]
pub fn is_transient(err: &FetchError) -> bool {
    match err {
        FetchError::Timeout { .. } | FetchError::Network { .. } => true,
        FetchError::Http { status, .. } => is_transient_status(*status),
        FetchError::Blocked { status, .. } => status.is_some_and(is_transient_status),
        FetchError::InvalidUrl { .. } | FetchError::Unavailable { .. } => false,
    }
}

fn is_transient_status(status: u16) -> bool {
    status == 429 || (500..600).contains(&status)
}
