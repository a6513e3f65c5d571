//! Retry and cache-lifetime rules shared by queries and mutations.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ApiError;

/// Statuses that are never retried: maintenance (500) and rate limiting (503).
pub const NO_RETRY_STATUSES: [u16; 2] = [500, 503];

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries allowed after the first failed attempt
    pub max_attempts: u32,
    /// Responses with these statuses fail immediately
    pub no_retry_statuses: Vec<u16>,
    /// First backoff delay, doubled on every retry
    pub base_delay: Duration,
    /// Upper bound of the backoff delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            no_retry_statuses: NO_RETRY_STATUSES.to_vec(),
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy without any retries, for calls that must not repeat
    pub fn never() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Decide whether to retry after `failures` previous retries ended in `error`.
    pub fn should_retry(&self, failures: u32, error: &ApiError) -> bool {
        if let Some(status) = error.status() {
            if self.no_retry_statuses.contains(&status) {
                return false;
            }
        }
        failures < self.max_attempts
    }

    /// Backoff before retry number `failures + 1`
    pub fn delay(&self, failures: u32) -> Duration {
        let factor = 2u32.saturating_pow(failures);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Run `op` until it succeeds or the policy gives up, returning the last error.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut failures = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if self.should_retry(failures, &e) => {
                    let delay = self.delay(failures);
                    debug!("Request failed ({}), retry {} in {:?}", e, failures + 1, delay);
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    failures += 1;
                }
                Err(e) => {
                    warn!("Request failed after {} retries: {}", failures, e);
                    return Err(e);
                }
            }
        }
    }
}

/// How long cached query results stay usable.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    /// Results younger than this are served without refetching
    pub stale_time: Duration,
    /// Entries not read for this long are evicted
    pub cache_time: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            cache_time: Duration::from_secs(60 * 60),
        }
    }
}
