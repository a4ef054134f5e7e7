//! Retry with exponential backoff around any transport.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::{render_url, HttpResponse, Transport, TransportError};
use crate::config::HttpConfig;

/// Retry and backoff policy for outbound requests
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = single attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any single delay
    pub max_backoff: Duration,
    /// Factor applied to the delay after each retry
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(4),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Policy that retries without sleeping (tests)
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            multiplier: config.backoff_multiplier,
        }
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.saturating_sub(1) as i32);
        Duration::try_from_secs_f64(self.initial_backoff.as_secs_f64() * factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// 429 and 5xx are worth another attempt; other statuses are final
    pub fn is_retryable_status(status: u16) -> bool {
        status == 429 || (500..600).contains(&status)
    }
}

/// Request statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Attempts sent, retries included
    pub total_requests: u64,
    /// Attempts that were retries
    pub retries: u64,
    /// Requests that failed after exhausting retries
    pub failures: u64,
}

/// Transport wrapper applying a [`RetryPolicy`]
#[derive(Debug)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
    request_count: AtomicU64,
    retry_count: AtomicU64,
    failure_count: AtomicU64,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            request_count: AtomicU64::new(0),
            retry_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// Get request statistics
    pub fn stats(&self) -> ClientStats {
        ClientStats {
            total_requests: self.request_count.load(Ordering::Relaxed),
            retries: self.retry_count.load(Ordering::Relaxed),
            failures: self.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl<T: Transport> Transport for RetryingTransport<T> {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        let mut attempt = 0;
        loop {
            self.request_count.fetch_add(1, Ordering::Relaxed);
            let result = self.inner.get(url, query);

            let retryable = match &result {
                Ok(response) => RetryPolicy::is_retryable_status(response.status),
                Err(_) => true,
            };

            if !retryable || attempt >= self.policy.max_retries {
                let failed = match &result {
                    Ok(response) => !response.is_success(),
                    Err(_) => true,
                };
                if failed && retryable {
                    self.failure_count.fetch_add(1, Ordering::Relaxed);
                }
                return result;
            }

            attempt += 1;
            self.retry_count.fetch_add(1, Ordering::Relaxed);
            let delay = self.policy.backoff(attempt);
            match &result {
                Ok(response) => tracing::warn!(
                    "GET {} returned {}, retry {}/{} in {:?}",
                    render_url(url, query),
                    response.status,
                    attempt,
                    self.policy.max_retries,
                    delay
                ),
                Err(e) => tracing::warn!(
                    "GET {} failed ({}), retry {}/{} in {:?}",
                    render_url(url, query),
                    e,
                    attempt,
                    self.policy.max_retries,
                    delay
                ),
            }
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }
        }
    }
}
