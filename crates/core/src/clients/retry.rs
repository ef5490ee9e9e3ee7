//! Fixed-attempt retry with linear backoff.

use std::future::Future;
use std::time::Duration;

use tracing::warn;
use walletlens_common::constants::{PROVIDER_MAX_ATTEMPTS, PROVIDER_RETRY_BASE_DELAY_MS};
use walletlens_common::error::{LensError, LensResult};

/// Outcome of a single attempt.
#[derive(Debug)]
pub enum AttemptError {
    /// Transport failure or non-2xx status — worth another try.
    Retryable(String),
    /// The provider answered but the answer is unusable — give up now.
    Fatal(LensError),
}

/// Attempt `n` (1-based) waits `n × base_delay` before attempt `n + 1`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: PROVIDER_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(PROVIDER_RETRY_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    /// Run `attempt` until it succeeds, fails fatally, or attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut attempt: F) -> LensResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max = self.max_attempts.max(1);
        let mut n = 1;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Retryable(msg)) if n >= max => {
                    return Err(LensError::RetriesExhausted {
                        operation: operation.to_string(),
                        attempts: max,
                        last_error: msg,
                    });
                }
                Err(AttemptError::Retryable(msg)) => {
                    let wait = self.delay_after(n);
                    warn!("{operation} failed ({msg}) — retrying in {wait:?} (attempt {n}/{max})");
                    tokio::time::sleep(wait).await;
                    n += 1;
                }
            }
        }
    }
}
