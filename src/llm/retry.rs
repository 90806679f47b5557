use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::llm::LLMError;

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Initial retry delay in milliseconds
    pub initial_retry_delay_ms: u64,
    /// Maximum retry delay in milliseconds
    pub max_retry_delay_ms: u64,
    /// Whether to use exponential backoff
    pub use_exponential_backoff: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_retry_delay_ms: 1_000,
            max_retry_delay_ms: 30_000,
            use_exponential_backoff: true,
        }
    }
}

impl RetryConfig {
    /// A policy that makes exactly one attempt
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `retry` (1-based)
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.initial_retry_delay_ms;
        let millis = if self.use_exponential_backoff {
            let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
            base.saturating_mul(factor)
        } else {
            base
        };
        Duration::from_millis(millis.min(self.max_retry_delay_ms))
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the retry budget is spent
pub async fn retry_with_backoff<T, F, Fut>(config: &RetryConfig, mut op: F) -> Result<T, LLMError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LLMError>>,
{
    let mut retries = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && retries < config.max_retries => {
                retries += 1;
                let delay = config.delay_for(retries);
                warn!("LLM call failed ({}), retry {}/{} in {:?}", e, retries, config.max_retries, delay);
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_retry_delay_ms: 1,
            max_retry_delay_ms: 5,
            use_exponential_backoff: true,
        }
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(config.delay_for(2), Duration::from_millis(2_000));
        assert_eq!(config.delay_for(3), Duration::from_millis(4_000));
        assert_eq!(config.delay_for(10), Duration::from_millis(30_000));
        assert_eq!(config.delay_for(200), Duration::from_millis(30_000));
    }

    #[test]
    fn test_constant_delay() {
        let config = RetryConfig {
            use_exponential_backoff: false,
            ..Default::default()
        };
        assert_eq!(config.delay_for(1), config.delay_for(5));
    }

    #[tokio::test]
    async fn test_recovers_from_transient_failure() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result = retry_with_backoff(&fast(2), move || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(LLMError::RateLimitExceeded("slow down".to_string()))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_config_errors_are_not_retried() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result: Result<(), _> = retry_with_backoff(&fast(5), move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(LLMError::ConfigError("missing key".to_string()))
        })
        .await;

        assert!(matches!(result, Err(LLMError::ConfigError(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_gives_up_after_budget() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;
        let result: Result<(), _> = retry_with_backoff(&fast(2), move || async move {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err(LLMError::RequestFailed("boom".to_string()))
        })
        .await;

        assert!(matches!(result, Err(LLMError::RequestFailed(_))));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
