use super::constants::MIN_RETRY_DELAY;
use std::future::Future;
use std::time::Duration;

/// Retry policy for cache-miss network calls.
///
/// A failed call is retried up to `attempts` more times, waiting a constant `delay`
/// between tries. The total number of calls is therefore at most `attempts + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// How many extra tries are made after the first failure. `0` disables retrying.
    pub attempts: u32,
    /// Wait between tries. Values below one second are raised to one second.
    pub delay: Duration,
}

impl RetryConfig {
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// The delay actually used between tries: `delay`, but never less than one second.
    pub fn effective_delay(&self) -> Duration {
        self.delay.max(MIN_RETRY_DELAY)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: MIN_RETRY_DELAY,
        }
    }
}

/// Run `operation` until it succeeds or the retry budget in `retry` is spent.
///
/// The first success is returned immediately. After the final failure the error is
/// returned exactly as `operation` produced it. The wait between tries is a tokio
/// timer, so other tasks keep running.
pub async fn with_retry<T, E, F, Fut>(retry: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let delay = retry.effective_delay();
    let mut remaining = retry.attempts;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if remaining == 0 => return Err(e),
            Err(_) => {
                remaining -= 1;
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    remaining,
                    delay = ?delay,
                    "request failed; retrying after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
