use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Something that can wait. Injected so retry timing is observable in tests.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock waits on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Exponential backoff without jitter: attempt `n` that fails waits `base * 2^n`
/// before attempt `n + 1`, until `max_retries` retries have been spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Wait after a failure of `attempt` (0-based), or `None` when the error
    /// must propagate. Only the retry count ends the loop; the delay itself
    /// saturates instead of overflowing.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            return None;
        }
        Some(self.base_delay.saturating_mul(2u32.saturating_pow(attempt)))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Sum of every wait before the final failure.
    pub fn total_backoff(&self) -> Duration {
        (0..self.max_retries)
            .filter_map(|n| self.delay_for(n))
            .fold(Duration::ZERO, |acc, d| acc.saturating_add(d))
    }

    /// Run `op` until it succeeds or the schedule runs out. `op` receives the
    /// attempt number. The last error is returned as-is.
    pub async fn run<T, E, F, Fut>(&self, sleeper: &dyn Sleeper, mut op: F) -> Result<T, E>
    where
        E: std::fmt::Display,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 0u32;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => match self.delay_for(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "analysis attempt failed, retrying"
                        );
                        sleeper.sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        tracing::warn!(attempt, error = %err, "analysis failed, giving up");
                        return Err(err);
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct RecordingSleeper {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.waits.lock().push(duration);
        }
    }

    #[test]
    fn schedule_doubles_then_stops() {
        let policy = RetryPolicy::default();
        for n in 0..5 {
            assert_eq!(policy.delay_for(n), Some(Duration::from_secs(1 << n)));
        }
        assert_eq!(policy.delay_for(5), None);
        assert_eq!(policy.delay_for(40), None);
        assert_eq!(policy.max_attempts(), 6);
        assert_eq!(policy.total_backoff(), Duration::from_secs(31));
    }

    #[test]
    fn large_retry_counts_keep_retrying() {
        let policy = RetryPolicy::new(40, Duration::from_secs(1));
        assert_eq!(policy.delay_for(31), Some(Duration::from_secs(1 << 31)));
        let capped = Duration::from_secs(u64::from(u32::MAX));
        assert_eq!(policy.delay_for(32), Some(capped));
        assert_eq!(policy.delay_for(39), Some(capped));
        assert_eq!(policy.delay_for(40), None);
        assert_eq!(policy.max_attempts(), 41);

        let huge = RetryPolicy::new(3, Duration::MAX);
        assert_eq!(huge.delay_for(2), Some(Duration::MAX));
        assert_eq!(huge.total_backoff(), Duration::MAX);
    }

    #[test]
    fn zero_retries_never_waits() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.delay_for(0), None);
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = RetryPolicy::default()
            .run(&sleeper, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(format!("boom {attempt}"))
                    } else {
                        Ok("done")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *sleeper.waits.lock(),
            vec![Duration::from_secs(1), Duration::from_secs(2)]
        );
    }

    #[tokio::test]
    async fn exhausted_schedule_returns_last_error_unchanged() {
        let sleeper = RecordingSleeper::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = RetryPolicy::default()
            .run(&sleeper, |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Err(format!("failure on attempt {attempt}")) }
            })
            .await;

        assert_eq!(result, Err("failure on attempt 5".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        let waits = sleeper.waits.lock();
        assert_eq!(waits.len(), 5);
        assert_eq!(waits.iter().sum::<Duration>(), Duration::from_secs(31));
    }
}
