//! Retry with exponential backoff, applied uniformly to every adapter.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::fetcher::FetchError;
use crate::ProviderId;

/// Backoff strategy between retry attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Fixed delay between retries.
    Fixed { delay: Duration },
    /// Exponential delay: `base * factor^attempt`, capped at `max`. When
    /// `jitter` is set a random +/- 50% offset is applied, still clamped to
    /// `max` so the delay never exceeds the cap.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_secs(1),
            factor: 2.0,
            max: Duration::from_secs(5),
            jitter: false,
        }
    }
}

impl Backoff {
    /// Delay for a 0-based retry attempt.
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let scale = factor.powi(attempt as i32);
                let seconds = (base.as_secs_f64() * scale).min(max.as_secs_f64());
                let mut delay = Duration::from_secs_f64(seconds);

                if jitter {
                    let jitter_ms = (delay.as_millis() as f64 * 0.5) as u64;
                    let offset = fastrand::u64(0..=(jitter_ms * 2)) as i64 - jitter_ms as i64;
                    let total_ms = (delay.as_millis() as i64 + offset).max(0) as u64;
                    delay = Duration::from_millis(total_ms).min(max);
                }

                delay
            }
        }
    }
}

/// Retry policy wrapped around a single adapter's fetch attempt.
///
/// Only classified retryable errors (`DataFetch`, `RateLimited`) are retried;
/// contract violations propagate immediately. After the attempt cap the last
/// error escalates to the manager as this adapter's failure.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::default(),
        }
    }
}

impl RetryPolicy {
    /// Policy with no sleeping between attempts. Used in tests and by
    /// callers that pace externally.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed {
                delay: Duration::ZERO,
            },
        }
    }

    pub fn run<T>(
        &self,
        provider: ProviderId,
        mut op: impl FnMut() -> Result<T, FetchError>,
    ) -> Result<T, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if !error.retryable() || attempt >= self.max_attempts.max(1) {
                        return Err(error);
                    }

                    let delay = self.backoff.delay(attempt - 1);
                    warn!(
                        provider = %provider,
                        error = %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "fetch attempt failed, backing off before retry"
                    );
                    thread::sleep(delay);
                }
            }
        }
    }
}
