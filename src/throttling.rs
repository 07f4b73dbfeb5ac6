//! Anti-ban pacing applied per vendor before every fetch attempt.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::ProviderId;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Pacing quota for one vendor. Defaults reflect published or observed
/// limits; local-client vendors get generous quotas, scraped free sources
/// get conservative ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider: ProviderId,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl ProviderPolicy {
    pub fn new(provider: ProviderId, quota_window: Duration, quota_limit: u32) -> Self {
        Self {
            provider,
            quota_window,
            quota_limit,
        }
    }

    pub fn default_for(provider: ProviderId) -> Self {
        let per_minute = |limit| Self::new(provider, Duration::from_secs(60), limit);
        match provider {
            // Local client, data is already on disk.
            ProviderId::Miniqmt => per_minute(600),
            ProviderId::Myquant => per_minute(120),
            // Free tier of the pro API.
            ProviderId::Tushare => per_minute(200),
            ProviderId::Efinance => per_minute(60),
            ProviderId::Baostock => per_minute(60),
            ProviderId::Yfinance => per_minute(48),
            // Scraping-backed; pace hardest to avoid bans.
            ProviderId::Akshare => per_minute(30),
        }
    }
}

/// Rate gate in front of one vendor.
///
/// `acquire` is non-blocking: when quota is available it spends one cell and
/// returns `Ok`, otherwise it returns the delay the caller should sleep
/// before issuing the request. Consecutive deferrals escalate the suggested
/// delay exponentially up to a cap.
#[derive(Clone)]
pub struct ThrottleGate {
    limiter: Arc<DirectRateLimiter>,
    deferrals: Arc<Mutex<u32>>,
    base_wait: Duration,
    max_wait: Duration,
}

impl ThrottleGate {
    pub fn new(quota_window: Duration, quota_limit: u32) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_window(
                quota_window,
                quota_limit,
            ))),
            deferrals: Arc::new(Mutex::new(0)),
            base_wait: Duration::from_secs(1),
            max_wait: Duration::from_secs(5),
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.quota_window, policy.quota_limit)
    }

    /// Try to spend rate budget; on exhaustion return the recommended wait.
    pub fn acquire(&self) -> Result<(), Duration> {
        let mut deferrals = self
            .deferrals
            .lock()
            .expect("throttle state should not be poisoned");

        if self.limiter.check().is_ok() {
            *deferrals = 0;
            return Ok(());
        }

        let exponent = (*deferrals).min(8);
        *deferrals = deferrals.saturating_add(1);

        let wait = self.base_wait.as_secs_f64() * 2_f64.powi(exponent as i32);
        Err(Duration::from_secs_f64(wait.min(self.max_wait.as_secs_f64())))
    }

    pub fn deferrals(&self) -> u32 {
        *self
            .deferrals
            .lock()
            .expect("throttle state should not be poisoned")
    }
}

fn quota_from_window(quota_window: Duration, quota_limit: u32) -> Quota {
    let safe_limit = quota_limit.max(1);
    let burst = NonZeroU32::new(safe_limit).expect("safe limit must be non-zero");

    let seconds_per_cell = (quota_window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .expect("period is always greater than zero")
        .allow_burst(burst)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defers_when_quota_is_exhausted() {
        let gate = ThrottleGate::new(Duration::from_secs(60), 2);

        assert!(gate.acquire().is_ok());
        assert!(gate.acquire().is_ok());

        let wait = gate.acquire().expect_err("third request should defer");
        assert_eq!(wait, Duration::from_secs(1));
        assert_eq!(gate.deferrals(), 1);
    }

    #[test]
    fn deferral_wait_escalates_and_caps() {
        let gate = ThrottleGate::new(Duration::from_secs(60), 1);
        assert!(gate.acquire().is_ok());

        assert_eq!(gate.acquire().expect_err("deferred"), Duration::from_secs(1));
        assert_eq!(gate.acquire().expect_err("deferred"), Duration::from_secs(2));
        assert_eq!(gate.acquire().expect_err("deferred"), Duration::from_secs(4));
        assert_eq!(gate.acquire().expect_err("deferred"), Duration::from_secs(5));
        assert_eq!(gate.acquire().expect_err("deferred"), Duration::from_secs(5));
    }

    #[test]
    fn every_provider_has_a_default_policy() {
        for provider in ProviderId::ALL {
            let policy = ProviderPolicy::default_for(provider);
            assert!(policy.quota_limit > 0, "{provider}");
        }
    }
}
