//! Priority-ordered failover across registered vendor adapters.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::fetcher::{DailyBarFetcher, FetchError, FetchErrorKind};
use crate::retry::RetryPolicy;
use crate::throttling::ThrottleGate;
use crate::{DailySeries, ProviderId, SecurityCode};

/// One adapter's final failure within a single orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: ProviderId,
    pub error: FetchError,
}

/// Every registered adapter exhausted its attempts for this call. Carries the
/// ordered list of final failures for diagnostics; the manager never retries
/// this automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllSourcesFailed {
    pub failures: Vec<SourceFailure>,
    /// True when the overall deadline aborted the failover loop before every
    /// adapter was tried.
    pub deadline_exceeded: bool,
}

impl Display for AllSourcesFailed {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.deadline_exceeded {
            write!(f, "deadline reached after {} source(s) failed", self.failures.len())?;
        } else {
            write!(f, "all {} source(s) failed", self.failures.len())?;
        }
        for failure in &self.failures {
            write!(f, "; {}: {}", failure.source, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for AllSourcesFailed {}

/// Successful orchestration result: the enriched series plus the name of the
/// adapter that actually answered.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchOutcome {
    pub series: DailySeries,
    pub source: ProviderId,
}

/// Builds a [`FetchManager`] from pre-constructed adapters or fallible
/// adapter constructors. Construction failures (missing token, client not
/// running) are logged and the adapter is omitted entirely, so a broken
/// vendor never occupies a priority slot during failover.
#[derive(Default)]
pub struct FetchManagerBuilder {
    adapters: Vec<Arc<dyn DailyBarFetcher>>,
    retry: Option<RetryPolicy>,
    deadline: Option<Duration>,
}

impl FetchManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adapter(mut self, adapter: impl DailyBarFetcher + 'static) -> Self {
        self.adapters.push(Arc::new(adapter));
        self
    }

    pub fn shared_adapter(mut self, adapter: Arc<dyn DailyBarFetcher>) -> Self {
        self.adapters.push(adapter);
        self
    }

    /// Register the adapter if its constructor succeeded; otherwise log the
    /// failure and leave it out.
    pub fn try_adapter<A: DailyBarFetcher + 'static>(self, built: Result<A, FetchError>) -> Self {
        match built {
            Ok(adapter) => self.adapter(adapter),
            Err(construct_error) => {
                warn!(error = %construct_error, "source failed to construct, excluded from failover");
                self
            }
        }
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Overall wall-clock budget for one `get_daily_data` call. When it runs
    /// out, remaining adapters are skipped and the call fails early.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn build(self) -> FetchManager {
        let mut adapters = self.adapters;
        // Stable sort: ties keep registration order.
        adapters.sort_by_key(|adapter| adapter.priority());

        let gates = adapters
            .iter()
            .map(|adapter| (adapter.id(), ThrottleGate::from_policy(&adapter.policy())))
            .collect();

        FetchManager {
            adapters,
            gates,
            retry: self.retry.unwrap_or_default(),
            deadline: self.deadline,
        }
    }
}

/// Owns the immutable, priority-ordered adapter registry and orchestrates
/// one fetch: adapters are tried strictly in order, each attempt wrapped by
/// the shared retry policy and paced by the vendor's throttle gate, stopping
/// at the first success. Synchronous and single-threaded per call; the
/// registry itself is read-only and safe to share.
pub struct FetchManager {
    adapters: Vec<Arc<dyn DailyBarFetcher>>,
    gates: HashMap<ProviderId, ThrottleGate>,
    retry: RetryPolicy,
    deadline: Option<Duration>,
}

impl FetchManager {
    pub fn builder() -> FetchManagerBuilder {
        FetchManagerBuilder::new()
    }

    /// Registered sources in the order they will be tried.
    pub fn sources(&self) -> Vec<ProviderId> {
        self.adapters.iter().map(|adapter| adapter.id()).collect()
    }

    pub fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<FetchOutcome, AllSourcesFailed> {
        let started = Instant::now();
        let mut failures = Vec::new();

        for adapter in &self.adapters {
            let provider = adapter.id();

            if let Some(deadline) = self.deadline {
                if started.elapsed() >= deadline {
                    warn!(
                        symbol = %symbol,
                        tried = failures.len(),
                        "fetch deadline reached, aborting failover early"
                    );
                    return Err(AllSourcesFailed {
                        failures,
                        deadline_exceeded: true,
                    });
                }
            }

            if let Some(gate) = self.gates.get(&provider) {
                if let Err(wait) = gate.acquire() {
                    debug!(provider = %provider, wait_ms = wait.as_millis() as u64, "pacing vendor request");
                    thread::sleep(wait);
                }
            }

            debug!(provider = %provider, symbol = %symbol, days, "attempting source");
            match self.retry.run(provider, || adapter.get_daily_data(symbol, days)) {
                Ok(series) => {
                    info!(
                        provider = %provider,
                        symbol = %symbol,
                        bars = series.len(),
                        failed_before = failures.len(),
                        "daily data fetched"
                    );
                    return Ok(FetchOutcome {
                        series,
                        source: provider,
                    });
                }
                Err(err) => {
                    if err.kind() == FetchErrorKind::Contract {
                        error!(provider = %provider, error = %err, "source broke the fetcher contract, failing over");
                    } else {
                        warn!(provider = %provider, error = %err, "source exhausted its attempts, failing over");
                    }
                    failures.push(SourceFailure {
                        source: provider,
                        error: err,
                    });
                }
            }
        }

        Err(AllSourcesFailed {
            failures,
            deadline_exceeded: false,
        })
    }
}
