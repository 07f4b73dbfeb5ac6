use std::fmt::{Display, Formatter};

use crate::indicators::{self, IndicatorConfig};
use crate::normalize::{normalize, RawDailyBar};
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate, ValidationError};

/// Calendar padding added to the requested trading-day count so the raw
/// window absorbs weekends, holidays, and vendor off-by-few behavior.
pub const FETCH_WINDOW_PAD_DAYS: i64 = 30;

/// Classification an adapter error must carry so the retry policy and the
/// manager can tell transient failures from contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    /// Vendor call failed, returned empty or malformed data, or the symbol
    /// could not be resolved in the vendor's code format. Retry-eligible.
    DataFetch,
    /// Vendor explicitly throttled the caller. Retry-eligible with backoff.
    RateLimited,
    /// The adapter broke the fetcher contract. Never retried; the manager
    /// logs it distinctly and fails over immediately.
    Contract,
}

/// Structured error every adapter re-wraps vendor failures into. No other
/// error type may cross the fetcher boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn data_fetch(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::DataFetch,
            message: message.into(),
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: message.into(),
        }
    }

    pub fn contract(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Contract,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        matches!(self.kind, FetchErrorKind::DataFetch | FetchErrorKind::RateLimited)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::DataFetch => "fetch.data",
            FetchErrorKind::RateLimited => "fetch.rate_limited",
            FetchErrorKind::Contract => "fetch.contract",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

// A vendor payload that cannot form a valid canonical record is malformed
// vendor data, so it classifies as DataFetch rather than Contract.
impl From<ValidationError> for FetchError {
    fn from(error: ValidationError) -> Self {
        Self::data_fetch(error.to_string())
    }
}

/// Snapshot of the current trading session for one symbol. Optional
/// capability; only some vendors expose it.
#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeQuote {
    pub symbol: SecurityCode,
    pub last: f64,
    pub volume: u64,
}

/// Contract every vendor adapter must satisfy.
///
/// `get_daily_data` returns the trailing `days` trading days for `symbol`,
/// normalized into the canonical schema and enriched with indicators. Partial
/// data (fewer than `days` bars near the start of a symbol's history) is not
/// an error. Side effects (e.g. a local incremental download before reading)
/// are permitted but must be idempotent for the same symbol and window.
pub trait DailyBarFetcher: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Failover rank. Lower is tried earlier; negative values mark vendors
    /// that need privileged local configuration (token or running client).
    fn priority(&self) -> i32;

    /// Anti-ban pacing quota for this vendor.
    fn policy(&self) -> crate::throttling::ProviderPolicy {
        crate::throttling::ProviderPolicy::default_for(self.id())
    }

    fn get_daily_data(&self, symbol: &SecurityCode, days: usize)
        -> Result<DailySeries, FetchError>;

    /// Optional capability. Adapters without realtime access return
    /// `Ok(None)` rather than erroring, so callers can probe safely.
    fn realtime_quote(&self, symbol: &SecurityCode) -> Result<Option<RealtimeQuote>, FetchError> {
        let _ = symbol;
        Ok(None)
    }

    /// Optional capability: the instrument's display name. `Ok(None)` when
    /// unsupported or not found.
    fn instrument_name(&self, symbol: &SecurityCode) -> Result<Option<String>, FetchError> {
        let _ = symbol;
        Ok(None)
    }
}

/// Raw calendar window for a request of `days` trading days, ending today.
pub fn fetch_window(days: usize) -> (TradeDate, TradeDate) {
    let end = TradeDate::today();
    let start = end.days_before(days as i64 + FETCH_WINDOW_PAD_DAYS);
    (start, end)
}

/// Shared tail of every adapter's `get_daily_data`: normalize the raw
/// records, enrich with indicators, then truncate to the trailing `days`
/// bars. Enrichment runs before truncation so lookback windows can use the
/// padded history.
pub fn finalize_series(
    symbol: SecurityCode,
    raw: Vec<RawDailyBar>,
    config: &IndicatorConfig,
    days: usize,
) -> Result<DailySeries, FetchError> {
    if raw.is_empty() {
        return Err(FetchError::data_fetch(format!(
            "vendor returned no bars for {symbol}"
        )));
    }

    let bars = normalize(raw)?;
    let mut columns = indicators::compute(&bars, config);

    let keep_from = bars.len().saturating_sub(days);
    let bars = bars[keep_from..].to_vec();
    for column in &mut columns {
        column.values.drain(..keep_from);
    }

    Ok(DailySeries::new(symbol, bars, columns))
}
