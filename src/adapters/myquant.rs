//! MyQuant (gm) adapter: token-gated SDK, `SHSE.`/`SZSE.`/`BJSE.` codes.

use std::env;

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, Exchange, ProviderId, SecurityCode, TradeDate};

pub const TOKEN_ENV: &str = "MYQUANT_TOKEN";

const SHARES_PER_LOT: f64 = 100.0;

/// Wire boundary for the gm SDK. `history_bars` covers daily frequency only;
/// `instrument_name` resolves the security's display name.
pub trait MyquantClient: Send + Sync {
    fn history_bars(
        &self,
        token: &str,
        vendor_code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<MyquantBar>, FetchError>;

    fn instrument_name(
        &self,
        token: &str,
        vendor_code: &str,
    ) -> Result<Option<String>, FetchError>;
}

/// One bar from `history`, vendor field names preserved. `eob` is the
/// bar-end timestamp (`2024-01-02 15:00:00+08:00` style).
#[derive(Debug, Clone, PartialEq)]
pub struct MyquantBar {
    pub eob: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Lots.
    pub volume: f64,
    pub amount: f64,
}

/// gm's exchange-prefixed form: `SHSE.600519`, `SZSE.000001`, `BJSE.430047`.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    let prefix = match symbol.exchange() {
        Exchange::Shanghai => "SHSE",
        Exchange::Shenzhen => "SZSE",
        Exchange::Beijing => "BJSE",
    };
    format!("{prefix}.{}", symbol.code())
}

pub struct MyquantFetcher {
    client: Box<dyn MyquantClient>,
    token: String,
    indicators: IndicatorConfig,
}

impl MyquantFetcher {
    /// Fails fast when `MYQUANT_TOKEN` is not configured.
    pub fn from_env(client: impl MyquantClient + 'static) -> Result<Self, FetchError> {
        let token = env::var(TOKEN_ENV)
            .map_err(|_| FetchError::data_fetch(format!("{TOKEN_ENV} is not configured")))?;
        Ok(Self::with_token(client, token))
    }

    pub fn with_token(client: impl MyquantClient + 'static, token: impl Into<String>) -> Self {
        Self {
            client: Box::new(client),
            token: token.into(),
            indicators: IndicatorConfig::default(),
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }
}

impl DailyBarFetcher for MyquantFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Myquant
    }

    fn priority(&self) -> i32 {
        -1
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let rows = self
            .client
            .history_bars(&self.token, &vendor_code(symbol), start, end)?;

        let raw = rows
            .into_iter()
            .map(map_bar)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }

    fn instrument_name(&self, symbol: &SecurityCode) -> Result<Option<String>, FetchError> {
        self.client.instrument_name(&self.token, &vendor_code(symbol))
    }
}

fn map_bar(bar: MyquantBar) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        // eob carries a time component; only the calendar date survives.
        date: TradeDate::parse(&bar.eob)?,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: Some((bar.volume * SHARES_PER_LOT) as u64),
        amount: Some(bar.amount),
        pct_chg: None,
    })
}
