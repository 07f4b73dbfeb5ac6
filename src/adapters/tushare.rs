//! Tushare Pro adapter: token-gated API, suffix-qualified codes.

use std::env;

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate};

pub const TOKEN_ENV: &str = "TUSHARE_TOKEN";

/// Shares per lot in the vendor's `vol` column.
const SHARES_PER_LOT: f64 = 100.0;
/// The vendor reports `amount` in thousands of CNY.
const CNY_PER_AMOUNT_UNIT: f64 = 1_000.0;

/// Wire boundary for the pro API's `daily` endpoint. Dates travel in the
/// vendor's compact `YYYYMMDD` form.
pub trait TushareClient: Send + Sync {
    fn daily(
        &self,
        token: &str,
        ts_code: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<TushareDailyRow>, FetchError>;
}

/// One record of the `daily` response, vendor field names preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct TushareDailyRow {
    /// Compact `YYYYMMDD`.
    pub trade_date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Lots.
    pub vol: f64,
    /// Thousands of CNY.
    pub amount: f64,
    pub pct_chg: f64,
}

/// Tushare's `ts_code` form: `600519.SH`, `000001.SZ`, `430047.BJ`.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    format!("{}.{}", symbol.code(), symbol.exchange().as_str())
}

fn compact(date: TradeDate) -> String {
    date.to_string().replace('-', "")
}

pub struct TushareFetcher {
    client: Box<dyn TushareClient>,
    token: String,
    indicators: IndicatorConfig,
}

impl TushareFetcher {
    /// Fails fast when `TUSHARE_TOKEN` is not configured, so a credential-less
    /// deployment never occupies a failover slot.
    pub fn from_env(client: impl TushareClient + 'static) -> Result<Self, FetchError> {
        let token = env::var(TOKEN_ENV)
            .map_err(|_| FetchError::data_fetch(format!("{TOKEN_ENV} is not configured")))?;
        Ok(Self::with_token(client, token))
    }

    pub fn with_token(client: impl TushareClient + 'static, token: impl Into<String>) -> Self {
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

impl DailyBarFetcher for TushareFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Tushare
    }

    fn priority(&self) -> i32 {
        0
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let rows = self.client.daily(
            &self.token,
            &vendor_code(symbol),
            &compact(start),
            &compact(end),
        )?;

        let raw = rows
            .into_iter()
            .map(map_row)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }
}

fn map_row(row: TushareDailyRow) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        date: TradeDate::parse(&row.trade_date)?,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: Some((row.vol * SHARES_PER_LOT) as u64),
        amount: Some(row.amount * CNY_PER_AMOUNT_UNIT),
        pct_chg: Some(row.pct_chg),
    })
}
