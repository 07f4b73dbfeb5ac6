//! Efinance adapter: free Eastmoney-backed source, plain 6-digit codes.

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate};

const SHARES_PER_LOT: f64 = 100.0;

/// Wire boundary for the vendor's daily quote-history endpoint.
pub trait EfinanceClient: Send + Sync {
    fn stock_quote_history(
        &self,
        code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<EfinanceRow>, FetchError>;
}

/// One row of the vendor's history table. The wire format uses Chinese
/// column headers (日期/开盘/收盘/最高/最低/成交量/成交额/涨跌幅); the client
/// maps them into this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct EfinanceRow {
    pub date: String,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    /// Lots.
    pub volume: f64,
    /// CNY.
    pub amount: f64,
    /// Percent.
    pub pct_chg: f64,
}

/// Efinance takes the bare 6-digit code.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    symbol.code().to_owned()
}

pub struct EfinanceFetcher {
    client: Box<dyn EfinanceClient>,
    indicators: IndicatorConfig,
}

impl EfinanceFetcher {
    pub fn new(client: impl EfinanceClient + 'static) -> Self {
        Self {
            client: Box::new(client),
            indicators: IndicatorConfig::default(),
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }
}

impl DailyBarFetcher for EfinanceFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Efinance
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
        let rows = self
            .client
            .stock_quote_history(&vendor_code(symbol), start, end)?;

        let raw = rows
            .into_iter()
            .map(map_row)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }
}

fn map_row(row: EfinanceRow) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        date: TradeDate::parse(&row.date)?,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: Some((row.volume * SHARES_PER_LOT) as u64),
        amount: Some(row.amount),
        pct_chg: Some(row.pct_chg),
    })
}
