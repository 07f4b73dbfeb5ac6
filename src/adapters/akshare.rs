//! Akshare adapter: free scraping-backed source, plain 6-digit codes.

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate};

/// Shares per lot in the vendor's volume column.
const SHARES_PER_LOT: f64 = 100.0;

/// Wire boundary for the `stock_zh_a_hist` endpoint. The production client
/// scrapes Eastmoney through the akshare service; tests substitute a canned
/// implementation.
pub trait AkshareClient: Send + Sync {
    fn stock_zh_a_hist(
        &self,
        code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<AkshareDailyRow>, FetchError>;
}

/// One row of the vendor's daily history table. Column headers are Chinese
/// on the wire; the client maps them positionally into this struct.
#[derive(Debug, Clone, PartialEq)]
pub struct AkshareDailyRow {
    /// 日期, dashed `YYYY-MM-DD`.
    pub date: String,
    /// 开盘
    pub open: f64,
    /// 最高
    pub high: f64,
    /// 最低
    pub low: f64,
    /// 收盘
    pub close: f64,
    /// 成交量, lots.
    pub volume: f64,
    /// 成交额, CNY.
    pub amount: f64,
    /// 涨跌幅, percent.
    pub pct_chg: f64,
}

/// Akshare takes the bare 6-digit code with no exchange qualifier.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    symbol.code().to_owned()
}

pub struct AkshareFetcher {
    client: Box<dyn AkshareClient>,
    indicators: IndicatorConfig,
}

impl AkshareFetcher {
    pub fn new(client: impl AkshareClient + 'static) -> Self {
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

impl DailyBarFetcher for AkshareFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Akshare
    }

    fn priority(&self) -> i32 {
        1
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let rows = self
            .client
            .stock_zh_a_hist(&vendor_code(symbol), start, end)?;

        let raw = rows
            .into_iter()
            .map(map_row)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }
}

fn map_row(row: AkshareDailyRow) -> Result<RawDailyBar, FetchError> {
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
