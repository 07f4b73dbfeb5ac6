//! Yahoo Finance adapter: last-resort fallback, `.SS`/`.SZ` suffix tickers.
//! Beijing-listed securities have no Yahoo ticker and fail immediately.

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, Exchange, ProviderId, SecurityCode, TradeDate};

/// Wire boundary for the ticker history endpoint.
pub trait YfinanceClient: Send + Sync {
    fn history(
        &self,
        ticker: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<YfinanceRow>, FetchError>;
}

/// One row of the ticker's daily history. Yahoo reports neither turnover
/// amount nor percent change for A-shares; both are left for the shared
/// normalization pass to default and derive.
#[derive(Debug, Clone, PartialEq)]
pub struct YfinanceRow {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Already shares.
    pub volume: u64,
}

/// Yahoo's suffix form: `600519.SS`, `000001.SZ`. No Beijing coverage.
pub fn vendor_code(symbol: &SecurityCode) -> Result<String, FetchError> {
    let suffix = match symbol.exchange() {
        Exchange::Shanghai => "SS",
        Exchange::Shenzhen => "SZ",
        Exchange::Beijing => {
            return Err(FetchError::data_fetch(format!(
                "yfinance has no ticker for Beijing-listed {symbol}"
            )))
        }
    };
    Ok(format!("{}.{suffix}", symbol.code()))
}

pub struct YfinanceFetcher {
    client: Box<dyn YfinanceClient>,
    indicators: IndicatorConfig,
}

impl YfinanceFetcher {
    pub fn new(client: impl YfinanceClient + 'static) -> Self {
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

impl DailyBarFetcher for YfinanceFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Yfinance
    }

    fn priority(&self) -> i32 {
        4
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let ticker = vendor_code(symbol)?;
        let rows = self.client.history(&ticker, start, end)?;

        let raw = rows
            .into_iter()
            .map(map_row)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }
}

fn map_row(row: YfinanceRow) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        date: TradeDate::parse(&row.date)?,
        open: row.open,
        high: row.high,
        low: row.low,
        close: row.close,
        volume: Some(row.volume),
        amount: None,
        pct_chg: None,
    })
}
