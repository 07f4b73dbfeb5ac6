//! MiniQMT (xtquant) adapter: reads from a locally running trader client,
//! `SH.`/`SZ.`/`BJ.` codes. Highest priority when the client is up because
//! the data is already on disk.

use crate::fetcher::{
    fetch_window, finalize_series, DailyBarFetcher, FetchError, RealtimeQuote,
};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate};

const SHARES_PER_LOT: f64 = 100.0;

/// Wire boundary for the local xtquant client.
///
/// `download_history` is an explicit side effect: it tops up the client's
/// on-disk store for the window before `local_daily_bars` reads it back. It
/// must be idempotent for the same code and window.
pub trait MiniqmtClient: Send + Sync {
    /// True when the trader client process is reachable.
    fn connected(&self) -> bool;

    fn download_history(
        &self,
        vendor_code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<(), FetchError>;

    fn local_daily_bars(
        &self,
        vendor_code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<MiniqmtBar>, FetchError>;

    fn realtime_tick(&self, vendor_code: &str) -> Result<Option<MiniqmtTick>, FetchError>;

    fn instrument_detail(&self, vendor_code: &str) -> Result<Option<String>, FetchError>;
}

/// One daily bar from the local store, vendor field names preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniqmtBar {
    /// Bar date, dashed or compact.
    pub time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Lots.
    pub volume: f64,
    pub amount: f64,
    /// Percent change; the vendor's own spelling.
    pub pcp_chg: f64,
}

/// Last tick from the client's realtime feed.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniqmtTick {
    pub last_price: f64,
    /// Lots.
    pub volume: f64,
}

/// xtquant's short exchange-prefixed form: `SH.600519`, `SZ.000001`, `BJ.430047`.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    format!("{}.{}", symbol.exchange().as_str(), symbol.code())
}

pub struct MiniqmtFetcher {
    client: Box<dyn MiniqmtClient>,
    indicators: IndicatorConfig,
}

impl MiniqmtFetcher {
    /// Probes the local client and fails fast when it is not running, so the
    /// adapter never occupies the top failover slot on a machine without the
    /// trader client.
    pub fn connect(client: impl MiniqmtClient + 'static) -> Result<Self, FetchError> {
        if !client.connected() {
            return Err(FetchError::data_fetch("miniqmt trader client is not running"));
        }
        Ok(Self {
            client: Box::new(client),
            indicators: IndicatorConfig::default(),
        })
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }
}

impl DailyBarFetcher for MiniqmtFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Miniqmt
    }

    fn priority(&self) -> i32 {
        -2
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let code = vendor_code(symbol);

        self.client.download_history(&code, start, end)?;
        let rows = self.client.local_daily_bars(&code, start, end)?;

        let raw = rows
            .into_iter()
            .map(map_bar)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }

    fn realtime_quote(&self, symbol: &SecurityCode) -> Result<Option<RealtimeQuote>, FetchError> {
        let tick = self.client.realtime_tick(&vendor_code(symbol))?;
        Ok(tick.map(|tick| RealtimeQuote {
            symbol: symbol.clone(),
            last: tick.last_price,
            volume: (tick.volume * SHARES_PER_LOT) as u64,
        }))
    }

    fn instrument_name(&self, symbol: &SecurityCode) -> Result<Option<String>, FetchError> {
        self.client.instrument_detail(&vendor_code(symbol))
    }
}

fn map_bar(bar: MiniqmtBar) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        date: TradeDate::parse(&bar.time)?,
        open: bar.open,
        high: bar.high,
        low: bar.low,
        close: bar.close,
        volume: Some((bar.volume * SHARES_PER_LOT) as u64),
        amount: Some(bar.amount),
        pct_chg: Some(bar.pcp_chg),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CannedClient {
        connected: bool,
        downloads: Arc<AtomicUsize>,
        rows: Vec<MiniqmtBar>,
    }

    impl MiniqmtClient for CannedClient {
        fn connected(&self) -> bool {
            self.connected
        }

        fn download_history(
            &self,
            vendor_code: &str,
            _start: TradeDate,
            _end: TradeDate,
        ) -> Result<(), FetchError> {
            assert_eq!(vendor_code, "SH.600519");
            self.downloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn local_daily_bars(
            &self,
            _vendor_code: &str,
            _start: TradeDate,
            _end: TradeDate,
        ) -> Result<Vec<MiniqmtBar>, FetchError> {
            Ok(self.rows.clone())
        }

        fn realtime_tick(&self, _vendor_code: &str) -> Result<Option<MiniqmtTick>, FetchError> {
            Ok(Some(MiniqmtTick {
                last_price: 1_700.0,
                volume: 55.0,
            }))
        }

        fn instrument_detail(&self, _vendor_code: &str) -> Result<Option<String>, FetchError> {
            Ok(Some("贵州茅台".to_owned()))
        }
    }

    fn client(rows: Vec<MiniqmtBar>) -> CannedClient {
        CannedClient {
            connected: true,
            downloads: Arc::new(AtomicUsize::new(0)),
            rows,
        }
    }

    fn bar(time: &str, close: f64) -> MiniqmtBar {
        MiniqmtBar {
            time: time.to_owned(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 20.0,
            amount: close * 2_000.0,
            pcp_chg: 1.1,
        }
    }

    #[test]
    fn connect_fails_fast_when_client_is_down() {
        let mut down = client(vec![]);
        down.connected = false;

        let err = MiniqmtFetcher::connect(down).err().expect("must fail");
        assert!(err.message().contains("not running"));
    }

    #[test]
    fn downloads_before_reading_local_store() {
        let downloads = Arc::new(AtomicUsize::new(0));
        let fetcher = MiniqmtFetcher::connect(CannedClient {
            connected: true,
            downloads: Arc::clone(&downloads),
            rows: vec![bar("20240102", 1_690.0)],
        })
        .expect("must connect");
        let symbol = SecurityCode::parse("600519").expect("must parse");

        let series = fetcher.get_daily_data(&symbol, 5).expect("must fetch");
        assert_eq!(downloads.load(Ordering::SeqCst), 1);
        assert_eq!(series.bars[0].volume, 2_000);
        assert_eq!(series.bars[0].pct_chg, 1.1);
    }

    #[test]
    fn realtime_quote_converts_lots() {
        let fetcher = MiniqmtFetcher::connect(client(vec![])).expect("must connect");
        let symbol = SecurityCode::parse("600519").expect("must parse");

        let quote = fetcher
            .realtime_quote(&symbol)
            .expect("must resolve")
            .expect("tick available");
        assert_eq!(quote.last, 1_700.0);
        assert_eq!(quote.volume, 5_500);
    }
}
