//! Baostock adapter: session-gated free source, lowercase `sh.`/`sz.`/`bj.`
//! codes, string-typed payloads.

use crate::fetcher::{fetch_window, finalize_series, DailyBarFetcher, FetchError};
use crate::indicators::IndicatorConfig;
use crate::normalize::RawDailyBar;
use crate::{DailySeries, ProviderId, SecurityCode, TradeDate};

/// Wire boundary for the baostock session. `login` must succeed before any
/// query; the production client holds the session for the process lifetime.
pub trait BaostockClient: Send + Sync {
    fn login(&self) -> Result<(), FetchError>;

    fn query_history_k_data(
        &self,
        vendor_code: &str,
        start: TradeDate,
        end: TradeDate,
    ) -> Result<Vec<BaostockRow>, FetchError>;
}

/// One k-data record. Baostock returns every field as a string; numeric
/// parsing happens in the adapter so a malformed cell surfaces as a
/// data-fetch error naming the field.
#[derive(Debug, Clone, PartialEq)]
pub struct BaostockRow {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    /// Already shares, not lots.
    pub volume: String,
    pub amount: String,
    pub pct_chg: String,
}

/// Baostock's lowercase prefixed form: `sh.600519`, `sz.000001`, `bj.430047`.
pub fn vendor_code(symbol: &SecurityCode) -> String {
    format!(
        "{}.{}",
        symbol.exchange().as_str().to_ascii_lowercase(),
        symbol.code()
    )
}

pub struct BaostockFetcher {
    client: Box<dyn BaostockClient>,
    indicators: IndicatorConfig,
}

impl BaostockFetcher {
    /// Logs in once and fails fast when the session cannot be established.
    pub fn login(client: impl BaostockClient + 'static) -> Result<Self, FetchError> {
        client.login()?;
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

impl DailyBarFetcher for BaostockFetcher {
    fn id(&self) -> ProviderId {
        ProviderId::Baostock
    }

    fn priority(&self) -> i32 {
        3
    }

    fn get_daily_data(
        &self,
        symbol: &SecurityCode,
        days: usize,
    ) -> Result<DailySeries, FetchError> {
        let (start, end) = fetch_window(days);
        let rows = self
            .client
            .query_history_k_data(&vendor_code(symbol), start, end)?;

        let raw = rows
            .into_iter()
            .map(map_row)
            .collect::<Result<Vec<_>, FetchError>>()?;

        finalize_series(symbol.clone(), raw, &self.indicators, days)
    }
}

fn map_row(row: BaostockRow) -> Result<RawDailyBar, FetchError> {
    Ok(RawDailyBar {
        date: TradeDate::parse(&row.date)?,
        open: parse_field("open", &row.open)?,
        high: parse_field("high", &row.high)?,
        low: parse_field("low", &row.low)?,
        close: parse_field("close", &row.close)?,
        volume: Some(parse_field("volume", &row.volume)? as u64),
        amount: Some(parse_field("amount", &row.amount)?),
        // Empty pct_chg cells happen on suspension days; derive instead.
        pct_chg: if row.pct_chg.trim().is_empty() {
            None
        } else {
            Some(parse_field("pctChg", &row.pct_chg)?)
        },
    })
}

fn parse_field(field: &str, value: &str) -> Result<f64, FetchError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| FetchError::data_fetch(format!("baostock field '{field}' is not numeric: '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchErrorKind;

    struct CannedClient {
        login_ok: bool,
        rows: Vec<BaostockRow>,
    }

    impl BaostockClient for CannedClient {
        fn login(&self) -> Result<(), FetchError> {
            if self.login_ok {
                Ok(())
            } else {
                Err(FetchError::data_fetch("baostock login failed"))
            }
        }

        fn query_history_k_data(
            &self,
            vendor_code: &str,
            _start: TradeDate,
            _end: TradeDate,
        ) -> Result<Vec<BaostockRow>, FetchError> {
            assert_eq!(vendor_code, "sh.600519");
            Ok(self.rows.clone())
        }
    }

    fn row(date: &str, close: &str) -> BaostockRow {
        BaostockRow {
            date: date.to_owned(),
            open: close.to_owned(),
            high: close.to_owned(),
            low: close.to_owned(),
            close: close.to_owned(),
            volume: "123400".to_owned(),
            amount: "208546000.0".to_owned(),
            pct_chg: "0.82".to_owned(),
        }
    }

    #[test]
    fn login_failure_prevents_construction() {
        let err = BaostockFetcher::login(CannedClient {
            login_ok: false,
            rows: vec![],
        })
        .err()
        .expect("must fail");
        assert_eq!(err.kind(), FetchErrorKind::DataFetch);
    }

    #[test]
    fn parses_string_typed_payload() {
        let fetcher = BaostockFetcher::login(CannedClient {
            login_ok: true,
            rows: vec![row("2024-01-02", "1690.00")],
        })
        .expect("must login");
        let symbol = SecurityCode::parse("600519").expect("must parse");

        let series = fetcher.get_daily_data(&symbol, 5).expect("must fetch");
        let bar = &series.bars[0];
        assert_eq!(bar.close, 1_690.0);
        // Volume arrives as shares already.
        assert_eq!(bar.volume, 123_400);
        assert_eq!(bar.pct_chg, 0.82);
    }

    #[test]
    fn non_numeric_cell_is_a_data_fetch_error() {
        let mut bad = row("2024-01-02", "1690.00");
        bad.close = "n/a".to_owned();
        let fetcher = BaostockFetcher::login(CannedClient {
            login_ok: true,
            rows: vec![bad],
        })
        .expect("must login");
        let symbol = SecurityCode::parse("600519").expect("must parse");

        let err = fetcher.get_daily_data(&symbol, 5).expect_err("must fail");
        assert_eq!(err.kind(), FetchErrorKind::DataFetch);
        assert!(err.message().contains("close"));
    }

    #[test]
    fn empty_pct_chg_cell_falls_back_to_derivation() {
        let mut suspended = row("2024-01-03", "1700.00");
        suspended.pct_chg = String::new();
        let fetcher = BaostockFetcher::login(CannedClient {
            login_ok: true,
            rows: vec![row("2024-01-02", "1690.00"), suspended],
        })
        .expect("must login");
        let symbol = SecurityCode::parse("600519").expect("must parse");

        let series = fetcher.get_daily_data(&symbol, 5).expect("must fetch");
        let derived = series.bars[1].pct_chg;
        assert!((derived - 0.591_715_976_331).abs() < 1e-9);
    }
}
