//! Normalization of raw vendor records into the canonical daily-bar sequence.
//!
//! Every adapter maps its vendor payload into [`RawDailyBar`] (converting
//! volume units to shares with its own per-vendor constant first) and then
//! runs this shared pass. The pass owns the ordering, dedup, default, and
//! derived percent-change rules so no adapter re-implements them.

use crate::{DailyBar, TradeDate, ValidationError};

/// Pre-normalization record: prices are required, everything else optional.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDailyBar {
    pub date: TradeDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Shares. Adapters convert lots before constructing this record.
    pub volume: Option<u64>,
    pub amount: Option<f64>,
    pub pct_chg: Option<f64>,
}

/// Produce the canonical sequence: ascending by date, duplicate dates dropped
/// keeping the last occurrence, missing `volume`/`amount` defaulted to zero,
/// and missing `pct_chg` derived from adjacent closes (first record gets 0).
pub fn normalize(mut raw: Vec<RawDailyBar>) -> Result<Vec<DailyBar>, ValidationError> {
    // Stable sort keeps duplicate dates in arrival order, so "keep the last
    // element of each run" is exactly last-write-wins.
    raw.sort_by_key(|record| record.date);

    let mut deduped: Vec<RawDailyBar> = Vec::with_capacity(raw.len());
    for record in raw {
        match deduped.last_mut() {
            Some(last) if last.date == record.date => *last = record,
            _ => deduped.push(record),
        }
    }

    let mut bars = Vec::with_capacity(deduped.len());
    let mut prev_close: Option<f64> = None;
    for record in deduped {
        let pct_chg = match record.pct_chg {
            Some(value) => value,
            None => derive_pct_chg(prev_close, record.close),
        };

        bars.push(DailyBar::new(
            record.date,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume.unwrap_or(0),
            record.amount.unwrap_or(0.0),
            pct_chg,
        )?);
        prev_close = Some(record.close);
    }

    Ok(bars)
}

fn derive_pct_chg(prev_close: Option<f64>, close: f64) -> f64 {
    match prev_close {
        Some(prev) if prev != 0.0 => (close - prev) / prev * 100.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, close: f64) -> RawDailyBar {
        RawDailyBar {
            date: TradeDate::parse(date).expect("test date must parse"),
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
            amount: None,
            pct_chg: None,
        }
    }

    #[test]
    fn sorts_ascending_and_keeps_last_duplicate() {
        let records = vec![raw("2024-01-03", 3.0), raw("2024-01-02", 1.0), raw("2024-01-02", 2.0)];

        let bars = normalize(records).expect("must normalize");
        let dates: Vec<String> = bars.iter().map(|bar| bar.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-02", "2024-01-03"]);
        assert_eq!(bars[0].close, 2.0);
    }

    #[test]
    fn derives_pct_chg_from_adjacent_closes() {
        let records = vec![raw("2024-01-02", 10.0), raw("2024-01-03", 11.0), raw("2024-01-04", 9.0)];

        let bars = normalize(records).expect("must normalize");
        assert_eq!(bars[0].pct_chg, 0.0);
        assert!((bars[1].pct_chg - 10.0).abs() < 1e-9);
        assert!((bars[2].pct_chg - (-18.181_818_181_818_18)).abs() < 1e-9);
    }

    #[test]
    fn vendor_supplied_pct_chg_wins_over_derivation() {
        let mut second = raw("2024-01-03", 11.0);
        second.pct_chg = Some(3.5);
        let records = vec![raw("2024-01-02", 10.0), second];

        let bars = normalize(records).expect("must normalize");
        assert_eq!(bars[1].pct_chg, 3.5);
    }

    #[test]
    fn missing_fields_default_to_zero() {
        let bars = normalize(vec![raw("2024-01-02", 10.0)]).expect("must normalize");
        assert_eq!(bars[0].volume, 0);
        assert_eq!(bars[0].amount, 0.0);
        assert_eq!(bars[0].pct_chg, 0.0);
    }

    #[test]
    fn normalization_is_idempotent() {
        let records = vec![raw("2024-01-03", 3.0), raw("2024-01-02", 1.0), raw("2024-01-02", 2.0)];

        let once = normalize(records).expect("must normalize");
        let again = normalize(
            once.iter()
                .map(|bar| RawDailyBar {
                    date: bar.date,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: Some(bar.volume),
                    amount: Some(bar.amount),
                    pct_chg: Some(bar.pct_chg),
                })
                .collect(),
        )
        .expect("must normalize");

        assert_eq!(once, again);
    }
}
