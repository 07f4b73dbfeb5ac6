//! Derived technical indicators appended to a normalized daily-bar sequence.

use serde::{Deserialize, Serialize};

use crate::DailyBar;

/// Indicator set computed for every adapter's output. Configured once at the
/// core level; adapters never vary it per vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorConfig {
    /// Simple moving-average windows over close, e.g. `[5, 10, 20]`.
    pub ma_windows: Vec<usize>,
    /// Trailing window for close-to-close percent-change volatility.
    pub volatility_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ma_windows: vec![5, 10, 20],
            volatility_window: 10,
        }
    }
}

/// One derived column, aligned index-for-index with the bar sequence.
/// Leading entries without enough lookback are `None`, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorColumn {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Pure transform: no I/O, deterministic, input ordering untouched.
pub fn compute(bars: &[DailyBar], config: &IndicatorConfig) -> Vec<IndicatorColumn> {
    let mut columns = Vec::with_capacity(config.ma_windows.len() + 1);

    for &window in &config.ma_windows {
        columns.push(IndicatorColumn {
            name: format!("ma{window}"),
            values: moving_average(bars, window),
        });
    }

    columns.push(IndicatorColumn {
        name: format!("vol{}", config.volatility_window),
        values: volatility(bars, config.volatility_window),
    });

    columns
}

fn moving_average(bars: &[DailyBar], window: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; bars.len()];
    if window == 0 {
        return values;
    }

    let mut running = 0.0;
    for (index, bar) in bars.iter().enumerate() {
        running += bar.close;
        if index >= window {
            running -= bars[index - window].close;
        }
        if index + 1 >= window {
            values[index] = Some(running / window as f64);
        }
    }
    values
}

/// Population standard deviation of `pct_chg` over the trailing window.
fn volatility(bars: &[DailyBar], window: usize) -> Vec<Option<f64>> {
    let mut values = vec![None; bars.len()];
    if window == 0 {
        return values;
    }

    for index in 0..bars.len() {
        if index + 1 < window {
            continue;
        }
        let slice = &bars[index + 1 - window..=index];
        let mean = slice.iter().map(|bar| bar.pct_chg).sum::<f64>() / window as f64;
        let variance = slice
            .iter()
            .map(|bar| {
                let delta = bar.pct_chg - mean;
                delta * delta
            })
            .sum::<f64>()
            / window as f64;
        values[index] = Some(variance.sqrt());
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TradeDate;

    fn bars(closes: &[f64]) -> Vec<DailyBar> {
        closes
            .iter()
            .enumerate()
            .map(|(index, &close)| {
                let date = TradeDate::parse("2024-01-01")
                    .expect("test date must parse")
                    .days_before(-(index as i64));
                DailyBar::new(date, close, close, close, close, 0, 0.0, 0.0)
                    .expect("test bar must build")
            })
            .collect()
    }

    #[test]
    fn moving_average_leaves_leading_rows_undefined() {
        let bars = bars(&[1.0, 2.0, 3.0, 4.0]);
        let config = IndicatorConfig {
            ma_windows: vec![3],
            volatility_window: 2,
        };

        let columns = compute(&bars, &config);
        let ma3 = &columns[0];
        assert_eq!(ma3.name, "ma3");
        assert_eq!(ma3.values, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn tolerates_sequences_shorter_than_the_window() {
        let bars = bars(&[1.0, 2.0]);
        let columns = compute(&bars, &IndicatorConfig::default());

        for column in &columns {
            assert_eq!(column.values.len(), bars.len());
            assert!(column.values.iter().all(Option::is_none), "{}", column.name);
        }
    }

    #[test]
    fn volatility_of_constant_changes_is_zero() {
        let mut series = bars(&[10.0, 10.0, 10.0]);
        for bar in &mut series {
            bar.pct_chg = 1.0;
        }
        let config = IndicatorConfig {
            ma_windows: vec![],
            volatility_window: 3,
        };

        let columns = compute(&series, &config);
        assert_eq!(columns[0].values, vec![None, None, Some(0.0)]);
    }

    #[test]
    fn compute_is_deterministic() {
        let bars = bars(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let config = IndicatorConfig::default();
        assert_eq!(compute(&bars, &config), compute(&bars, &config));
    }
}
