use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorColumn;
use crate::{SecurityCode, TradeDate, ValidationError};

/// One trading day for one symbol, in the canonical vendor-independent shape.
///
/// `volume` is always shares (vendors reporting lots convert before this
/// boundary), `amount` is currency units, and `pct_chg` is a percent. Missing
/// vendor fields default to zero rather than null; `pct_chg` is derived from
/// adjacent closes during normalization when the vendor omits it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: TradeDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub amount: f64,
    pub pct_chg: f64,
}

impl DailyBar {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: TradeDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
        amount: f64,
        pct_chg: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("amount", amount)?;
        if !pct_chg.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "pct_chg" });
        }

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }
        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
            amount,
            pct_chg,
        })
    }
}

/// Ordered, duplicate-free daily-bar sequence for one symbol, with derived
/// indicator columns appended. Every indicator column is aligned to `bars`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    pub symbol: SecurityCode,
    pub bars: Vec<DailyBar>,
    pub indicators: Vec<IndicatorColumn>,
}

impl DailySeries {
    pub fn new(symbol: SecurityCode, bars: Vec<DailyBar>, indicators: Vec<IndicatorColumn>) -> Self {
        debug_assert!(indicators.iter().all(|col| col.values.len() == bars.len()));
        Self {
            symbol,
            bars,
            indicators,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Most recent bar, if any.
    pub fn latest(&self) -> Option<&DailyBar> {
        self.bars.last()
    }

    pub fn indicator(&self, name: &str) -> Option<&IndicatorColumn> {
        self.indicators.iter().find(|col| col.name == name)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
