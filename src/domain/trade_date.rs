use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::BorrowedFormatItem;
use time::macros::{format_description, offset};
use time::{Date, Duration, OffsetDateTime};

use crate::ValidationError;

const DASHED: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const COMPACT: &[BorrowedFormatItem<'static>] = format_description!("[year][month][day]");

/// Calendar trading date with no time component.
///
/// Vendors disagree on date representation: some return `2024-01-05`, some
/// `20240105`, and some a bar-end timestamp like `2024-01-05 15:00:00`. All of
/// them coerce to the calendar date here; the time portion is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(Date);

impl TradeDate {
    /// Current calendar date in exchange-local time (UTC+8).
    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().to_offset(offset!(+8)).date())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let unparseable = || ValidationError::UnparseableDate {
            value: input.to_owned(),
        };

        if trimmed.len() == 8 && trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            let date = Date::parse(trimmed, COMPACT).map_err(|_| unparseable())?;
            return Ok(Self(date));
        }

        // Dashed date, possibly followed by a time component to drop.
        if trimmed.len() >= 10 && trimmed.as_bytes().get(4) == Some(&b'-') {
            let date = Date::parse(&trimmed[..10], DASHED).map_err(|_| unparseable())?;
            return Ok(Self(date));
        }

        Err(unparseable())
    }

    pub fn from_date(date: Date) -> Self {
        Self(date)
    }

    pub fn into_inner(self) -> Date {
        self.0
    }

    /// The date `days` calendar days earlier, saturating at the calendar edge.
    pub fn days_before(self, days: i64) -> Self {
        self.0
            .checked_sub(Duration::days(days))
            .map(Self)
            .unwrap_or(self)
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .0
            .format(DASHED)
            .expect("TradeDate must be formattable");
        f.write_str(&rendered)
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
