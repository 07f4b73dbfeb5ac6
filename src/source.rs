use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical vendor identifiers used in registrations, logs, and failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Myquant,
    Miniqmt,
    Efinance,
    Tushare,
    Akshare,
    Baostock,
    Yfinance,
}

impl ProviderId {
    pub const ALL: [Self; 7] = [
        Self::Myquant,
        Self::Miniqmt,
        Self::Efinance,
        Self::Tushare,
        Self::Akshare,
        Self::Baostock,
        Self::Yfinance,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Myquant => "myquant",
            Self::Miniqmt => "miniqmt",
            Self::Efinance => "efinance",
            Self::Tushare => "tushare",
            Self::Akshare => "akshare",
            Self::Baostock => "baostock",
            Self::Yfinance => "yfinance",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "myquant" => Ok(Self::Myquant),
            "miniqmt" => Ok(Self::Miniqmt),
            "efinance" => Ok(Self::Efinance),
            "tushare" => Ok(Self::Tushare),
            "akshare" => Ok(Self::Akshare),
            "baostock" => Ok(Self::Baostock),
            "yfinance" => Ok(Self::Yfinance),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_id() {
        let parsed = ProviderId::from_str(" Tushare ").expect("must parse");
        assert_eq!(parsed, ProviderId::Tushare);
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = ProviderId::from_str("bloomberg").expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidSource { .. }));
    }
}
