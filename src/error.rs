use thiserror::Error;

/// Validation errors raised while building canonical domain values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("security code cannot be empty")]
    EmptyCode,
    #[error("security code must be 6 ASCII digits: '{value}'")]
    MalformedCode { value: String },
    #[error("unknown exchange qualifier '{qualifier}' in '{value}'")]
    UnknownExchange { qualifier: String, value: String },

    #[error(
        "invalid source '{value}', expected one of myquant, miniqmt, efinance, tushare, akshare, baostock, yfinance"
    )]
    InvalidSource { value: String },

    #[error("unparseable trade date '{value}'")]
    UnparseableDate { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },

    #[error("bar high must be >= low")]
    InvalidBarRange,
    #[error("bar open/close must be within high/low range")]
    InvalidBarBounds,
}
