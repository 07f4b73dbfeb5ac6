//! Vendor adapters.
//!
//! Each adapter owns everything specific to one vendor: the qualified code
//! format, the payload field names, the volume/amount unit conversions, and
//! credential or session bootstrapping. The actual wire call sits behind a
//! per-vendor client trait so the adapter logic stays testable without the
//! vendor SDK. Everything downstream of the raw records is shared:
//! normalization, indicator enrichment, and truncation all happen in
//! [`crate::fetcher::finalize_series`].

pub mod akshare;
pub mod baostock;
pub mod efinance;
pub mod miniqmt;
pub mod myquant;
pub mod tushare;
pub mod yfinance;
