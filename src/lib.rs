//! Daily-bar market data fetching for China A-shares, with vendor failover.
//!
//! The crate is organized around three layers:
//!
//! - **Domain** ([`SecurityCode`], [`TradeDate`], [`DailyBar`],
//!   [`DailySeries`]): the canonical schema every vendor's output is coerced
//!   into, including the shared normalization and indicator passes.
//! - **Fetcher contract** ([`DailyBarFetcher`], [`FetchError`]): what every
//!   vendor adapter must implement. Adapters live in [`adapters`] and keep
//!   vendor-specific code mapping, field names, and unit conversions out of
//!   the rest of the crate.
//! - **Orchestration** ([`FetchManager`]): priority-ordered failover across
//!   registered adapters, with per-vendor throttling ([`throttling`]) and a
//!   shared retry policy ([`retry`]).
//!
//! ```no_run
//! use quotefall::{DailyBarFetcher, FetchManager, SecurityCode};
//!
//! # fn demo(adapter: impl DailyBarFetcher + 'static) -> Result<(), Box<dyn std::error::Error>> {
//! let manager = FetchManager::builder().adapter(adapter).build();
//!
//! let symbol = SecurityCode::parse("600519")?;
//! let outcome = manager.get_daily_data(&symbol, 30)?;
//! println!("{} bars from {}", outcome.series.len(), outcome.source);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod manager;
pub mod normalize;
pub mod retry;
pub mod source;
pub mod throttling;

pub use domain::{DailyBar, DailySeries, Exchange, SecurityCode, TradeDate};
pub use error::ValidationError;
pub use fetcher::{DailyBarFetcher, FetchError, FetchErrorKind, RealtimeQuote};
pub use manager::{AllSourcesFailed, FetchManager, FetchManagerBuilder, FetchOutcome, SourceFailure};
pub use retry::{Backoff, RetryPolicy};
pub use source::ProviderId;
pub use throttling::{ProviderPolicy, ThrottleGate};
