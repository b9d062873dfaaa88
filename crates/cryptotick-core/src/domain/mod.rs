//! # Domain Models
//!
//! Canonical domain types for cryptotick market data.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Candle`] | Hourly OHLCV record |
//! | [`CandleSeries`] | Ascending candles for one symbol |
//! | [`MarketCoin`] | One row of a market-cap or volume ranking |
//! | [`Symbol`] | Validated crypto ticker |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates invariants; an out-of-bounds candle is rejected:
//!
//! ```rust,ignore
//! use cryptotick_core::{Candle, UtcDateTime, ValidationError};
//!
//! let ts = UtcDateTime::parse("2024-01-01T00:00:00Z")?;
//! let invalid = Candle::new(ts, 100.0, 95.0, 105.0, 102.0, 1.0, 100.0);
//! assert!(matches!(invalid, Err(ValidationError::InvalidCandleRange)));
//! ```

mod models;
mod symbol;
mod timestamp;

pub use models::{Candle, CandleSeries, MarketCoin};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
