//! Data source traits and request/response types.
//!
//! | Endpoint | Request | Response | Description |
//! |----------|---------|----------|-------------|
//! | Hourly candles | [`WindowRequest`] | [`WindowOutcome`] | One bounded OHLCV window |
//! | Coin markets | [`MarketOrder`] + limit | `Vec<MarketCoin>` | Top-N ranking |
//! | Global stats | none | `f64` | Total market cap in USD |
//!
//! Adapters never panic or swallow failures: a fetch either yields rows,
//! reports that upstream had nothing, or carries a [`SourceError`].

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{Candle, MarketCoin, ProviderId, Symbol};

/// Upstream maximum number of rows per candle window.
pub const MAX_WINDOW_LIMIT: usize = 2000;

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    RateLimited,
    InvalidRequest,
    Rejected,
    Internal,
}

/// Structured source error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    /// Upstream answered but flagged the call as failed (e.g. `Response: Error`).
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Rejected,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::RateLimited => "source.rate_limited",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::Rejected => "source.rejected",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request for one window of hourly candles ending at `to_ts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowRequest {
    pub symbol: Symbol,
    /// Inclusive upper bound in unix seconds; `None` means "most recent".
    pub to_ts: Option<i64>,
    pub limit: usize,
}

impl WindowRequest {
    /// Builds a window request; limits above [`MAX_WINDOW_LIMIT`] are clamped.
    pub fn new(symbol: Symbol, to_ts: Option<i64>, limit: usize) -> Result<Self, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "window limit must be greater than zero",
            ));
        }
        Ok(Self {
            symbol,
            to_ts,
            limit: limit.min(MAX_WINDOW_LIMIT),
        })
    }
}

/// Typed result of one window fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowOutcome {
    /// Rows ordered oldest first.
    Rows(Vec<Candle>),
    /// Upstream succeeded but had no rows for the requested window.
    Empty,
    Failed(SourceError),
}

impl WindowOutcome {
    pub fn from_rows(rows: Vec<Candle>) -> Self {
        if rows.is_empty() {
            Self::Empty
        } else {
            Self::Rows(rows)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Rows(rows) => rows.len(),
            Self::Empty | Self::Failed(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ranking order for market snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketOrder {
    MarketCapDesc,
    VolumeDesc,
}

impl MarketOrder {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketCapDesc => "market_cap_desc",
            Self::VolumeDesc => "volume_desc",
        }
    }
}

/// Boxed future returned by source traits.
pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of bounded hourly candle windows.
///
/// The backfill loop only depends on this trait, so tests can drive it with
/// scripted windows instead of a live endpoint.
pub trait CandleSource: Send + Sync {
    fn id(&self) -> ProviderId;

    /// Fetches one window. Never retries.
    fn fetch_window<'a>(&'a self, req: WindowRequest) -> SourceFuture<'a, WindowOutcome>;
}

/// Source of market rankings and global capitalisation.
pub trait MarketSource: Send + Sync {
    fn id(&self) -> ProviderId;

    fn top_coins<'a>(
        &'a self,
        order: MarketOrder,
        limit: usize,
    ) -> SourceFuture<'a, Result<Vec<MarketCoin>, SourceError>>;

    fn global_market_cap<'a>(&'a self) -> SourceFuture<'a, Result<f64, SourceError>>;

    fn top_by_market_cap<'a>(
        &'a self,
        limit: usize,
    ) -> SourceFuture<'a, Result<Vec<MarketCoin>, SourceError>> {
        self.top_coins(MarketOrder::MarketCapDesc, limit)
    }

    fn top_by_volume<'a>(
        &'a self,
        limit: usize,
    ) -> SourceFuture<'a, Result<Vec<MarketCoin>, SourceError>> {
        self.top_coins(MarketOrder::VolumeDesc, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_limit_is_clamped_to_upstream_maximum() {
        let symbol = Symbol::parse("BTC").expect("valid");
        let request = WindowRequest::new(symbol, None, 5_000).expect("valid request");
        assert_eq!(request.limit, MAX_WINDOW_LIMIT);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let symbol = Symbol::parse("BTC").expect("valid");
        let err = WindowRequest::new(symbol, None, 0).expect_err("must fail");
        assert_eq!(err.kind(), SourceErrorKind::InvalidRequest);
        assert_eq!(err.code(), "source.invalid_request");
    }

    #[test]
    fn empty_rows_become_empty_outcome() {
        assert_eq!(WindowOutcome::from_rows(Vec::new()), WindowOutcome::Empty);
        assert!(WindowOutcome::Failed(SourceError::internal("boom")).is_empty());
    }
}
