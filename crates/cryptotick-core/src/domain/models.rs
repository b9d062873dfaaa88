use serde::{Deserialize, Serialize};

use crate::{Symbol, UtcDateTime, ValidationError};

/// Hourly OHLCV record for one symbol, quoted in USD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub ts: UtcDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Traded volume in the base asset.
    pub volume: f64,
    /// Traded volume in the quote currency.
    pub quote_volume: f64,
}

impl Candle {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        quote_volume: f64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;
        validate_non_negative("volume", volume)?;
        validate_non_negative("quote_volume", quote_volume)?;

        if high < low {
            return Err(ValidationError::InvalidCandleRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidCandleBounds);
        }

        Ok(Self::from_upstream(ts, open, high, low, close, volume, quote_volume))
    }

    /// Builds a candle exactly as the upstream reported it, without bounds checks.
    pub const fn from_upstream(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        quote_volume: f64,
    ) -> Self {
        Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
            quote_volume,
        }
    }
}

/// Ascending hourly history for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: Symbol,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn new(symbol: Symbol, candles: Vec<Candle>) -> Self {
        Self { symbol, candles }
    }

    pub fn empty(symbol: Symbol) -> Self {
        Self::new(symbol, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Timestamp of the oldest candle, if any.
    pub fn earliest(&self) -> Option<UtcDateTime> {
        self.candles.first().map(|candle| candle.ts)
    }

    pub fn latest(&self) -> Option<UtcDateTime> {
        self.candles.last().map(|candle| candle.ts)
    }

    /// Inserts an older window in front of the accumulated candles.
    pub fn prepend(&mut self, mut older: Vec<Candle>) {
        older.append(&mut self.candles);
        self.candles = older;
    }

    /// True when timestamps strictly increase, i.e. ascending without duplicates.
    pub fn is_strictly_ascending(&self) -> bool {
        self.candles.windows(2).all(|pair| pair[0].ts < pair[1].ts)
    }
}

/// One entry of a market ranking (`/coins/markets`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketCoin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
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
