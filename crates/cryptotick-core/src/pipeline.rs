//! End-to-end harvest composition.
//!
//! ```text
//! snapshot (CoinGecko) ─┐
//! prices (CryptoCompare) ├─▶ base_data.csv
//! metrics (JSON exports) ┴─▶ advance_data.csv
//! ```
//!
//! Each stage reports its own failures; only artifact writes abort a run.

use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::adapters::{CoinGeckoAdapter, CryptoCompareAdapter};
use crate::backfill::{backfill, BackfillReport, BackfillSummary};
use crate::config::HarvestConfig;
use crate::data_source::{CandleSource, MarketSource, SourceError};
use crate::metrics::{merge_metric_files, MergeReport, MetricsError, MetricsTable};
use crate::table::{format_date, price_rows, write_metrics_csv, write_price_csv, PriceRow};
use crate::{CandleSeries, CoreError, MarketCoin, Symbol};

/// Rows shown by previews, as in a dataframe `head()`.
pub const PREVIEW_ROWS: usize = 5;

pub fn cryptocompare_source(config: &HarvestConfig) -> CryptoCompareAdapter {
    CryptoCompareAdapter::new(config.api_key.clone())
        .with_base_url(config.cryptocompare_base_url.clone())
        .with_timeout_ms(config.timeout_ms)
}

pub fn coingecko_source(config: &HarvestConfig) -> CoinGeckoAdapter {
    CoinGeckoAdapter::default()
        .with_demo_key(config.coingecko_key.clone())
        .with_base_url(config.coingecko_base_url.clone())
        .with_timeout_ms(config.timeout_ms)
}

/// Backfill results for every configured symbol, in configured order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHarvest {
    pub reports: Vec<BackfillReport>,
}

impl PriceHarvest {
    pub fn series(&self) -> Vec<CandleSeries> {
        self.reports
            .iter()
            .map(|report| report.series.clone())
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.reports.iter().map(|report| report.series.len()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = (&Symbol, &SourceError)> {
        self.reports
            .iter()
            .filter_map(|report| report.failure().map(|error| (&report.series.symbol, error)))
    }

    pub fn summaries(&self) -> Vec<BackfillSummary> {
        self.reports.iter().map(BackfillReport::summary).collect()
    }

    pub fn preview(&self, n: usize) -> Vec<PriceRow> {
        let mut rows = price_rows(&self.series());
        rows.truncate(n);
        rows
    }
}

/// Backfills each symbol one after another.
pub async fn fetch_prices(
    source: &dyn CandleSource,
    symbols: &[Symbol],
    total_hours: usize,
) -> PriceHarvest {
    let mut reports = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        reports.push(backfill(source, symbol.clone(), total_hours).await);
    }
    PriceHarvest { reports }
}

/// Which snapshot call a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotSection {
    MarketCap,
    Volume,
    Global,
}

impl SnapshotSection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MarketCap => "market_cap",
            Self::Volume => "volume",
            Self::Global => "global",
        }
    }
}

/// Rankings and the global cap. A failed section is `None` and listed in `failures`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    pub by_market_cap: Option<Vec<MarketCoin>>,
    pub by_volume: Option<Vec<MarketCoin>>,
    pub global_market_cap: Option<f64>,
    #[serde(skip)]
    pub failures: Vec<(SnapshotSection, SourceError)>,
}

impl MarketSnapshot {
    /// Human readable summary with `.`-grouped thousands.
    pub fn summary_text(&self) -> String {
        let mut out = String::new();

        if let Some(coins) = &self.by_market_cap {
            out.push_str("Top cryptocurrencies by market capitalization:\n");
            for coin in coins {
                out.push_str(&format!(
                    "{} (Symbol: {}) - Market Cap: ${}\n",
                    coin.name,
                    coin.symbol,
                    grouped_or_na(coin.market_cap)
                ));
            }
        }

        if let Some(coins) = &self.by_volume {
            out.push_str("\nTop cryptocurrencies by trading volume in the past 24 hours:\n");
            for coin in coins {
                out.push_str(&format!(
                    "{} (Symbol: {}) - Volume: ${}\n",
                    coin.name,
                    coin.symbol,
                    grouped_or_na(coin.total_volume)
                ));
            }
        }

        if let Some(total) = self.global_market_cap {
            out.push_str(&format!(
                "\nTotal cryptocurrency market cap worldwide: ${}\n",
                format_grouped(total)
            ));
        }

        out
    }
}

/// Fetches both rankings and the global cap.
pub async fn collect_snapshot(source: &dyn MarketSource, limit: usize) -> MarketSnapshot {
    let mut failures = Vec::new();

    let by_market_cap = match source.top_by_market_cap(limit).await {
        Ok(coins) => Some(coins),
        Err(error) => {
            failures.push((SnapshotSection::MarketCap, error));
            None
        }
    };
    let by_volume = match source.top_by_volume(limit).await {
        Ok(coins) => Some(coins),
        Err(error) => {
            failures.push((SnapshotSection::Volume, error));
            None
        }
    };
    let global_market_cap = match source.global_market_cap().await {
        Ok(total) => Some(total),
        Err(error) => {
            failures.push((SnapshotSection::Global, error));
            None
        }
    };

    MarketSnapshot {
        by_market_cap,
        by_volume,
        global_market_cap,
        failures,
    }
}

/// Formats a number with `.` as the thousands separator (`1.234.567`).
///
/// A fractional part is kept after a further `.`, so `1234.5` renders as
/// `1.234.5`.
pub fn format_grouped(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let rendered = value.abs().to_string();
    let (integer, fraction) = match rendered.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (rendered.as_str(), None),
    };

    let digits = integer.as_bytes();
    let mut grouped = String::with_capacity(rendered.len() + digits.len() / 3 + 1);
    if value.is_sign_negative() && value != 0.0 {
        grouped.push('-');
    }
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(char::from(*digit));
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

fn grouped_or_na(value: Option<f64>) -> String {
    value.map(format_grouped).unwrap_or_else(|| String::from("n/a"))
}

/// First rows of the merged metric table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsPreview {
    pub columns: Vec<String>,
    pub rows: Vec<MetricsPreviewRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsPreviewRow {
    pub date: String,
    pub values: Vec<Option<f64>>,
}

pub fn metrics_preview(table: &MetricsTable, n: usize) -> Result<MetricsPreview, CoreError> {
    let mut rows = Vec::with_capacity(n.min(table.len()));
    for (day, cells) in table.rows().take(n) {
        rows.push(MetricsPreviewRow {
            date: format_date(*day)?,
            values: cells.to_vec(),
        });
    }
    Ok(MetricsPreview {
        columns: table.metrics().to_vec(),
        rows,
    })
}

/// Merges the configured metric files with the configured seed.
pub fn merge_metrics(config: &HarvestConfig) -> MergeReport {
    merge_metric_files(&config.metric_files, config.seed)
}

/// Outcome of a full run.
#[derive(Debug)]
pub struct RunReport {
    pub snapshot: MarketSnapshot,
    pub prices: PriceHarvest,
    pub metrics: MergeReport,
    pub base_rows: usize,
    pub advance_rows: usize,
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn metric_failures(&self) -> &[MetricsError] {
        &self.metrics.failures
    }

    /// True when any stage lost data to a failure.
    pub fn has_failures(&self) -> bool {
        !self.snapshot.failures.is_empty()
            || self.prices.failures().next().is_some()
            || !self.metrics.failures.is_empty()
    }
}

/// Runs snapshot, price backfill and metric merge, then writes both tables.
pub async fn run(
    config: &HarvestConfig,
    candles: &dyn CandleSource,
    markets: &dyn MarketSource,
) -> Result<RunReport, CoreError> {
    let started = Instant::now();
    if !config.has_api_key() {
        warn!("no CryptoCompare API key configured; upstream may reject requests");
    }

    let snapshot = collect_snapshot(markets, config.snapshot_limit).await;
    let prices = fetch_prices(candles, &config.symbols, config.total_hours).await;
    let base_rows = write_price_csv(&config.base_output, &prices.series())?;
    info!(path = %config.base_output.display(), rows = base_rows, "wrote price table");

    let metrics = merge_metrics(config);
    let advance_rows = write_metrics_csv(&config.advance_output, &metrics.table)?;
    info!(path = %config.advance_output.display(), rows = advance_rows, "wrote metric table");

    Ok(RunReport {
        snapshot,
        prices,
        metrics,
        base_rows,
        advance_rows,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_integers_use_dot_separator() {
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1_000.0), "1.000");
        assert_eq!(format_grouped(1_234_567.0), "1.234.567");
        assert_eq!(format_grouped(-1_234_567.0), "-1.234.567");
    }

    #[test]
    fn grouped_fraction_is_kept() {
        assert_eq!(format_grouped(1_234.5), "1.234.5");
    }

    #[test]
    fn summary_lists_sections_in_order() {
        let coin = MarketCoin {
            id: String::from("bitcoin"),
            symbol: String::from("btc"),
            name: String::from("Bitcoin"),
            current_price: Some(65_000.0),
            market_cap: Some(1_280_000_000_000.0),
            market_cap_rank: Some(1),
            total_volume: Some(35_000_000_000.0),
        };
        let snapshot = MarketSnapshot {
            by_market_cap: Some(vec![coin.clone()]),
            by_volume: Some(vec![coin]),
            global_market_cap: Some(2_400_000_000_000.0),
            failures: Vec::new(),
        };

        let text = snapshot.summary_text();

        assert!(text.contains("Bitcoin (Symbol: btc) - Market Cap: $1.280.000.000.000"));
        assert!(text.contains("Bitcoin (Symbol: btc) - Volume: $35.000.000.000"));
        assert!(text.ends_with("worldwide: $2.400.000.000.000\n"));
    }
}
