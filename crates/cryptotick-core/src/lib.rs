//! # Cryptotick Core
//!
//! Core contracts and domain types for the cryptotick harvesting toolkit.
//!
//! ## Overview
//!
//! This crate collects the raw material for crypto market analysis:
//!
//! - **Hourly price history** backfilled from CryptoCompare in bounded windows
//! - **Market snapshots** (rankings and global capitalization) from CoinGecko
//! - **On-chain metrics** merged from blockchain.com chart exports
//! - **Flat-file artifacts** (`base_data.csv`, `advance_data.csv`)
//! - **Response envelope** with metadata and structured errors
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Provider adapters (CryptoCompare, CoinGecko) |
//! | [`backfill`] | Backward-walking hourly history collection |
//! | [`charts`] | blockchain.com chart catalogue |
//! | [`config`] | Harvest and logging configuration |
//! | [`data_source`] | Source traits and request/outcome types |
//! | [`domain`] | Domain models (Candle, CandleSeries, MarketCoin) |
//! | [`envelope`] | Response envelope with metadata |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`metrics`] | Metric export parsing, daily sampling and outer join |
//! | [`pipeline`] | Full harvest composition |
//! | [`source`] | Provider identifiers |
//! | [`table`] | CSV writers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cryptotick_core::{backfill, CryptoCompareAdapter, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = CryptoCompareAdapter::new(std::env::var("CRYPTOTICK_CRYPTOCOMPARE_API_KEY")?);
//!     let report = backfill(&adapter, Symbol::parse("BTC")?, 48).await;
//!
//!     println!("{} hourly rows, stop: {}", report.series.len(), report.stop.as_str());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Pipeline       │────▶│ Metric Merge     │──▶ advance_data.csv
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Backfill /      │────▶│ Source Adapters  │
//! │ Snapshot        │     │ (HttpClient)     │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//!    base_data.csv
//! ```
//!
//! ## Error Handling
//!
//! Fetches never panic. A window is rows, empty, or a typed failure:
//!
//! ```rust
//! use cryptotick_core::{SourceErrorKind, WindowOutcome};
//!
//! fn describe(outcome: &WindowOutcome) -> &'static str {
//!     match outcome {
//!         WindowOutcome::Rows(_) => "rows",
//!         WindowOutcome::Empty => "upstream has no older data",
//!         WindowOutcome::Failed(error) if error.kind() == SourceErrorKind::RateLimited => "throttled",
//!         WindowOutcome::Failed(_) => "failed",
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys come from the environment or explicit flags and are never logged
//! - Transport errors are stripped of request URLs, which carry the key

pub mod adapters;
pub mod backfill;
pub mod charts;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod source;
pub mod table;

// Adapter implementations
pub use adapters::{CoinGeckoAdapter, CryptoCompareAdapter};

// Backfill
pub use backfill::{backfill, BackfillReport, BackfillStop, BackfillSummary};

// Chart catalogue
pub use charts::{default_export_paths, ChartSource, DEFAULT_CHARTS};

// Configuration
pub use config::{HarvestConfig, LogConfig};

// Data source traits and types
pub use data_source::{
    CandleSource, MarketOrder, MarketSource, SourceError, SourceErrorKind,
    SourceFuture, WindowOutcome, WindowRequest, MAX_WINDOW_LIMIT,
};

// Domain models
pub use domain::{Candle, CandleSeries, MarketCoin, Symbol, UtcDateTime};

// Envelope types
pub use envelope::{Envelope, EnvelopeError, EnvelopeMeta};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};

// Logging
pub use logging::init_logging;

// Metrics merge
pub use metrics::{
    merge_metric_files, DailyMetric, MergeReport, MetricSeries, MetricsError, MetricsTable,
};

// Pipeline
pub use pipeline::{
    collect_snapshot, fetch_prices, format_grouped, MarketSnapshot, PriceHarvest, RunReport,
    SnapshotSection,
};

// Source identifiers
pub use source::ProviderId;

// Tables
pub use table::{PriceRow, TableError};
