//! CLI argument definitions for cryptotick.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `prices` | Backfill hourly candles and write `base_data.csv` |
//! | `snapshot` | Market-cap and volume rankings plus global cap |
//! | `metrics` | Merge chart exports into `advance_data.csv` |
//! | `run` | Snapshot, prices and metrics in one go |
//! | `charts` | List the blockchain.com charts the merge expects |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--timeout-ms` | `10000` | Per-request timeout in ms |
//! | `--log-level` | `info` | Log filter when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! # Two years of BTC and ETH hourly candles
//! CRYPTOTICK_CRYPTOCOMPARE_API_KEY=... cryptotick prices
//!
//! # Human summary of the top 10 coins
//! cryptotick --format table snapshot
//!
//! # Merge exports from a custom directory with another seed
//! cryptotick metrics --dir exports --seed 7 --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Crypto price history and on-chain metric harvester.
#[derive(Debug, Parser)]
#[command(
    name = "cryptotick",
    author,
    version,
    about = "Crypto price history and on-chain metric harvester",
    long_about = "cryptotick collects the raw material for crypto market analysis:\n\
\n\
  • Hourly OHLCV history from CryptoCompare (base_data.csv)\n\
  • Market rankings and global capitalization from CoinGecko\n\
  • Daily on-chain metrics merged from blockchain.com exports (advance_data.csv)\n\
\n\
Use 'cryptotick <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Log filter used when RUST_LOG is not set (e.g. info, debug, cryptotick_core=trace).
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable rendering.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Backfill hourly candles and write the price table.
    ///
    /// # Examples
    ///
    ///   cryptotick prices
    ///   cryptotick prices --symbols BTC --hours 72 --output btc.csv
    Prices(PricesArgs),

    /// Fetch top coins by market cap and by 24h volume, plus the global cap.
    ///
    /// # Examples
    ///
    ///   cryptotick snapshot --limit 5
    ///   cryptotick --format table snapshot
    Snapshot(SnapshotArgs),

    /// Merge blockchain.com JSON exports into the daily metric table.
    Metrics(MetricsArgs),

    /// Run snapshot, prices and metrics, writing both tables.
    Run(RunArgs),

    /// List the charts whose exports the metric merge reads.
    Charts(ChartsArgs),
}

#[derive(Debug, Args)]
pub struct PricesArgs {
    /// Symbols to backfill, in output order (default: BTC ETH).
    #[arg(long, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Hourly candles to collect per symbol (default: two years).
    #[arg(long)]
    pub hours: Option<usize>,

    /// Price table path (default: base_data.csv).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// CryptoCompare API key; overrides CRYPTOTICK_CRYPTOCOMPARE_API_KEY.
    #[arg(long)]
    pub api_key: Option<String>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Coins per ranking.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct MetricsArgs {
    /// Directory holding the chart exports (default: scrapping_json_data).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Seed for same-day sampling.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Metric table path (default: advance_data.csv).
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub prices: PricesArgs,

    #[command(flatten)]
    pub metrics: RunMetricsArgs,

    /// Coins per ranking.
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

/// Metric options of `run`; `--output` belongs to the price table there.
#[derive(Debug, Args)]
pub struct RunMetricsArgs {
    #[arg(long)]
    pub dir: Option<PathBuf>,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Metric table path (default: advance_data.csv).
    #[arg(long)]
    pub advance_output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ChartsArgs {
    /// Directory the exports are expected in.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
