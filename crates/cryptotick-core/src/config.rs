//! Run configuration.
//!
//! Everything a harvest needs is carried explicitly in [`HarvestConfig`],
//! including the sampling seed, so two runs with equal configuration over the
//! same inputs produce the same artifacts.

use std::path::{Path, PathBuf};

use crate::adapters::coingecko::COINGECKO_BASE_URL;
use crate::adapters::cryptocompare::CRYPTOCOMPARE_BASE_URL;
use crate::charts::default_export_paths;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::{Symbol, ValidationError};

pub const CRYPTOCOMPARE_API_KEY_ENV: &str = "CRYPTOTICK_CRYPTOCOMPARE_API_KEY";
pub const COINGECKO_API_KEY_ENV: &str = "CRYPTOTICK_COINGECKO_API_KEY";

/// Two years of hourly candles.
pub const DEFAULT_TOTAL_HOURS: usize = 24 * 365 * 2;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 10;
pub const DEFAULT_METRICS_DIR: &str = "scrapping_json_data";
pub const DEFAULT_BASE_OUTPUT: &str = "base_data.csv";
pub const DEFAULT_ADVANCE_OUTPUT: &str = "advance_data.csv";
const DEFAULT_SYMBOLS: [&str; 2] = ["BTC", "ETH"];

/// Configuration for fetching, merging and writing.
#[derive(Clone)]
pub struct HarvestConfig {
    /// Symbols to backfill, in output order.
    pub symbols: Vec<Symbol>,
    pub total_hours: usize,
    pub api_key: String,
    /// Optional CoinGecko demo key.
    pub coingecko_key: Option<String>,
    pub cryptocompare_base_url: String,
    pub coingecko_base_url: String,
    pub timeout_ms: u64,
    pub snapshot_limit: usize,
    pub seed: u64,
    pub metrics_dir: PathBuf,
    pub metric_files: Vec<PathBuf>,
    pub base_output: PathBuf,
    pub advance_output: PathBuf,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        let metrics_dir = PathBuf::from(DEFAULT_METRICS_DIR);
        Self {
            symbols: default_symbols(),
            total_hours: DEFAULT_TOTAL_HOURS,
            api_key: String::new(),
            coingecko_key: None,
            cryptocompare_base_url: String::from(CRYPTOCOMPARE_BASE_URL),
            coingecko_base_url: String::from(COINGECKO_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            snapshot_limit: DEFAULT_SNAPSHOT_LIMIT,
            seed: DEFAULT_SEED,
            metric_files: default_export_paths(&metrics_dir),
            metrics_dir,
            base_output: PathBuf::from(DEFAULT_BASE_OUTPUT),
            advance_output: PathBuf::from(DEFAULT_ADVANCE_OUTPUT),
        }
    }
}

impl std::fmt::Debug for HarvestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestConfig")
            .field("symbols", &self.symbols)
            .field("total_hours", &self.total_hours)
            .field("api_key", &redacted(!self.api_key.is_empty()))
            .field("coingecko_key", &redacted(self.coingecko_key.is_some()))
            .field("cryptocompare_base_url", &self.cryptocompare_base_url)
            .field("coingecko_base_url", &self.coingecko_base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("snapshot_limit", &self.snapshot_limit)
            .field("seed", &self.seed)
            .field("metrics_dir", &self.metrics_dir)
            .field("metric_files", &self.metric_files)
            .field("base_output", &self.base_output)
            .field("advance_output", &self.advance_output)
            .finish()
    }
}

impl HarvestConfig {
    /// Defaults plus API keys from the environment.
    pub fn from_env() -> Self {
        Self::default()
            .with_api_key(std::env::var(CRYPTOCOMPARE_API_KEY_ENV).unwrap_or_default())
            .with_coingecko_key(
                std::env::var(COINGECKO_API_KEY_ENV)
                    .ok()
                    .filter(|key| !key.trim().is_empty()),
            )
    }

    pub fn with_symbols(mut self, symbols: Vec<Symbol>) -> Self {
        self.symbols = symbols;
        self
    }

    /// Parses and replaces the symbol list.
    pub fn with_symbol_names<S: AsRef<str>>(self, names: &[S]) -> Result<Self, ValidationError> {
        let symbols = names
            .iter()
            .map(|name| Symbol::parse(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.with_symbols(symbols))
    }

    pub fn with_total_hours(mut self, total_hours: usize) -> Self {
        self.total_hours = total_hours;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_coingecko_key(mut self, key: Option<String>) -> Self {
        self.coingecko_key = key;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_snapshot_limit(mut self, limit: usize) -> Self {
        self.snapshot_limit = limit;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Points the merge at `dir`, using the default chart file names.
    pub fn with_metrics_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.metrics_dir = dir.as_ref().to_path_buf();
        self.metric_files = default_export_paths(&self.metrics_dir);
        self
    }

    pub fn with_metric_files(mut self, files: Vec<PathBuf>) -> Self {
        self.metric_files = files;
        self
    }

    pub fn with_base_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_output = path.into();
        self
    }

    pub fn with_advance_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.advance_output = path.into();
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            ansi: false,
        }
    }
}

impl LogConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

fn default_symbols() -> Vec<Symbol> {
    DEFAULT_SYMBOLS
        .iter()
        .filter_map(|name| Symbol::parse(name).ok())
        .collect()
}

fn redacted(present: bool) -> &'static str {
    if present {
        "<redacted>"
    } else {
        "<unset>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_two_year_btc_eth_harvest() {
        let config = HarvestConfig::default();

        let names: Vec<&str> = config.symbols.iter().map(Symbol::as_str).collect();
        assert_eq!(names, vec!["BTC", "ETH"]);
        assert_eq!(config.total_hours, 17_520);
        assert_eq!(config.seed, 42);
        assert_eq!(config.metric_files.len(), 10);
        assert_eq!(config.base_output, PathBuf::from("base_data.csv"));
        assert_eq!(config.advance_output, PathBuf::from("advance_data.csv"));
    }

    #[test]
    fn metrics_dir_override_moves_every_file() {
        let config = HarvestConfig::default().with_metrics_dir("/tmp/exports");

        assert!(config
            .metric_files
            .iter()
            .all(|path| path.starts_with("/tmp/exports")));
    }

    #[test]
    fn invalid_symbol_name_is_rejected() {
        let result = HarvestConfig::default().with_symbol_names(&["BTC", "B-TC"]);
        assert!(matches!(result, Err(ValidationError::SymbolInvalidChar { .. })));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = HarvestConfig::default().with_api_key("secret-key-123");
        let rendered = format!("{config:?}");

        assert!(!rendered.contains("secret-key-123"));
        assert!(rendered.contains("<redacted>"));
    }
}
