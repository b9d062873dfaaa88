//! Catalogue of the blockchain.com charts whose JSON exports feed the metric merge.
//!
//! Downloading the exports (3-year range, "Download JSON") happens outside
//! this crate; the catalogue only fixes which charts exist and where their
//! exports are expected on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;

const CHARTS_BASE_URL: &str = "https://www.blockchain.com/explorer/charts";

/// One chart with a JSON export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartSource {
    pub slug: &'static str,
    pub title: &'static str,
}

impl ChartSource {
    pub fn url(&self) -> String {
        format!("{CHARTS_BASE_URL}/{}", self.slug)
    }

    pub fn file_name(&self) -> String {
        format!("{}.json", self.slug)
    }

    pub fn export_path(&self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// Charts merged by default, in column order.
pub const DEFAULT_CHARTS: [ChartSource; 10] = [
    ChartSource { slug: "cost-per-transaction", title: "Cost per transaction" },
    ChartSource { slug: "fees-usd-per-transaction", title: "Fees per transaction (USD)" },
    ChartSource { slug: "hash-rate", title: "Total hash rate" },
    ChartSource { slug: "mvrv", title: "Market value to realised value" },
    ChartSource { slug: "n-payments-per-block", title: "Payments per block" },
    ChartSource { slug: "n-transactions-per-block", title: "Transactions per block" },
    ChartSource { slug: "n-unique-addresses", title: "Unique addresses used" },
    ChartSource { slug: "nvt", title: "Network value to transactions" },
    ChartSource { slug: "nvts", title: "Network value to transactions signal" },
    ChartSource { slug: "trade-volume", title: "Exchange trade volume (USD)" },
];

/// Expected export paths for the default charts under `dir`.
pub fn default_export_paths(dir: &Path) -> Vec<PathBuf> {
    DEFAULT_CHARTS
        .iter()
        .map(|chart| chart.export_path(dir))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_paths_follow_slugs() {
        let paths = default_export_paths(Path::new("scrapping_json_data"));

        assert_eq!(paths.len(), 10);
        assert_eq!(paths[0], Path::new("scrapping_json_data/cost-per-transaction.json"));
        assert_eq!(paths[9], Path::new("scrapping_json_data/trade-volume.json"));
    }

    #[test]
    fn chart_url_points_at_explorer() {
        assert_eq!(
            DEFAULT_CHARTS[2].url(),
            "https://www.blockchain.com/explorer/charts/hash-rate"
        );
    }
}
