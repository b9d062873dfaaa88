//! On-chain metric ingestion and daily merge.
//!
//! Chart exports look like:
//!
//! ```json
//! { "metric1": "hash-rate", "hash-rate": [ { "x": 1704067200000, "y": 5.1e8 }, ... ] }
//! ```
//!
//! Each export is reduced to one sample per UTC calendar day, picked uniformly
//! at random among that day's observations, then all metrics are outer-joined
//! on date into a [`MetricsTable`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use time::Date;
use tracing::{debug, info, warn};

use crate::UtcDateTime;

/// Failures while loading one metric export.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("failed to read metric file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("metric file '{}' is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("metric file '{}' has no string 'metric1' key", .path.display())]
    MissingMetricName { path: PathBuf },
    #[error("metric file '{}' has no point array under '{metric}'", .path.display())]
    MissingSeries { path: PathBuf, metric: String },
    #[error("metric file '{}' has an invalid point at index {index}: {reason}", .path.display())]
    InvalidPoint {
        path: PathBuf,
        index: usize,
        reason: String,
    },
}

impl MetricsError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "metrics.io",
            Self::Json { .. } => "metrics.json",
            Self::MissingMetricName { .. } => "metrics.missing_name",
            Self::MissingSeries { .. } => "metrics.missing_series",
            Self::InvalidPoint { .. } => "metrics.invalid_point",
        }
    }
}

/// One intraday observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricPoint {
    pub ts: UtcDateTime,
    pub value: f64,
}

/// All observations of one named metric, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub name: String,
    pub points: Vec<MetricPoint>,
}

/// One value per calendar day for one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyMetric {
    pub name: String,
    pub values: BTreeMap<Date, f64>,
}

#[derive(Debug, Deserialize)]
struct RawPoint {
    x: f64,
    y: Option<f64>,
}

/// Parses a chart export already read into memory. `path` is only used in errors.
pub fn parse_metric_export(path: &Path, body: &str) -> Result<MetricSeries, MetricsError> {
    let document: Value = serde_json::from_str(body).map_err(|source| MetricsError::Json {
        path: path.to_owned(),
        source,
    })?;

    let name = document
        .get("metric1")
        .and_then(Value::as_str)
        .ok_or_else(|| MetricsError::MissingMetricName {
            path: path.to_owned(),
        })?
        .to_owned();

    let raw_points = document
        .get(&name)
        .and_then(Value::as_array)
        .ok_or_else(|| MetricsError::MissingSeries {
            path: path.to_owned(),
            metric: name.clone(),
        })?;

    let mut points = Vec::with_capacity(raw_points.len());
    for (index, raw) in raw_points.iter().enumerate() {
        let point = RawPoint::deserialize(raw).map_err(|error| MetricsError::InvalidPoint {
            path: path.to_owned(),
            index,
            reason: error.to_string(),
        })?;

        let Some(value) = point.y else {
            debug!(metric = %name, index, "skipping point without value");
            continue;
        };

        let ts = UtcDateTime::from_unix_millis(point.x.round() as i64).map_err(|error| {
            MetricsError::InvalidPoint {
                path: path.to_owned(),
                index,
                reason: error.to_string(),
            }
        })?;
        points.push(MetricPoint { ts, value });
    }

    Ok(MetricSeries { name, points })
}

pub fn load_metric_file(path: &Path) -> Result<MetricSeries, MetricsError> {
    let body = std::fs::read_to_string(path).map_err(|source| MetricsError::Io {
        path: path.to_owned(),
        source,
    })?;
    parse_metric_export(path, &body)
}

/// Keeps one observation per day, chosen by `rng`.
///
/// Days are visited in ascending order and candidates in file order, so the
/// result only depends on the input and the rng state.
pub fn sample_daily(series: &MetricSeries, rng: &mut fastrand::Rng) -> DailyMetric {
    let mut by_day: BTreeMap<Date, Vec<f64>> = BTreeMap::new();
    for point in &series.points {
        by_day.entry(point.ts.date()).or_default().push(point.value);
    }

    // Every bucket holds at least one candidate.
    let values = by_day
        .into_iter()
        .map(|(day, candidates)| (day, candidates[rng.usize(..candidates.len())]))
        .collect();

    DailyMetric {
        name: series.name.clone(),
        values,
    }
}

/// Sparse date × metric table built by outer joins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsTable {
    metrics: Vec<String>,
    rows: BTreeMap<Date, Vec<Option<f64>>>,
}

impl MetricsTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metric column names in insertion order.
    pub fn metrics(&self) -> &[String] {
        &self.metrics
    }

    pub fn rows(&self) -> impl Iterator<Item = (&Date, &[Option<f64>])> {
        self.rows.iter().map(|(day, cells)| (day, cells.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, day: Date, metric: &str) -> Option<f64> {
        let column = self.metrics.iter().position(|name| name == metric)?;
        self.rows.get(&day)?.get(column).copied().flatten()
    }

    /// Outer-joins one daily metric. A metric already present keeps its column
    /// position but its values are replaced.
    pub fn insert(&mut self, daily: DailyMetric) {
        let column = match self.metrics.iter().position(|name| *name == daily.name) {
            Some(column) => {
                for cells in self.rows.values_mut() {
                    cells[column] = None;
                }
                column
            }
            None => {
                self.metrics.push(daily.name.clone());
                for cells in self.rows.values_mut() {
                    cells.push(None);
                }
                self.metrics.len() - 1
            }
        };

        let width = self.metrics.len();
        for (day, value) in daily.values {
            let cells = self.rows.entry(day).or_insert_with(|| vec![None; width]);
            cells[column] = Some(value);
        }

        self.rows.retain(|_, cells| cells.iter().any(Option::is_some));
    }
}

/// Outcome of merging a batch of metric files.
#[derive(Debug)]
pub struct MergeReport {
    pub table: MetricsTable,
    pub loaded: Vec<PathBuf>,
    pub failures: Vec<MetricsError>,
}

/// Loads, samples and joins every file. Failed files are skipped and reported.
pub fn merge_metric_files(paths: &[PathBuf], seed: u64) -> MergeReport {
    info!(files = paths.len(), seed, "merging on-chain metric files");

    let mut rng = fastrand::Rng::with_seed(seed);
    let mut table = MetricsTable::new();
    let mut loaded = Vec::new();
    let mut failures = Vec::new();

    for path in paths {
        match load_metric_file(path) {
            Ok(series) => {
                let daily = sample_daily(&series, &mut rng);
                debug!(metric = %daily.name, days = daily.values.len(), "sampled daily metric");
                table.insert(daily);
                loaded.push(path.clone());
            }
            Err(error) => {
                warn!(code = error.code(), "skipping metric file: {error}");
                failures.push(error);
            }
        }
    }

    info!(
        loaded = loaded.len(),
        failed = failures.len(),
        days = table.len(),
        "finished merging metric files"
    );

    MergeReport {
        table,
        loaded,
        failures,
    }
}
