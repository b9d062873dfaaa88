//! Backward-walking hourly history backfill.
//!
//! [`backfill`] chains [`CandleSource::fetch_window`] calls from "now" into the
//! past until `total_hours` rows are collected or the source runs dry:
//!
//! ```text
//!  now ◀────────── window 1 ──────────┤ to_ts = earliest(w1) - 1
//!       ◀── window 2 ──┤ to_ts = earliest(w2) - 1
//!  ...
//! ```
//!
//! Only an empty or failed window stops the walk early. A short window (fewer
//! rows than requested) is counted and the walk continues, because rate
//! limiting and listing-date gaps produce short windows that are not the end
//! of history.

use serde::Serialize;
use tracing::{info, warn};

use crate::data_source::{
    CandleSource, SourceError, WindowOutcome, WindowRequest, MAX_WINDOW_LIMIT,
};
use crate::{CandleSeries, Symbol};

/// Why a backfill stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum BackfillStop {
    /// `total_hours` rows were collected.
    Satisfied,
    /// Upstream returned an empty window.
    Exhausted,
    /// A window fetch failed; rows gathered before it are kept.
    Failed(SourceError),
}

impl BackfillStop {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Satisfied => "satisfied",
            Self::Exhausted => "exhausted",
            Self::Failed(_) => "failed",
        }
    }
}

/// Result of one symbol's backfill.
#[derive(Debug, Clone, PartialEq)]
pub struct BackfillReport {
    pub series: CandleSeries,
    pub requested_hours: usize,
    /// Number of `fetch_window` calls issued.
    pub calls: usize,
    /// Non-empty windows that returned fewer rows than requested.
    pub short_windows: usize,
    pub stop: BackfillStop,
}

impl BackfillReport {
    pub fn failure(&self) -> Option<&SourceError> {
        match &self.stop {
            BackfillStop::Failed(error) => Some(error),
            _ => None,
        }
    }

    pub fn summary(&self) -> BackfillSummary {
        BackfillSummary {
            symbol: self.series.symbol.to_string(),
            requested_hours: self.requested_hours,
            retrieved_hours: self.series.len(),
            calls: self.calls,
            short_windows: self.short_windows,
            stop: self.stop.as_str(),
            first_ts: self.series.earliest().map(|ts| ts.format_rfc3339()),
            last_ts: self.series.latest().map(|ts| ts.format_rfc3339()),
        }
    }
}

/// Serializable digest used in command output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackfillSummary {
    pub symbol: String,
    pub requested_hours: usize,
    pub retrieved_hours: usize,
    pub calls: usize,
    pub short_windows: usize,
    pub stop: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_ts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ts: Option<String>,
}

/// Collects up to `total_hours` hourly candles for `symbol`, newest window first.
pub async fn backfill(
    source: &dyn CandleSource,
    symbol: Symbol,
    total_hours: usize,
) -> BackfillReport {
    info!(symbol = %symbol, total_hours, "starting hourly backfill");

    let mut series = CandleSeries::empty(symbol.clone());
    let mut hours_retrieved = 0usize;
    let mut to_ts: Option<i64> = None;
    let mut calls = 0usize;
    let mut short_windows = 0usize;
    let mut stop = BackfillStop::Satisfied;

    while hours_retrieved < total_hours {
        let limit = MAX_WINDOW_LIMIT.min(total_hours - hours_retrieved);
        let request = match WindowRequest::new(symbol.clone(), to_ts, limit) {
            Ok(request) => request,
            Err(error) => {
                stop = BackfillStop::Failed(error);
                break;
            }
        };

        calls += 1;
        let mut window = match source.fetch_window(request).await {
            WindowOutcome::Rows(rows) => rows,
            WindowOutcome::Empty => {
                stop = BackfillStop::Exhausted;
                break;
            }
            WindowOutcome::Failed(error) => {
                warn!(symbol = %symbol, calls, "backfill stopped by failed window: {error}");
                stop = BackfillStop::Failed(error);
                break;
            }
        };

        let received = window.len();
        if received < limit {
            short_windows += 1;
        }

        // histohour answers `limit + 1` rows; only the newest `limit` are needed.
        if received > limit {
            window.drain(..received - limit);
        }
        let kept = window.len();

        // Rows are oldest first, so the first one bounds the next request.
        to_ts = window.first().map(|candle| candle.ts.unix_timestamp() - 1);
        series.prepend(window);
        hours_retrieved += kept;

        info!(symbol = %symbol, hours_retrieved, "retrieved hours of data");
    }

    info!(
        symbol = %symbol,
        rows = series.len(),
        calls,
        stop = stop.as_str(),
        "finished hourly backfill"
    );

    BackfillReport {
        series,
        requested_hours: total_hours,
        calls,
        short_windows,
        stop,
    }
}
