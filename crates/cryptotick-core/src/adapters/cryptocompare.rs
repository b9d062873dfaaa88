use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::data_source::{
    CandleSource, SourceError, SourceFuture, WindowOutcome, WindowRequest,
};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::{Candle, ProviderId, UtcDateTime};

pub const CRYPTOCOMPARE_BASE_URL: &str = "https://min-api.cryptocompare.com";
const HISTOHOUR_PATH: &str = "/data/v2/histohour";
const QUOTE_CURRENCY: &str = "USD";

/// CryptoCompare hourly-candle adapter (`/data/v2/histohour`).
#[derive(Clone)]
pub struct CryptoCompareAdapter {
    http_client: Arc<dyn HttpClient>,
    api_key: String,
    base_url: String,
    timeout_ms: u64,
}

impl CryptoCompareAdapter {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), api_key)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, api_key: impl Into<String>) -> Self {
        Self {
            http_client,
            api_key: api_key.into(),
            base_url: String::from(CRYPTOCOMPARE_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn build_request(&self, req: &WindowRequest) -> HttpRequest {
        let mut request = HttpRequest::get(format!("{}{HISTOHOUR_PATH}", self.base_url))
            .with_query("fsym", req.symbol.as_str())
            .with_query("tsym", QUOTE_CURRENCY)
            .with_query("limit", req.limit.to_string())
            .with_query("api_key", &self.api_key)
            .with_timeout_ms(self.timeout_ms);
        if let Some(to_ts) = req.to_ts {
            request = request.with_query("toTs", to_ts.to_string());
        }
        request
    }

    async fn fetch(&self, req: &WindowRequest) -> Result<Vec<Candle>, SourceError> {
        let response = self
            .http_client
            .execute(self.build_request(req))
            .await
            .map_err(|error| {
                if error.retryable() {
                    SourceError::unavailable(format!(
                        "cryptocompare transport error: {}",
                        error.message()
                    ))
                } else {
                    SourceError::internal(format!(
                        "cryptocompare transport error: {}",
                        error.message()
                    ))
                }
            })?;

        if response.status == 429 {
            return Err(SourceError::rate_limited(
                "cryptocompare returned status 429",
            ));
        }

        // Error payloads usually come with status 200, so the marker is checked
        // even when the status is fine, and parsed even when it is not.
        let parsed: Option<HistoHourResponse> = serde_json::from_str(&response.body).ok();

        if !response.is_success() {
            let detail = parsed
                .map(|body| body.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| String::from("no error message"));
            return Err(SourceError::unavailable(format!(
                "cryptocompare returned status {}: {detail}",
                response.status
            )));
        }

        let body = parsed.ok_or_else(|| {
            SourceError::internal("failed to parse cryptocompare histohour response")
        })?;

        if body.response != "Success" {
            let message = if body.message.is_empty() {
                String::from("no error message")
            } else {
                body.message
            };
            return Err(if message.to_ascii_lowercase().contains("rate limit") {
                SourceError::rate_limited(format!("cryptocompare: {message}"))
            } else {
                SourceError::rejected(format!("cryptocompare: {message}"))
            });
        }

        normalize_rows(body.data.rows)
    }
}

impl CandleSource for CryptoCompareAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Cryptocompare
    }

    fn fetch_window<'a>(&'a self, req: WindowRequest) -> SourceFuture<'a, WindowOutcome> {
        Box::pin(async move {
            info!(
                symbol = %req.symbol,
                limit = req.limit,
                to_ts = ?req.to_ts,
                "fetching hourly candles"
            );

            match self.fetch(&req).await {
                Ok(rows) => {
                    info!(symbol = %req.symbol, rows = rows.len(), "fetched hourly candles");
                    WindowOutcome::from_rows(rows)
                }
                Err(error) => {
                    warn!(symbol = %req.symbol, code = error.code(), "hourly candle fetch failed: {}", error.message());
                    WindowOutcome::Failed(error)
                }
            }
        })
    }
}

/// Converts raw rows to candles sorted oldest first. Every row is kept as sent.
fn normalize_rows(rows: Vec<HistoHourRow>) -> Result<Vec<Candle>, SourceError> {
    let mut candles = rows
        .into_iter()
        .map(|row| {
            let ts = UtcDateTime::from_unix_seconds(row.time)
                .map_err(|error| SourceError::internal(error.to_string()))?;
            Ok(Candle::from_upstream(
                ts,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volumefrom,
                row.volumeto,
            ))
        })
        .collect::<Result<Vec<_>, SourceError>>()?;

    candles.sort_by_key(|candle| candle.ts);
    Ok(candles)
}

#[derive(Debug, Deserialize)]
struct HistoHourResponse {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "Data", default)]
    data: HistoHourData,
}

#[derive(Debug, Default, Deserialize)]
struct HistoHourData {
    #[serde(rename = "Data", default)]
    rows: Vec<HistoHourRow>,
}

#[derive(Debug, Deserialize)]
struct HistoHourRow {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volumefrom: f64,
    #[serde(default)]
    volumeto: f64,
}
