use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::data_source::{MarketOrder, MarketSource, SourceError, SourceFuture};
use crate::http_client::{
    HttpAuth, HttpClient, HttpRequest, HttpResponse, ReqwestHttpClient, DEFAULT_TIMEOUT_MS,
};
use crate::{MarketCoin, ProviderId};

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";
const MARKETS_PATH: &str = "/api/v3/coins/markets";
const GLOBAL_PATH: &str = "/api/v3/global";
const DEMO_KEY_HEADER: &str = "x-cg-demo-api-key";

/// CoinGecko snapshot adapter: market rankings and global market cap.
#[derive(Clone)]
pub struct CoinGeckoAdapter {
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    base_url: String,
    timeout_ms: u64,
}

impl Default for CoinGeckoAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()))
    }
}

impl CoinGeckoAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            auth: HttpAuth::None,
            base_url: String::from(COINGECKO_BASE_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sends the optional demo key; the public endpoints work without one.
    pub fn with_demo_key(mut self, key: Option<String>) -> Self {
        self.auth = match key {
            Some(value) if !value.trim().is_empty() => HttpAuth::Header {
                name: String::from(DEMO_KEY_HEADER),
                value,
            },
            _ => HttpAuth::None,
        };
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, SourceError> {
        let request = request.with_auth(&self.auth).with_timeout_ms(self.timeout_ms);
        let response = self.http_client.execute(request).await.map_err(|error| {
            if error.retryable() {
                SourceError::unavailable(format!("coingecko transport error: {}", error.message()))
            } else {
                SourceError::internal(format!("coingecko transport error: {}", error.message()))
            }
        })?;

        match response.status {
            429 => Err(SourceError::rate_limited("coingecko returned status 429")),
            _ if !response.is_success() => Err(SourceError::unavailable(format!(
                "coingecko returned status {}",
                response.status
            ))),
            _ => Ok(response),
        }
    }

    async fn fetch_top_coins(
        &self,
        order: MarketOrder,
        limit: usize,
    ) -> Result<Vec<MarketCoin>, SourceError> {
        if limit == 0 {
            return Err(SourceError::invalid_request(
                "market ranking limit must be greater than zero",
            ));
        }

        let request = HttpRequest::get(format!("{}{MARKETS_PATH}", self.base_url))
            .with_query("vs_currency", "usd")
            .with_query("order", order.as_str())
            .with_query("per_page", limit.to_string())
            .with_query("page", "1")
            .with_query("sparkline", "false");

        let response = self.get(request).await?;
        serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse coingecko markets response: {e}"))
        })
    }

    async fn fetch_global_market_cap(&self) -> Result<f64, SourceError> {
        let request = HttpRequest::get(format!("{}{GLOBAL_PATH}", self.base_url));
        let response = self.get(request).await?;

        let global: GlobalResponse = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::internal(format!("failed to parse coingecko global response: {e}"))
        })?;

        global
            .data
            .total_market_cap
            .usd
            .ok_or_else(|| SourceError::internal("coingecko global response has no usd market cap"))
    }
}

impl MarketSource for CoinGeckoAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Coingecko
    }

    fn top_coins<'a>(
        &'a self,
        order: MarketOrder,
        limit: usize,
    ) -> SourceFuture<'a, Result<Vec<MarketCoin>, SourceError>> {
        Box::pin(async move {
            info!(order = order.as_str(), limit, "fetching market ranking");
            let result = self.fetch_top_coins(order, limit).await;
            match &result {
                Ok(coins) => info!(order = order.as_str(), coins = coins.len(), "fetched market ranking"),
                Err(error) => warn!(order = order.as_str(), code = error.code(), "market ranking fetch failed: {}", error.message()),
            }
            result
        })
    }

    fn global_market_cap<'a>(&'a self) -> SourceFuture<'a, Result<f64, SourceError>> {
        Box::pin(async move {
            info!("fetching global market capitalization");
            let result = self.fetch_global_market_cap().await;
            if let Err(error) = &result {
                warn!(code = error.code(), "global market cap fetch failed: {}", error.message());
            }
            result
        })
    }
}

#[derive(Debug, Deserialize)]
struct GlobalResponse {
    data: GlobalData,
}

#[derive(Debug, Deserialize)]
struct GlobalData {
    total_market_cap: TotalMarketCap,
}

#[derive(Debug, Deserialize)]
struct TotalMarketCap {
    #[serde(default)]
    usd: Option<f64>,
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::HttpError;

    struct RecordingHttpClient {
        requests: Mutex<Vec<HttpRequest>>,
        response: HttpResponse,
    }

    impl RecordingHttpClient {
        fn new(response: HttpResponse) -> Self {
            Self {
                requests: Mutex::new(Vec::new()),
                response,
            }
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { Ok(response) })
        }
    }

    #[tokio::test]
    async fn ranking_request_uses_order_and_page_size() {
        let body = r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin","market_cap":1000,"total_volume":50}]"#;
        let client = Arc::new(RecordingHttpClient::new(HttpResponse::ok_json(body)));
        let adapter = CoinGeckoAdapter::with_http_client(client.clone())
            .with_base_url("https://cg.example.test");

        let coins = adapter
            .top_coins(MarketOrder::VolumeDesc, 3)
            .await
            .expect("ranking should parse");

        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].name, "Bitcoin");
        assert_eq!(coins[0].market_cap, Some(1000.0));

        let requests = client.requests.lock().expect("lock").clone();
        let sent = &requests[0];
        assert!(sent.url.starts_with("https://cg.example.test/api/v3/coins/markets?"));
        assert_eq!(sent.query_param("vs_currency").as_deref(), Some("usd"));
        assert_eq!(sent.query_param("order").as_deref(), Some("volume_desc"));
        assert_eq!(sent.query_param("per_page").as_deref(), Some("3"));
        assert_eq!(sent.query_param("page").as_deref(), Some("1"));
        assert_eq!(sent.query_param("sparkline").as_deref(), Some("false"));
        assert!(sent.headers.get(DEMO_KEY_HEADER).is_none());
    }

    #[tokio::test]
    async fn demo_key_is_sent_as_header() {
        let body = r#"{"data":{"total_market_cap":{"usd":2.5e12,"eur":2.3e12}}}"#;
        let client = Arc::new(RecordingHttpClient::new(HttpResponse::ok_json(body)));
        let adapter = CoinGeckoAdapter::with_http_client(client.clone())
            .with_demo_key(Some(String::from("cg-demo")));

        let cap = adapter.global_market_cap().await.expect("global should parse");

        assert_eq!(cap, 2.5e12);
        let requests = client.requests.lock().expect("lock").clone();
        assert_eq!(
            requests[0].headers.get(DEMO_KEY_HEADER).map(String::as_str),
            Some("cg-demo")
        );
    }

    #[tokio::test]
    async fn throttled_response_is_rate_limited() {
        let client = Arc::new(RecordingHttpClient::new(HttpResponse::with_status(429, "{}")));
        let adapter = CoinGeckoAdapter::with_http_client(client);

        let error = adapter
            .top_coins(MarketOrder::MarketCapDesc, 10)
            .await
            .expect_err("429 must fail");
        assert_eq!(error.kind(), SourceErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn missing_usd_cap_is_an_error() {
        let body = r#"{"data":{"total_market_cap":{"eur":1.0}}}"#;
        let client = Arc::new(RecordingHttpClient::new(HttpResponse::ok_json(body)));
        let adapter = CoinGeckoAdapter::with_http_client(client);

        let error = adapter.global_market_cap().await.expect_err("must fail");
        assert_eq!(error.kind(), SourceErrorKind::Internal);
    }
}
