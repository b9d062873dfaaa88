//! Scripted upstream fakes shared by the behaviour tests.

#![allow(dead_code)]

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cryptotick_core::{
    CoinGeckoAdapter, CryptoCompareAdapter, HttpClient, HttpError, HttpRequest, HttpResponse,
};

pub const API_KEY: &str = "test-key-9f8e7d";
pub const HOUR: i64 = 3_600;

type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Serves `/data/v2/histohour` from an in-memory range of hourly candles.
///
/// A window ends at `toTs` (or the newest hour) and reaches back `limit` hours,
/// never before the first listed hour. In inclusive mode it answers `limit + 1`
/// rows the way the live endpoint does.
pub struct FakeHistoHour {
    first_hour: i64,
    last_hour: i64,
    inclusive: bool,
    malformed_hour: Option<i64>,
    fail_from_call: Option<usize>,
    failure_body: String,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeHistoHour {
    /// History covering `hours` consecutive hours ending at `last_hour`.
    pub fn with_history(last_hour: i64, hours: i64) -> Arc<Self> {
        Arc::new(Self::build(last_hour, hours, None, String::new()))
    }

    /// Like [`FakeHistoHour::with_history`], but each window carries `limit + 1` rows.
    pub fn inclusive(last_hour: i64, hours: i64) -> Arc<Self> {
        let mut fake = Self::build(last_hour, hours, None, String::new());
        fake.inclusive = true;
        Arc::new(fake)
    }

    /// History whose row at `hour` reports an open above its high.
    pub fn with_malformed_hour(last_hour: i64, hours: i64, hour: i64) -> Arc<Self> {
        let mut fake = Self::build(last_hour, hours, None, String::new());
        fake.malformed_hour = Some(hour);
        Arc::new(fake)
    }

    /// No history at all.
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::build(0, 0, None, String::new()))
    }

    /// Serves history until call number `call` (1-based), which returns an error body.
    pub fn failing_from(last_hour: i64, hours: i64, call: usize, message: &str) -> Arc<Self> {
        let body = format!(r#"{{"Response":"Error","Message":"{message}","Data":{{}}}}"#);
        Arc::new(Self::build(last_hour, hours, Some(call), body))
    }

    fn build(last_hour: i64, hours: i64, fail_from_call: Option<usize>, failure_body: String) -> Self {
        Self {
            first_hour: last_hour - hours + 1,
            last_hour,
            inclusive: false,
            malformed_hour: None,
            fail_from_call,
            failure_body,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request store").clone()
    }

    fn window_body(&self, request: &HttpRequest) -> String {
        let limit: i64 = request
            .query_param("limit")
            .and_then(|value| value.parse().ok())
            .unwrap_or(0);
        let end = request
            .query_param("toTs")
            .and_then(|value| value.parse::<i64>().ok())
            .map(|to_ts| to_ts.div_euclid(HOUR).min(self.last_hour))
            .unwrap_or(self.last_hour);
        let span = if self.inclusive { limit + 1 } else { limit };
        let start = (end - span + 1).max(self.first_hour);

        let rows: Vec<String> = (start..=end)
            .map(|hour| {
                let open = if self.malformed_hour == Some(hour) { 110.5 } else { 100.0 };
                format!(
                    r#"{{"time":{},"open":{open:?},"high":110.0,"low":90.0,"close":105.0,"volumefrom":2.0,"volumeto":210.0}}"#,
                    hour * HOUR
                )
            })
            .collect();

        format!(
            r#"{{"Response":"Success","Message":"","Data":{{"Data":[{}]}}}}"#,
            rows.join(",")
        )
    }
}

impl HttpClient for FakeHistoHour {
    fn execute<'a>(&'a self, request: HttpRequest) -> ResponseFuture<'a> {
        let call = {
            let mut requests = self.requests.lock().expect("request store");
            requests.push(request.clone());
            requests.len()
        };

        let body = match self.fail_from_call {
            Some(from) if call >= from => self.failure_body.clone(),
            _ => self.window_body(&request),
        };
        Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
    }
}

/// Serves CoinGecko `/coins/markets` and `/global`.
pub struct FakeCoinGecko {
    global: HttpResponse,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeCoinGecko {
    pub fn healthy() -> Arc<Self> {
        Arc::new(Self {
            global: HttpResponse::ok_json(
                r#"{"data":{"total_market_cap":{"usd":2400000000000.0,"eur":2200000000000.0}}}"#,
            ),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn with_broken_global() -> Arc<Self> {
        Arc::new(Self {
            global: HttpResponse::with_status(503, "upstream maintenance"),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("request store").clone()
    }

    fn markets_body(order: &str) -> String {
        let (first, second) = if order == "volume_desc" {
            (("tether", "usdt", "Tether"), ("bitcoin", "btc", "Bitcoin"))
        } else {
            (("bitcoin", "btc", "Bitcoin"), ("ethereum", "eth", "Ethereum"))
        };
        format!(
            r#"[
                {{"id":"{}","symbol":"{}","name":"{}","current_price":65000.0,"market_cap":1280000000000,"market_cap_rank":1,"total_volume":35000000000}},
                {{"id":"{}","symbol":"{}","name":"{}","current_price":3200.0,"market_cap":385000000000,"market_cap_rank":2,"total_volume":15000000000}}
            ]"#,
            first.0, first.1, first.2, second.0, second.1, second.2
        )
    }
}

impl HttpClient for FakeCoinGecko {
    fn execute<'a>(&'a self, request: HttpRequest) -> ResponseFuture<'a> {
        self.requests.lock().expect("request store").push(request.clone());

        let response = if request.url.contains("/coins/markets") {
            let order = request.query_param("order").unwrap_or_default();
            HttpResponse::ok_json(Self::markets_body(&order))
        } else if request.url.contains("/global") {
            self.global.clone()
        } else {
            HttpResponse::with_status(404, "not found")
        };
        Box::pin(async move { Ok(response) })
    }
}

pub fn cryptocompare(fake: &Arc<FakeHistoHour>) -> CryptoCompareAdapter {
    CryptoCompareAdapter::with_http_client(fake.clone(), API_KEY)
}

pub fn coingecko(fake: &Arc<FakeCoinGecko>) -> CoinGeckoAdapter {
    CoinGeckoAdapter::with_http_client(fake.clone())
}

/// A blockchain.com chart export with one `(epoch_ms, value)` pair per point.
pub fn chart_export(name: &str, points: &[(i64, f64)]) -> String {
    let points: Vec<String> = points
        .iter()
        .map(|(x, y)| format!(r#"{{"x":{x},"y":{y:?}}}"#))
        .collect();
    format!(
        r#"{{"metric1":"{name}","type":"linear","{name}":[{}]}}"#,
        points.join(",")
    )
}

pub fn write_export(dir: &Path, file_name: &str, body: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, body).expect("write export");
    path
}
