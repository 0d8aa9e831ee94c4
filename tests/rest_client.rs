//! Offline integration tests for the REST Client (C6), modeled on the
//! teacher's `tests/history/offline.rs` httpmock pattern.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use binance_klines_rs::core::client::{HttpClient, RetryConfig};
use binance_klines_rs::core::config::RateLimitPolicy;
use binance_klines_rs::outcome::FetchOutcome;
use binance_klines_rs::rest::RestClient;
use binance_klines_rs::time::Window;
use binance_klines_rs::{EngineError, Interval, MarketClass};
use chrono::{TimeZone, Utc};
use httpmock::MockServer;

fn client(server: &MockServer, market: MarketClass) -> RestClient {
    let http = Arc::new(HttpClient::new(Duration::from_secs(5)));
    let mut budgets = HashMap::new();
    budgets.insert(market, market.default_rate_budget_per_minute());
    RestClient::new(http, &budgets, RetryConfig::default(), RateLimitPolicy::FailFast)
        .with_rest_root_override(market, server.base_url())
}

fn kline_json(open_time: i64) -> serde_json::Value {
    serde_json::json!([
        open_time, "100.0", "101.0", "99.0", "100.5", "10.0",
        open_time + 3_599_999, "500.0", 12, "5.0", "250.0", "0"
    ])
}

#[tokio::test]
async fn paginates_until_page_returns_fewer_than_limit() {
    let server = MockServer::start();
    let market = MarketClass::Spot;
    let step = Interval::Hour1.millis();
    let start = 1_700_000_000_000i64 / step * step;

    // Binance's spot klines cap is 1000, but we fabricate a tiny two-page
    // window by using startTime for the second page.
    let first_page: Vec<_> = (0..2).map(|i| kline_json(start + i * step)).collect();
    let second_page: Vec<_> = (0..1).map(|i| kline_json(start + (2 + i) * step)).collect();

    let m1 = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/api/v3/klines")
            .query_param("symbol", "BTCUSDT")
            .query_param("startTime", start.to_string());
        then.status(200).json_body(serde_json::Value::Array(first_page.clone()));
    });
    let m2 = server.mock(|when, then| {
        when.method(httpmock::Method::GET)
            .path("/api/v3/klines")
            .query_param("symbol", "BTCUSDT")
            .query_param("startTime", (start + 2 * step).to_string());
        then.status(200).json_body(serde_json::Value::Array(second_page.clone()));
    });

    let window = Window { start_ms: start, end_ms: start + 10 * step };
    let outcome = client(&server, market)
        .fetch_window(market, "BTCUSDT", Interval::Hour1, window)
        .await
        .expect("fetch_window ok");

    m1.assert();
    m2.assert();
    match outcome {
        FetchOutcome::Served { bars } => assert_eq!(bars.len(), 3),
        other => panic!("expected Served, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limited_returned_as_outcome_not_error() {
    let server = MockServer::start();
    let market = MarketClass::FuturesLinear;

    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/fapi/v1/klines");
        then.status(429).header("Retry-After", "2");
    });

    let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let window = Window::new(start, start + chrono::Duration::hours(1)).unwrap();

    let outcome = client(&server, market)
        .fetch_window(market, "ETHUSDT", Interval::Hour1, window)
        .await
        .expect("fetch_window ok");

    match outcome {
        FetchOutcome::RateLimited { retry_after_ms } => assert_eq!(retry_after_ms, Some(2_000)),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn fatal_418_escalates_to_error() {
    let server = MockServer::start();
    let market = MarketClass::Spot;

    server.mock(|when, then| {
        when.method(httpmock::Method::GET).path("/api/v3/klines");
        then.status(418).body("banned");
    });

    let start = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    let window = Window::new(start, start + chrono::Duration::hours(1)).unwrap();

    let result = client(&server, market)
        .fetch_window(market, "BTCUSDT", Interval::Hour1, window)
        .await;

    match result {
        Err(EngineError::FatalTransport { status, .. }) => assert_eq!(status, 418),
        other => panic!("expected FatalTransport error, got {other:?}"),
    }
}
